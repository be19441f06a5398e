use std::io::{self, Write};

/// Where a finished refresh cycle lands. The refresh loop only ever sees
/// this trait, so the terminal stays out of the core and tests can swap in
/// a buffer.
pub trait LabelSink: Send {
    fn publish(&mut self, lines: &[String]) -> anyhow::Result<()>;
}

/// Prints the label block to stdout, one line per tracked symbol.
pub struct StdoutSink;

impl LabelSink for StdoutSink {
    fn publish(&mut self, lines: &[String]) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        writeln!(out, "--------------------")?;
        for line in lines {
            writeln!(out, "{line}")?;
        }
        out.flush()?;
        Ok(())
    }
}
