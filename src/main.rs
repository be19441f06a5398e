use std::io::Write;

use dotenvy::dotenv;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use crate::display::StdoutSink;
use crate::logger::setup_logger;
use crate::registry::{AddOutcome, RemoveOutcome, SymbolRegistry};
use crate::remote::BinanceClient;
use crate::services::ticker_service::{Command, TickerService};
use crate::startup::StartupShim;

mod display;
mod format;
mod logger;
mod registry;
mod remote;
mod services;
mod startup;
mod symbols;
mod traits;

const DEFAULT_SYMBOLS: &[&str] = &["BTCUSDT", "DOGEUSDT"];

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    setup_logger();
    dotenv().ok();
    debug!("Ticker starting up...");

    let registry = SymbolRegistry::new(DEFAULT_SYMBOLS);
    let client = BinanceClient::new();
    let (command_tx, command_rx) = mpsc::channel::<Command>(16);

    let service = TickerService::new(registry, client, StdoutSink, command_rx);
    let service_handle = tokio::spawn(service.run());

    println!("Commands: add [symbol] | remove [symbol] | startup on|off|status | quit");

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = input.next_line().await? {
        let trimmed = line.trim();
        let (command, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (trimmed, ""),
        };

        match command {
            "add" => add_interactive(&command_tx, &mut input, rest.to_string()).await?,
            "remove" => remove_interactive(&command_tx, &mut input, rest.to_string()).await?,
            "startup" => startup_toggle(rest),
            "quit" | "exit" => break,
            "" => {}
            other => println!("Unknown command: {other}"),
        }
    }

    // Closing the channel is what stops the refresh loop.
    drop(command_tx);
    let _ = service_handle.await;
    Ok(())
}

/// Add flow with a retry/cancel loop: an unavailable symbol re-prompts
/// for fresh input as long as the user keeps answering yes.
async fn add_interactive(
    command_tx: &mpsc::Sender<Command>,
    input: &mut Lines<BufReader<Stdin>>,
    mut raw: String,
) -> anyhow::Result<()> {
    loop {
        if raw.trim().is_empty() {
            prompt("Symbol to add (e.g. BTC or BTCUSDT): ")?;
            raw = match input.next_line().await? {
                Some(answer) => answer,
                None => return Ok(()),
            };
            if raw.trim().is_empty() {
                return Ok(());
            }
        }

        let (reply_tx, reply_rx) = oneshot::channel();
        let command = Command::Add {
            raw: raw.clone(),
            reply: reply_tx,
        };
        if command_tx.send(command).await.is_err() {
            return Ok(());
        }
        let Ok(outcome) = reply_rx.await else {
            return Ok(());
        };

        match outcome {
            AddOutcome::Empty => return Ok(()),
            AddOutcome::Added { symbol } => {
                println!("Added {symbol}.");
                return Ok(());
            }
            AddOutcome::AlreadyTracked { symbol } => {
                println!("{symbol} is already tracked.");
                return Ok(());
            }
            AddOutcome::Unavailable { symbol } => {
                prompt(&format!(
                    "'{symbol}' is not available on Binance. Retry? [y/N] "
                ))?;
                match input.next_line().await? {
                    Some(answer) if answer.trim().eq_ignore_ascii_case("y") => raw.clear(),
                    _ => return Ok(()),
                }
            }
        }
    }
}

/// Remove flow: single attempt, no retry loop.
async fn remove_interactive(
    command_tx: &mpsc::Sender<Command>,
    input: &mut Lines<BufReader<Stdin>>,
    mut raw: String,
) -> anyhow::Result<()> {
    if raw.trim().is_empty() {
        prompt("Symbol to remove: ")?;
        raw = match input.next_line().await? {
            Some(answer) => answer,
            None => return Ok(()),
        };
        if raw.trim().is_empty() {
            return Ok(());
        }
    }

    let (reply_tx, reply_rx) = oneshot::channel();
    let command = Command::Remove {
        raw,
        reply: reply_tx,
    };
    if command_tx.send(command).await.is_err() {
        return Ok(());
    }
    let Ok(outcome) = reply_rx.await else {
        return Ok(());
    };

    match outcome {
        RemoveOutcome::Empty => {}
        RemoveOutcome::Removed { symbol } => println!("Removed {symbol}."),
        RemoveOutcome::NotTracked { symbol } => println!("{symbol} is not tracked."),
    }
    Ok(())
}

fn startup_toggle(arg: &str) {
    let shim = match StartupShim::from_env() {
        Ok(shim) => shim,
        Err(e) => {
            println!("Startup toggle unavailable: {e}");
            return;
        }
    };

    match arg {
        "on" => match shim.enable() {
            Ok(()) => println!("Run at login enabled."),
            Err(e) => println!("Startup error: {e}"),
        },
        "off" => match shim.disable() {
            Ok(()) => println!("Run at login disabled."),
            Err(e) => println!("Startup error: {e}"),
        },
        // Status always re-reads the on-disk truth, including right after
        // a failed enable/disable.
        _ => println!(
            "Run at login is {}.",
            if shim.is_enabled() {
                "enabled"
            } else {
                "disabled"
            }
        ),
    }
}

fn prompt(text: &str) -> anyhow::Result<()> {
    print!("{text}");
    std::io::stdout().flush()?;
    Ok(())
}
