use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::display::LabelSink;
use crate::format::format_price;
use crate::registry::{AddOutcome, RemoveOutcome, SymbolRegistry};
use crate::traits::QuoteSource;

pub const REFRESH_INTERVAL: Duration = Duration::from_millis(2000);

/// Watchlist edits sent by the front end. The reply carries the outcome
/// once the mutation (and the follow-up refresh, when one happened) has
/// completed, so the interactive action blocks until the labels are out.
pub enum Command {
    Add {
        raw: String,
        reply: oneshot::Sender<AddOutcome>,
    },
    Remove {
        raw: String,
        reply: oneshot::Sender<RemoveOutcome>,
    },
}

/// The process heartbeat: one loop that alternates between timed refresh
/// cycles and watchlist commands. Dropping the command sender is the only
/// way to stop it.
pub struct TickerService<Q, S> {
    registry: SymbolRegistry,
    source: Q,
    sink: S,
    command_rx: mpsc::Receiver<Command>,
    interval: Duration,
}

impl<Q: QuoteSource, S: LabelSink> TickerService<Q, S> {
    pub fn new(
        registry: SymbolRegistry,
        source: Q,
        sink: S,
        command_rx: mpsc::Receiver<Command>,
    ) -> Self {
        Self {
            registry,
            source,
            sink,
            command_rx,
            interval: REFRESH_INTERVAL,
        }
    }

    #[cfg(test)]
    fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub async fn run(mut self) {
        let mut ticker = time::interval(self.interval);
        // The timer only re-arms once the current cycle has fully
        // completed; a slow batch must not cause a burst of catch-up
        // ticks or an overlapping cycle.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // The first tick fires immediately, so the seeded symbols show up
        // without waiting a full interval.
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.refresh_cycle().await;
                }
                command = self.command_rx.recv() => {
                    match command {
                        Some(command) => self.handle_command(command).await,
                        None => {
                            info!("Command channel closed. Stopping refresh loop.");
                            break;
                        }
                    }
                }
            }
        }
    }

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::Add { raw, reply } => {
                let outcome = self.registry.add(&raw, &self.source).await;
                if matches!(outcome, AddOutcome::Added { .. }) {
                    self.refresh_cycle().await;
                }
                let _ = reply.send(outcome);
            }
            Command::Remove { raw, reply } => {
                let outcome = self.registry.remove(&raw);
                if matches!(outcome, RemoveOutcome::Removed { .. }) {
                    self.refresh_cycle().await;
                }
                let _ = reply.send(outcome);
            }
        }
    }

    /// One full fetch-and-render pass over the watchlist. Never fails:
    /// a sink error degrades to a single synthetic error line and the
    /// next tick happens regardless.
    async fn refresh_cycle(&mut self) {
        let readings = self.source.fetch_all_prices(self.registry.symbols()).await;

        let lines: Vec<String> = readings
            .iter()
            .map(|(symbol, reading)| match reading {
                Some(price) => format!("{}: {}", symbol, format_price(*price)),
                None => format!("{symbol}: N/A"),
            })
            .collect();

        debug!("Refreshed {} symbols", lines.len());

        if let Err(e) = self.sink.publish(&lines) {
            error!("Publishing labels failed: {}", e);
            let fallback = vec![format!("Error: {e}")];
            if let Err(e) = self.sink.publish(&fallback) {
                error!("Error line could not be published either: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use anyhow::bail;

    use super::*;
    use crate::traits::MockQuoteSource;

    #[derive(Clone)]
    struct RecordingSink {
        published: Arc<Mutex<Vec<Vec<String>>>>,
        failures_left: Arc<Mutex<usize>>,
    }

    impl RecordingSink {
        fn new(failures: usize) -> Self {
            Self {
                published: Arc::new(Mutex::new(Vec::new())),
                failures_left: Arc::new(Mutex::new(failures)),
            }
        }

        fn published(&self) -> Vec<Vec<String>> {
            self.published.lock().unwrap().clone()
        }
    }

    impl LabelSink for RecordingSink {
        fn publish(&mut self, lines: &[String]) -> anyhow::Result<()> {
            let mut failures = self.failures_left.lock().unwrap();
            if *failures > 0 {
                *failures -= 1;
                bail!("label backend offline");
            }
            self.published.lock().unwrap().push(lines.to_vec());
            Ok(())
        }
    }

    fn echo_source(price_of: fn(&str) -> Option<f64>) -> MockQuoteSource {
        let mut source = MockQuoteSource::new();
        source
            .expect_fetch_all_prices()
            .returning(move |symbols: &[String]| {
                symbols.iter().map(|s| (s.clone(), price_of(s))).collect()
            });
        source.expect_fetch_price().returning(move |s| price_of(s));
        source
    }

    #[tokio::test]
    async fn cycle_renders_available_and_unavailable_lines_independently() {
        let source = echo_source(|s| match s {
            "BTCUSDT" => Some(64250.0),
            _ => None,
        });
        let sink = RecordingSink::new(0);
        let (_tx, rx) = mpsc::channel(1);
        let registry = SymbolRegistry::new(&["BTCUSDT", "FOOUSDT"]);
        let mut service = TickerService::new(registry, source, sink.clone(), rx);

        service.refresh_cycle().await;

        assert_eq!(
            sink.published(),
            vec![vec!["BTCUSDT: 64,250".to_string(), "FOOUSDT: N/A".to_string()]]
        );
    }

    #[tokio::test]
    async fn successful_add_refreshes_before_replying() {
        let source = echo_source(|_| Some(12.3456789));
        let sink = RecordingSink::new(0);
        let (_tx, rx) = mpsc::channel(1);
        let registry = SymbolRegistry::new(&[]);
        let mut service = TickerService::new(registry, source, sink.clone(), rx);

        let (reply_tx, mut reply_rx) = oneshot::channel();
        service
            .handle_command(Command::Add {
                raw: "eth".into(),
                reply: reply_tx,
            })
            .await;

        // The reply is only sent after the inline refresh, so by now the
        // new symbol's line must already be published.
        assert_eq!(
            reply_rx.try_recv().unwrap(),
            AddOutcome::Added {
                symbol: "ETHUSDT".into()
            }
        );
        assert_eq!(sink.published(), vec![vec!["ETHUSDT: 12.3457".to_string()]]);
    }

    #[tokio::test]
    async fn failed_remove_does_not_refresh() {
        let source = echo_source(|_| Some(1.0));
        let sink = RecordingSink::new(0);
        let (_tx, rx) = mpsc::channel(1);
        let registry = SymbolRegistry::new(&["BTCUSDT"]);
        let mut service = TickerService::new(registry, source, sink.clone(), rx);

        let (reply_tx, mut reply_rx) = oneshot::channel();
        service
            .handle_command(Command::Remove {
                raw: "eth".into(),
                reply: reply_tx,
            })
            .await;

        assert_eq!(
            reply_rx.try_recv().unwrap(),
            RemoveOutcome::NotTracked {
                symbol: "ETHUSDT".into()
            }
        );
        assert!(sink.published().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn timer_rearms_after_a_cycle_that_fails_to_publish() {
        let source = echo_source(|_| Some(0.5));
        // First publish attempt fails; the synthetic error line and all
        // later cycles go through.
        let sink = RecordingSink::new(1);
        let (tx, rx) = mpsc::channel::<Command>(1);
        let registry = SymbolRegistry::new(&["BTCUSDT"]);
        let service = TickerService::new(registry, source, sink.clone(), rx)
            .with_interval(Duration::from_millis(20));

        let handle = tokio::spawn(service.run());
        // Let the spawned service register its interval before the paused
        // clock is advanced; otherwise the advances happen before the
        // timer exists and collapse into a single tick.
        tokio::task::yield_now().await;
        // The first cycle fires at t=0; step the clock through three more
        // intervals.
        for _ in 0..3 {
            time::advance(Duration::from_millis(20)).await;
        }
        drop(tx);
        handle.await.unwrap();

        let published = sink.published();
        assert!(
            published.len() >= 2,
            "expected ticks after the failed cycle, got {published:?}"
        );
        assert!(
            published[0][0].starts_with("Error:"),
            "first surviving publish should be the synthetic error line"
        );
        assert!(
            published[1..]
                .iter()
                .all(|lines| lines == &["BTCUSDT: 0.5".to_string()]),
            "later cycles should publish normal labels, got {published:?}"
        );
    }
}
