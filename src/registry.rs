use tracing::info;

use crate::symbols::normalize;
use crate::traits::QuoteSource;

#[derive(Debug, PartialEq, Eq)]
pub enum AddOutcome {
    /// Input normalized to nothing; treat as a cancelled prompt.
    Empty,
    /// Quote validation failed. The front end decides whether to retry.
    Unavailable { symbol: String },
    AlreadyTracked { symbol: String },
    /// Appended at the end of the watchlist. The caller should trigger an
    /// immediate refresh so the new symbol shows up right away.
    Added { symbol: String },
}

#[derive(Debug, PartialEq, Eq)]
pub enum RemoveOutcome {
    Empty,
    NotTracked { symbol: String },
    Removed { symbol: String },
}

/// Owns the ordered watchlist. Insertion order is display order; no
/// duplicates. Adds validate against the live quote source before the
/// mutation commits, so a symbol Binance does not trade never enters the
/// set.
pub struct SymbolRegistry {
    symbols: Vec<String>,
}

impl SymbolRegistry {
    pub fn new(defaults: &[&str]) -> Self {
        let mut registry = Self {
            symbols: Vec::with_capacity(defaults.len()),
        };
        for raw in defaults {
            let symbol = normalize(raw);
            if !symbol.is_empty() && !registry.contains(&symbol) {
                registry.symbols.push(symbol);
            }
        }
        registry
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.iter().any(|s| s == symbol)
    }

    pub async fn add(&mut self, raw: &str, source: &dyn QuoteSource) -> AddOutcome {
        let symbol = normalize(raw);
        if symbol.is_empty() {
            return AddOutcome::Empty;
        }
        if source.fetch_price(&symbol).await.is_none() {
            return AddOutcome::Unavailable { symbol };
        }
        if self.contains(&symbol) {
            return AddOutcome::AlreadyTracked { symbol };
        }
        self.symbols.push(symbol.clone());
        info!("Now tracking {}", symbol);
        AddOutcome::Added { symbol }
    }

    pub fn remove(&mut self, raw: &str) -> RemoveOutcome {
        let symbol = normalize(raw);
        if symbol.is_empty() {
            return RemoveOutcome::Empty;
        }
        match self.symbols.iter().position(|s| s == &symbol) {
            Some(index) => {
                self.symbols.remove(index);
                info!("Stopped tracking {}", symbol);
                RemoveOutcome::Removed { symbol }
            }
            None => RemoveOutcome::NotTracked { symbol },
        }
    }
}
