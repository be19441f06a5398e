use async_trait::async_trait;

/// Boundary between the watchlist logic and the live exchange.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Latest price for one symbol, or `None` when the quote service
    /// cannot produce a value for any reason. The caller never learns
    /// whether the failure was transient or permanent.
    async fn fetch_price(&self, symbol: &str) -> Option<f64>;

    /// One reading per symbol, input order preserved. A failed fetch for
    /// one symbol does not affect the others.
    async fn fetch_all_prices(&self, symbols: &[String]) -> Vec<(String, Option<f64>)>;
}
