use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use crate::remote::{TickerPriceResponse, get_rest_base_url};
use crate::traits::QuoteSource;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(6);

pub struct BinanceClient {
    client: Client,
    base_url: String,
}

impl BinanceClient {
    pub fn new() -> Self {
        Self::with_base_url(get_rest_base_url())
    }

    pub fn with_base_url(base_url: String) -> Self {
        Self {
            client: Client::builder()
                .user_agent("binance_ticker/0.1.0")
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("Failed to build HTTP client."),
            base_url,
        }
    }

    async fn request_ticker(&self, symbol: &str) -> Option<TickerPriceResponse> {
        let url = format!("{}/api/v3/ticker/price", self.base_url);

        let response = match self
            .client
            .get(&url)
            .query(&[("symbol", symbol)])
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("Ticker request for {} failed: {}", symbol, e);
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            // Unknown symbols come back as 400; treated the same as any
            // other unavailable quote.
            debug!("Quote service answered {} for {}", status, symbol);
            return None;
        }

        match response.json::<TickerPriceResponse>().await {
            Ok(body) => Some(body),
            Err(e) => {
                warn!("Malformed ticker body for {}: {}", symbol, e);
                None
            }
        }
    }
}

#[async_trait]
impl QuoteSource for BinanceClient {
    async fn fetch_price(&self, symbol: &str) -> Option<f64> {
        let body = self.request_ticker(symbol).await?;
        let price = body.price_f64();
        match price {
            Some(value) => debug!("Quote {} = {}", body.symbol, value),
            None => warn!("Ticker for {} carried a non-numeric price", symbol),
        }
        price
    }

    async fn fetch_all_prices(&self, symbols: &[String]) -> Vec<(String, Option<f64>)> {
        let mut readings = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            readings.push((symbol.clone(), self.fetch_price(symbol).await));
        }
        readings
    }
}

impl Default for BinanceClient {
    fn default() -> Self {
        Self::new()
    }
}
