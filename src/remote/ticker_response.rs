use serde::Deserialize;

/// Body of `GET /api/v3/ticker/price`. Binance sends the price as a
/// decimal string, but a plain number is accepted too.
#[derive(Deserialize, Debug)]
pub struct TickerPriceResponse {
    pub symbol: String,
    pub price: PriceField,
}

#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub enum PriceField {
    Text(String),
    Number(f64),
}

impl TickerPriceResponse {
    /// `None` when the price field does not carry a usable number.
    pub fn price_f64(&self) -> Option<f64> {
        let value = match &self.price {
            PriceField::Text(s) => s.trim().parse::<f64>().ok()?,
            PriceField::Number(n) => *n,
        };
        value.is_finite().then_some(value)
    }
}
