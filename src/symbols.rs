/// Quote currencies Binance pairs can end in. Anything else is treated as
/// a bare base asset and paired against USDT.
pub const QUOTE_SUFFIXES: &[&str; 4] = &["USDT", "BUSD", "BTC", "ETH"];

const DEFAULT_QUOTE: &str = "USDT";

/// Turns raw user input into a canonical pair token: trimmed, uppercased,
/// default quote suffix appended when none is present. Empty input stays
/// empty so callers can treat it as a cancelled prompt.
pub fn normalize(raw: &str) -> String {
    let mut symbol = raw.trim().to_uppercase();
    if symbol.is_empty() {
        return symbol;
    }
    // A token counts as suffixed only when a base part precedes the
    // suffix; a bare "BTC" or "ETH" is a base asset, not a pair.
    if !QUOTE_SUFFIXES
        .iter()
        .any(|q| symbol.len() > q.len() && symbol.ends_with(q))
    {
        symbol.push_str(DEFAULT_QUOTE);
    }
    symbol
}
