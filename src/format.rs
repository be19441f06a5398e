/// Renders a price for the label block. Large values drop decimals
/// entirely, mid-range values keep four, sub-unit values keep up to eight
/// with trailing zeros stripped.
pub fn format_price(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    if value >= 1000.0 {
        group_thousands(&format!("{value:.0}"))
    } else if value >= 1.0 {
        let fixed = format!("{value:.4}");
        match fixed.split_once('.') {
            Some((int_part, frac_part)) => {
                format!("{}.{}", group_thousands(int_part), frac_part)
            }
            None => fixed,
        }
    } else {
        // Also the fallthrough for zero and negatives.
        format!("{value:.8}")
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    }
}

fn group_thousands(digits: &str) -> String {
    let (sign, digits) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits),
    };

    let bytes = digits.as_bytes();
    let mut out = String::with_capacity(sign.len() + bytes.len() + bytes.len() / 3);
    out.push_str(sign);
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 && (bytes.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(*b as char);
    }
    out
}
