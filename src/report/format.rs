//! Number formatting for rendered reports.

/// Group an integer string with comma thousands separators.
fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Format a value with thousands separators and zero decimals. Halves round
/// to the nearest even integer, as the dashboard's number formatting does.
pub fn format_amount(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let rounded = value.round_ties_even();
    let rounded = if rounded == 0.0 { 0.0 } else { rounded }; // normalize `-0.0`
    let digits = format!("{:.0}", rounded.abs());

    if rounded < 0.0 {
        format!("-{}", group_thousands(&digits))
    } else {
        group_thousands(&digits)
    }
}

/// Format a currency value, e.g. `Rp 1,234,567`.
pub fn format_currency(prefix: &str, value: f64) -> String {
    if prefix.is_empty() {
        format_amount(value)
    } else {
        format!("{} {}", prefix, format_amount(value))
    }
}

/// Format a count with thousands separators.
pub fn format_count(value: usize) -> String {
    group_thousands(&value.to_string())
}
