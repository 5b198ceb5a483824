//! Number formatting shared by CLI summaries.

/// Formats a value rounded to `decimals`, `-` when missing.
///
/// # Examples
///
/// ```
/// use panel_common::format_amount;
///
/// assert_eq!(format_amount(Some(1234.567), 1), "1234.6");
/// assert_eq!(format_amount(None, 2), "-");
/// ```
pub fn format_amount(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{v:.decimals$}"),
        None => "-".to_string(),
    }
}

/// Formats a ratio as a signed percentage, e.g. `0.125` → `+12.5%`.
pub fn format_ratio(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:+.1}%", v * 100.0),
        None => "-".to_string(),
    }
}
