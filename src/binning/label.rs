//! Bin label rendering.
//!
//! Labels are regenerated (not stored) when mapping a clicked result back
//! to its bin, so rendering must be a pure function of the edges, the
//! 1-based sequence number and the [`LabelStyle`].

use super::params::LabelStyle;

/// Template that is rendered with bracket notation instead of literally.
pub const BRACKET_TEMPLATE: &str = "{lo}-{hi}";

/// Label of the bucket holding null values.
pub const NULL_LABEL: &str = "(null)";

/// Render a bin boundary.
///
/// Plain numbers keep up to two decimals with trailing zeros trimmed.
/// With `k_format`, magnitudes of a thousand or more use `K`/`M` suffixes
/// with one decimal.
pub fn format_number(value: f64, k_format: bool) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let abs = value.abs();
    if k_format && abs >= 1_000_000.0 {
        format!("{}M", trim_decimals(&format!("{:.1}", value / 1_000_000.0)))
    } else if k_format && abs >= 1_000.0 {
        format!("{}K", trim_decimals(&format!("{:.1}", value / 1_000.0)))
    } else {
        trim_decimals(&format!("{value:.2}"))
    }
}

fn trim_decimals(s: &str) -> String {
    let trimmed = if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    };
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Render the label of one bin.
pub fn bin_label(lo: f64, hi: f64, seq: usize, style: &LabelStyle) -> String {
    let lo_text = format_number(lo, style.k_format);
    let hi_text = format_number(hi, style.k_format);
    match style.template.as_deref() {
        Some(template) if template != BRACKET_TEMPLATE && !template.is_empty() => template
            .replace("{lo}", &lo_text)
            .replace("{hi}", &hi_text)
            .replace("{n}", &seq.to_string()),
        _ => format!(
            "{}{}, {}{}",
            style.interval.open_char(),
            lo_text,
            hi_text,
            style.interval.close_char()
        ),
    }
}
