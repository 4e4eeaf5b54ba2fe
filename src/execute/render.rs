//! Applying column formats to a result page.

use serde_json::Value;

use super::view::{ResultView, EMPTY_MESSAGE};
use crate::query::{Format, FormatType, QueryModel};

const DEFAULT_DECIMALS: u8 = 2;
const DEFAULT_CURRENCY: &str = "$";

/// A result page as display strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RenderedTable {
    /// Format every cell of `view` using the model's formats and aliases.
    pub fn build(view: &ResultView, model: &QueryModel) -> Self {
        let formats: Vec<Option<&Format>> = view
            .headers
            .iter()
            .map(|h| format_for_header(model, h))
            .collect();

        let headers = view
            .headers
            .iter()
            .zip(&formats)
            .map(|(h, f)| display_header(model, h, *f))
            .collect();

        let rows = view
            .rows
            .iter()
            .map(|row| {
                view.headers
                    .iter()
                    .zip(&formats)
                    .map(|(h, f)| format_cell(row.get(h).unwrap_or(&Value::Null), *f))
                    .collect()
            })
            .collect();

        Self { headers, rows }
    }

    /// Plain-text table; the empty state renders [`EMPTY_MESSAGE`].
    pub fn to_text(&self) -> String {
        if self.rows.is_empty() {
            return EMPTY_MESSAGE.to_string();
        }
        let widths: Vec<usize> = self
            .headers
            .iter()
            .enumerate()
            .map(|(i, h)| {
                self.rows
                    .iter()
                    .map(|r| r.get(i).map_or(0, |c| c.chars().count()))
                    .chain(std::iter::once(h.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let line = |cells: &[String]| {
            cells
                .iter()
                .zip(&widths)
                .map(|(c, &w)| format!("{c:<w$}"))
                .collect::<Vec<_>>()
                .join(" | ")
                .trim_end()
                .to_string()
        };

        let mut out = vec![line(&self.headers)];
        out.push(
            widths
                .iter()
                .map(|w| "-".repeat(*w))
                .collect::<Vec<_>>()
                .join("-+-"),
        );
        out.extend(self.rows.iter().map(|r| line(r)));
        out.join("\n")
    }
}

/// The format for an executor header, which is either a field name or a
/// column alias.
fn format_for_header<'m>(model: &'m QueryModel, header: &str) -> Option<&'m Format> {
    model.formats.get(header).or_else(|| {
        model
            .column_for_header(header)
            .and_then(|c| model.formats.get(&c.field))
    })
}

fn display_header(model: &QueryModel, header: &str, format: Option<&Format>) -> String {
    format
        .and_then(|f| f.alias.clone())
        .or_else(|| model.column_for_header(header).and_then(|c| c.alias.clone()))
        .unwrap_or_else(|| header.to_string())
}

/// Render one cell. Values that are not numeric are shown raw whatever
/// the format.
pub fn format_cell(value: &Value, format: Option<&Format>) -> String {
    let raw = || match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };

    let Some(format) = format.filter(|f| f.format_type != FormatType::None) else {
        return raw();
    };
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    let Some(number) = number.filter(|n| n.is_finite()) else {
        return raw();
    };

    let decimals = format.decimals.unwrap_or(DEFAULT_DECIMALS);
    match format.format_type {
        FormatType::Number => group_thousands(number, decimals),
        FormatType::Currency => {
            let symbol = format.symbol.as_deref().unwrap_or(DEFAULT_CURRENCY);
            let body = group_thousands(number.abs(), decimals);
            if number < 0.0 {
                format!("-{symbol}{body}")
            } else {
                format!("{symbol}{body}")
            }
        }
        FormatType::Percent => format!("{number:.prec$}%", prec = decimals as usize),
        FormatType::None => raw(),
    }
}

/// Fixed decimals with comma thousands separators.
fn group_thousands(value: f64, decimals: u8) -> String {
    let fixed = format!("{:.prec$}", value.abs(), prec = decimals as usize);
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, d) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*d);
    }

    let negative = value < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0');
    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}
