//! Display formats for result columns.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatType {
    #[default]
    None,
    Number,
    Currency,
    Percent,
}

/// Per-field display format.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Format {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(rename = "type", default)]
    pub format_type: FormatType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
}

impl Format {
    pub fn number(decimals: u8) -> Self {
        Self {
            format_type: FormatType::Number,
            decimals: Some(decimals),
            ..Self::default()
        }
    }

    pub fn currency(symbol: impl Into<String>, decimals: u8) -> Self {
        Self {
            format_type: FormatType::Currency,
            decimals: Some(decimals),
            symbol: Some(symbol.into()),
            ..Self::default()
        }
    }

    pub fn percent(decimals: u8) -> Self {
        Self {
            format_type: FormatType::Percent,
            decimals: Some(decimals),
            ..Self::default()
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }
}
