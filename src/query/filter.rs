//! Filter predicates.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Comparison operator of a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterOperator {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    NotEq,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">=")]
    GtEq,
    #[serde(rename = "<=")]
    LtEq,
    #[serde(rename = "LIKE")]
    Like,
    #[serde(rename = "IN")]
    In,
    #[serde(rename = "BETWEEN")]
    Between,
}

impl FilterOperator {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "=" => Some(Self::Eq),
            "!=" | "<>" => Some(Self::NotEq),
            ">" => Some(Self::Gt),
            "<" => Some(Self::Lt),
            ">=" => Some(Self::GtEq),
            "<=" => Some(Self::LtEq),
            "LIKE" => Some(Self::Like),
            "IN" => Some(Self::In),
            "BETWEEN" => Some(Self::Between),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::GtEq => ">=",
            Self::LtEq => "<=",
            Self::Like => "LIKE",
            Self::In => "IN",
            Self::Between => "BETWEEN",
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single literal value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Scalar {
    /// Interpret user-typed text: numbers become numbers, the rest stays text.
    pub fn from_input(text: &str) -> Self {
        let trimmed = text.trim();
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => Scalar::Number(n),
            _ => Scalar::Text(trimmed.to_string()),
        }
    }

    /// Convert a result cell into a filter literal.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Scalar::Null,
            serde_json::Value::Bool(b) => Scalar::Bool(*b),
            serde_json::Value::Number(n) => n.as_f64().map_or(Scalar::Null, Scalar::Number),
            serde_json::Value::String(s) => Scalar::Text(s.clone()),
            other => Scalar::Text(other.to_string()),
        }
    }
}

impl From<f64> for Scalar {
    fn from(n: f64) -> Self {
        Scalar::Number(n)
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Text(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Text(s)
    }
}

/// Right-hand side of a filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    // List before Range: a two-element array would otherwise parse as a range
    List(Vec<Scalar>),
    Range { low: Scalar, high: Scalar },
    Single(Scalar),
}

impl FilterValue {
    /// Parse free-text input for an operator: comma-separated for `IN`,
    /// `low..high` or `low,high` for `BETWEEN`, a single literal otherwise.
    pub fn from_input(operator: FilterOperator, text: &str) -> Self {
        match operator {
            FilterOperator::In => FilterValue::List(
                text.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(Scalar::from_input)
                    .collect(),
            ),
            FilterOperator::Between => {
                let parts: Vec<&str> = if text.contains("..") {
                    text.splitn(2, "..").collect()
                } else {
                    text.splitn(2, ',').collect()
                };
                match parts.as_slice() {
                    [low, high] => FilterValue::Range {
                        low: Scalar::from_input(low),
                        high: Scalar::from_input(high),
                    },
                    _ => FilterValue::Single(Scalar::from_input(text)),
                }
            }
            _ => FilterValue::Single(Scalar::from_input(text)),
        }
    }
}

/// A filter predicate on a qualified field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    pub field: String,
    pub operator: FilterOperator,
    pub value: FilterValue,
}

impl Filter {
    pub fn new(field: impl Into<String>, operator: FilterOperator, value: FilterValue) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
        }
    }

    pub fn equals(field: impl Into<String>, value: impl Into<Scalar>) -> Self {
        Self::new(field, FilterOperator::Eq, FilterValue::Single(value.into()))
    }

    pub fn between(field: impl Into<String>, low: f64, high: f64) -> Self {
        Self::new(
            field,
            FilterOperator::Between,
            FilterValue::Range {
                low: Scalar::Number(low),
                high: Scalar::Number(high),
            },
        )
    }

    pub fn like(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::new(
            field,
            FilterOperator::Like,
            FilterValue::Single(Scalar::Text(pattern.into())),
        )
    }

    pub fn one_of(field: impl Into<String>, values: Vec<Scalar>) -> Self {
        Self::new(field, FilterOperator::In, FilterValue::List(values))
    }
}
