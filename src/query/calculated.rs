//! Calculated fields.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::catalog::CALC_PREFIX;

/// Qualified names inside a formula: `table.column`, `schema.table.column`,
/// `calc__name` or `report__id.column` (the latter without spaces).
static REFERENCE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(calc__\w+|[A-Za-z_]\w*(?:\.[A-Za-z_]\w*){1,2})\b").unwrap()
});

/// A formula-defined field, treated as numeric for aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatedField {
    pub name: String,
    pub formula: String,
}

impl CalculatedField {
    pub fn new(name: impl Into<String>, formula: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            formula: formula.into(),
        }
    }

    /// Qualified name used to select this field (`calc__<name>`).
    pub fn full_name(&self) -> String {
        format!("{CALC_PREFIX}{}", self.name)
    }

    /// Qualified field names referenced by the formula, in order of first use.
    pub fn references(&self) -> Vec<String> {
        let mut refs: Vec<String> = Vec::new();
        for m in REFERENCE_PATTERN.find_iter(&self.formula) {
            let name = m.as_str();
            if !refs.iter().any(|r| r == name) {
                refs.push(name.to_string());
            }
        }
        refs
    }
}
