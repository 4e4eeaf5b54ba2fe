//! Field identity and qualified-name parsing.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::types::DataType;

/// Prefix marking a calculated field (`calc__<name>`).
pub const CALC_PREFIX: &str = "calc__";

/// Prefix marking a source exposed by a saved report (`report__<id>.<column>`).
pub const REPORT_PREFIX: &str = "report__";

static DERIVED_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^report__([A-Za-z0-9_\-]+)\.(.+)$").unwrap());

static BASE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^.]+(?:\.[^.]+)?)\.([^.]+)$").unwrap());

/// Where a field comes from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum FieldSource {
    /// A physical table (optionally schema-qualified).
    Table { table: String },
    /// A formula defined inside the current report.
    Calculated,
    /// A previously saved report used as a data source.
    Derived { report_id: String },
}

impl FieldSource {
    /// Source identifier used for join feasibility (`None` for calculated fields).
    pub fn source_id(&self) -> Option<String> {
        match self {
            FieldSource::Table { table } => Some(table.clone()),
            FieldSource::Calculated => None,
            FieldSource::Derived { report_id } => Some(format!("{REPORT_PREFIX}{report_id}")),
        }
    }

    pub fn is_derived(&self) -> bool {
        matches!(self, FieldSource::Derived { .. })
    }
}

/// A parsed qualified field name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldRef {
    Base { table: String, column: String },
    Calculated { name: String },
    Derived { report_id: String, column: String },
}

impl FieldRef {
    /// Classify a qualified name. Returns `None` for unqualified names.
    pub fn parse(full_name: &str) -> Option<Self> {
        if let Some(name) = full_name.strip_prefix(CALC_PREFIX) {
            return (!name.is_empty()).then(|| FieldRef::Calculated {
                name: name.to_string(),
            });
        }
        if let Some(caps) = DERIVED_PATTERN.captures(full_name) {
            return Some(FieldRef::Derived {
                report_id: caps[1].to_string(),
                column: caps[2].to_string(),
            });
        }
        if full_name.starts_with(REPORT_PREFIX) {
            return None;
        }
        BASE_PATTERN.captures(full_name).map(|caps| FieldRef::Base {
            table: caps[1].to_string(),
            column: caps[2].to_string(),
        })
    }

    /// The source identifier this reference belongs to.
    pub fn source_id(&self) -> Option<String> {
        match self {
            FieldRef::Base { table, .. } => Some(table.clone()),
            FieldRef::Calculated { .. } => None,
            FieldRef::Derived { report_id, .. } => Some(format!("{REPORT_PREFIX}{report_id}")),
        }
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldRef::Base { table, column } => write!(f, "{table}.{column}"),
            FieldRef::Calculated { name } => write!(f, "{CALC_PREFIX}{name}"),
            FieldRef::Derived { report_id, column } => {
                write!(f, "{REPORT_PREFIX}{report_id}.{column}")
            }
        }
    }
}

/// A selectable field resolved from the catalog. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub full_name: String,
    pub name: String,
    pub source: FieldSource,
    pub declared_type: DataType,
    pub is_numeric: bool,
}

impl Field {
    pub fn base(table: impl Into<String>, column: impl Into<String>, declared_type: DataType) -> Self {
        let table = table.into();
        let column = column.into();
        Self {
            full_name: format!("{table}.{column}"),
            name: column,
            source: FieldSource::Table { table },
            declared_type,
            is_numeric: declared_type.is_numeric(),
        }
    }

    /// Calculated fields are always treated as numeric for aggregation.
    pub fn calculated(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            full_name: format!("{CALC_PREFIX}{name}"),
            name,
            source: FieldSource::Calculated,
            declared_type: DataType::Float,
            is_numeric: true,
        }
    }

    pub fn derived(
        report_id: impl Into<String>,
        column: impl Into<String>,
        declared_type: DataType,
    ) -> Self {
        let report_id = report_id.into();
        let column = column.into();
        Self {
            full_name: format!("{REPORT_PREFIX}{report_id}.{column}"),
            name: column,
            source: FieldSource::Derived { report_id },
            declared_type,
            is_numeric: declared_type.is_numeric(),
        }
    }

    pub fn is_temporal(&self) -> bool {
        self.declared_type.is_temporal()
    }

    pub fn source_id(&self) -> Option<String> {
        self.source.source_id()
    }
}
