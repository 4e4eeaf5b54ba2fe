//! Declared column types.

use serde::{Deserialize, Serialize};

/// Declared type of a catalog field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Text,
    Integer,
    Decimal,
    Float,
    Boolean,
    Date,
    Timestamp,
    /// Type not known (e.g. columns exposed by a saved report).
    #[default]
    Unknown,
}

impl DataType {
    /// Parse a declared type name as reported by the data source.
    ///
    /// Common SQL spellings are accepted; anything unrecognised maps to
    /// [`DataType::Unknown`].
    pub fn from_declared(s: &str) -> Self {
        let lower = s.trim().to_lowercase();
        // Strip precision/scale: decimal(10,2) -> decimal
        let base = lower.split('(').next().unwrap_or("").trim();
        match base {
            "text" | "string" | "varchar" | "nvarchar" | "char" | "nchar" => DataType::Text,
            "int" | "integer" | "bigint" | "smallint" | "tinyint" => DataType::Integer,
            "decimal" | "numeric" | "money" => DataType::Decimal,
            "float" | "double" | "real" => DataType::Float,
            "bool" | "boolean" | "bit" => DataType::Boolean,
            "date" => DataType::Date,
            "timestamp" | "datetime" | "datetime2" | "timestamptz" => DataType::Timestamp,
            _ => DataType::Unknown,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, DataType::Integer | DataType::Decimal | DataType::Float)
    }

    pub fn is_temporal(&self) -> bool {
        matches!(self, DataType::Date | DataType::Timestamp)
    }
}
