//! Field catalog.
//!
//! Read-only registry mapping each selectable field to its qualifying
//! source, declared type and numeric classification. Three kinds of fields
//! are recognised by their qualified name:
//!
//! ```text
//! orders.total              base table column
//! calc__margin              calculated field (resolved by the synchronizer)
//! report__42.Customer Name  column exposed by saved report 42
//! ```
//!
//! The catalog is populated from the schema browser (tables) and from the
//! derived-source header lookup (saved reports). It can also be loaded from
//! a JSON snapshot, which is what the CLI does.

mod field;
mod types;

pub use field::{Field, FieldRef, FieldSource, CALC_PREFIX, REPORT_PREFIX};
pub use types::DataType;

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Error type for catalog loading.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse catalog: {0}")]
    Json(#[from] serde_json::Error),
}

/// Registry of available fields, keyed by qualified name.
#[derive(Debug, Clone, Default)]
pub struct FieldCatalog {
    fields: HashMap<String, Field>,
    /// Registration order, for stable listing.
    order: Vec<String>,
}

impl FieldCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a single field.
    pub fn register(&mut self, field: Field) {
        if !self.fields.contains_key(&field.full_name) {
            self.order.push(field.full_name.clone());
        }
        self.fields.insert(field.full_name.clone(), field);
    }

    /// Register every column of a base table.
    pub fn register_table<I, S>(&mut self, table: &str, columns: I)
    where
        I: IntoIterator<Item = (S, DataType)>,
        S: Into<String>,
    {
        for (column, data_type) in columns {
            self.register(Field::base(table, column, data_type));
        }
    }

    /// Register the output columns of a saved report.
    ///
    /// Any previously registered columns of the same report are replaced, so
    /// a refreshed header list never leaves stale columns behind.
    pub fn register_derived(&mut self, report_id: &str, headers: &[String]) {
        self.remove_derived(report_id);
        for header in headers {
            self.register(Field::derived(report_id, header.as_str(), DataType::Unknown));
        }
    }

    /// Remove all columns of a saved report.
    pub fn remove_derived(&mut self, report_id: &str) {
        let prefix = format!("{REPORT_PREFIX}{report_id}.");
        self.fields.retain(|name, _| !name.starts_with(&prefix));
        self.order.retain(|name| !name.starts_with(&prefix));
    }

    /// Look up a field by qualified name.
    pub fn resolve(&self, full_name: &str) -> Option<&Field> {
        self.fields.get(full_name)
    }

    /// Source id a field belongs to. Registered fields answer from their
    /// recorded source; anything else falls back to parsing the name.
    pub fn source_of(&self, full_name: &str) -> Option<String> {
        match self.resolve(full_name) {
            Some(field) => field.source_id(),
            None => FieldRef::parse(full_name)?.source_id(),
        }
    }

    pub fn contains(&self, full_name: &str) -> bool {
        self.fields.contains_key(full_name)
    }

    /// Fields in registration order.
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.order.iter().filter_map(|name| self.fields.get(name))
    }

    /// Column names of a base table, in registration order.
    pub fn table_columns(&self, table: &str) -> Vec<&str> {
        self.fields()
            .filter(|f| matches!(&f.source, FieldSource::Table { table: t } if t == table))
            .map(|f| f.name.as_str())
            .collect()
    }

    /// Output headers of a saved report, in registration order.
    pub fn derived_headers(&self, report_id: &str) -> Vec<&str> {
        self.fields()
            .filter(|f| matches!(&f.source, FieldSource::Derived { report_id: r } if r == report_id))
            .map(|f| f.name.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Build a catalog from a serialized snapshot.
    pub fn from_snapshot(snapshot: CatalogSnapshot) -> Self {
        let mut catalog = Self::new();
        for table in snapshot.tables {
            catalog.register_table(
                &table.name,
                table
                    .columns
                    .into_iter()
                    .map(|c| (c.name, DataType::from_declared(&c.declared_type))),
            );
        }
        for derived in snapshot.derived {
            catalog.register_derived(&derived.report_id, &derived.headers);
        }
        catalog
    }

    /// Load a catalog snapshot from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let content = fs::read_to_string(path)?;
        let snapshot: CatalogSnapshot = serde_json::from_str(&content)?;
        Ok(Self::from_snapshot(snapshot))
    }
}

/// Serialized form of a catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSnapshot {
    #[serde(default)]
    pub tables: Vec<TableSnapshot>,
    #[serde(default)]
    pub derived: Vec<DerivedSnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSnapshot {
    pub name: String,
    pub columns: Vec<ColumnSnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSnapshot {
    pub name: String,
    #[serde(rename = "type")]
    pub declared_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedSnapshot {
    pub report_id: String,
    pub headers: Vec<String>,
}
