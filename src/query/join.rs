//! Manual join edges.

use serde::{Deserialize, Serialize};

use crate::catalog::FieldCatalog;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JoinType {
    #[default]
    Inner,
    Left,
}

/// A manual edge between two qualified columns.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Join {
    pub left_column: String,
    #[serde(rename = "type", default)]
    pub join_type: JoinType,
    pub right_column: String,
}

impl Join {
    pub fn new(left: impl Into<String>, join_type: JoinType, right: impl Into<String>) -> Self {
        Self {
            left_column: left.into(),
            join_type,
            right_column: right.into(),
        }
    }

    pub fn inner(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self::new(left, JoinType::Inner, right)
    }

    /// Source identifiers on each side, when both columns resolve to one.
    pub fn sources(&self, catalog: &FieldCatalog) -> Option<(String, String)> {
        let left = catalog.source_of(&self.left_column)?;
        let right = catalog.source_of(&self.right_column)?;
        Some((left, right))
    }

    /// Does this join touch `source` and connect it to a different source?
    pub fn connects(&self, source: &str, catalog: &FieldCatalog) -> bool {
        match self.sources(catalog) {
            Some((l, r)) => l != r && (l == source || r == source),
            None => false,
        }
    }
}
