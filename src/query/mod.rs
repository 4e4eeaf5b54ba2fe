//! Canonical query model.
//!
//! [`QueryModel`] is the single authoritative description of the composed
//! query and the only object ever sent to the executor. It is rebuilt
//! wholesale by the synchronizer (see [`crate::builder`]) and its `filters`
//! are additionally written by the drill-down navigator; nothing else
//! mutates it.

mod calculated;
mod column;
mod filter;
mod format;
mod group;
mod join;

pub use calculated::CalculatedField;
pub use column::{Aggregation, Column};
pub use filter::{Filter, FilterOperator, FilterValue, Scalar};
pub use format::{Format, FormatType};
pub use group::{Group, GroupMethod, Sort, SortDirection};
pub use join::{Join, JoinType};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Default rows per page.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// The canonical query model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryModel {
    #[serde(default)]
    pub connection_id: Option<String>,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub filters: Vec<Filter>,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub sorts: Vec<Sort>,
    #[serde(default)]
    pub joins: Vec<Join>,
    #[serde(default)]
    pub calculated_fields: Vec<CalculatedField>,
    #[serde(default)]
    pub formats: BTreeMap<String, Format>,
    /// Merged filter sources; written just before each execution.
    #[serde(default)]
    pub user_filters: Vec<Filter>,
    /// 1-indexed.
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl Default for QueryModel {
    fn default() -> Self {
        Self {
            connection_id: None,
            columns: Vec::new(),
            filters: Vec::new(),
            groups: Vec::new(),
            sorts: Vec::new(),
            joins: Vec::new(),
            calculated_fields: Vec::new(),
            formats: BTreeMap::new(),
            user_filters: Vec::new(),
            page: default_page(),
            page_size: default_page_size(),
        }
    }
}

impl QueryModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_connection(connection_id: impl Into<String>) -> Self {
        Self {
            connection_id: Some(connection_id.into()),
            ..Self::default()
        }
    }

    /// Whether there is anything to select (at least one column or group).
    pub fn has_selection(&self) -> bool {
        !self.columns.is_empty() || !self.groups.is_empty()
    }

    /// Find the group on a field, if any.
    pub fn group_for(&self, field: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.field == field)
    }

    /// Find the column whose displayed header is `header` (alias or field).
    pub fn column_for_header(&self, header: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| c.alias.as_deref() == Some(header) || c.field == header)
    }
}
