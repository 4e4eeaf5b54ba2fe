//! Request and response shapes exchanged with the report service.
//!
//! Field names are camelCase on the wire.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::query::{Join, Scalar};

/// One result row, keyed by header.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Response to an execute call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteResponse {
    #[serde(default)]
    pub headers: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Row>,
    /// Absent when the executor does not paginate.
    #[serde(default)]
    pub pagination: Option<Pagination>,
    #[serde(default)]
    pub total_rows: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

/// Tables whose connectivity should be checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinPathRequest {
    pub connection_id: String,
    pub tables: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinPathResponse {
    pub path_exists: bool,
    #[serde(default)]
    pub message: String,
}

impl JoinPathResponse {
    pub fn connected() -> Self {
        Self {
            path_exists: true,
            message: String::new(),
        }
    }

    pub fn disconnected(message: impl Into<String>) -> Self {
        Self {
            path_exists: false,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoJoinResponse {
    #[serde(default)]
    pub joins: Vec<Join>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistinctValuesRequest {
    pub connection_id: String,
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DistinctValues {
    #[serde(default)]
    pub values: Vec<Scalar>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DistinctValuesResponse {
    /// Keyed by field full name.
    #[serde(default)]
    pub data: BTreeMap<String, DistinctValues>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadersRequest {
    pub connection_id: String,
    pub report_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadersResponse {
    #[serde(default)]
    pub headers: Vec<String>,
}
