//! Line protocol spoken with the executor.
//!
//! One JSON object per line in each direction. The executor echoes the
//! request `id` on its reply, so replies may arrive in any order.

use serde::{Deserialize, Serialize};

/// Method names understood by the executor.
pub mod methods {
    pub const EXECUTE: &str = "report.execute";
    pub const REPORT_HEADERS: &str = "report.headers";
    pub const CHECK_JOIN_PATH: &str = "catalog.check_join_path";
    pub const AUTO_FIND_JOINS: &str = "catalog.auto_find_joins";
    pub const DISTINCT_VALUES: &str = "catalog.distinct_values";
}

#[derive(Debug, Clone, Serialize)]
pub struct ExecutorRequest<'a> {
    pub id: &'a str,
    pub method: &'a str,
    pub params: serde_json::Value,
}

/// One reply line. Exactly one of `result` and `error` is meaningful,
/// chosen by `success`.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecutorReply {
    pub id: String,
    pub success: bool,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<Fault>,
}

impl ExecutorReply {
    /// The reply synthesized for requests still waiting when the executor
    /// goes away.
    pub(crate) fn exited(id: String) -> Self {
        Self {
            id,
            success: false,
            result: None,
            error: Some(Fault {
                code: FaultKind::EXITED.to_string(),
                message: "executor exited".to_string(),
            }),
        }
    }

    pub fn into_outcome(self) -> Result<serde_json::Value, Fault> {
        if self.success {
            return Ok(self.result.unwrap_or(serde_json::Value::Null));
        }
        Err(self.error.unwrap_or_else(|| Fault {
            code: "UNKNOWN".to_string(),
            message: "executor reported failure without detail".to_string(),
        }))
    }
}

/// Failure reported by the executor.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Fault {
    pub code: String,
    /// Shown to the user unmodified.
    pub message: String,
}

impl Fault {
    pub fn kind(&self) -> FaultKind {
        match self.code.as_str() {
            "CONNECTION_FAILED" | "UNKNOWN_CONNECTION" => FaultKind::Connection,
            "INVALID_REQUEST" => FaultKind::BadRequest,
            "METHOD_NOT_FOUND" => FaultKind::UnknownMethod,
            FaultKind::EXITED => FaultKind::Exited,
            _ => FaultKind::Query,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    /// The data-source connection is unknown or unreachable.
    Connection,
    BadRequest,
    /// The executor does not implement the method.
    UnknownMethod,
    Exited,
    /// Anything else, typically the database rejecting the query.
    Query,
}

impl FaultKind {
    const EXITED: &'static str = "WORKER_EXITED";
}
