//! External collaborators of the reporting core.
//!
//! Query execution and relational catalog questions are answered by a
//! remote service. [`ReportService`] is the seam; [`WorkerReportService`]
//! implements it over the executor process.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        ReportService                            │
//! │  - execute()            - check_join_path()                     │
//! │  - auto_find_joins()    - distinct_values()                     │
//! │  - derived_headers()                                            │
//! └─────────────────────────────────────────────────────────────────┘
//!                           │
//!                           ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      WorkerClient                               │
//! │              (NDJSON over stdin/stdout)                         │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

mod types;
mod worker_service;

pub use types::{
    AutoJoinResponse, DistinctValues, DistinctValuesRequest, DistinctValuesResponse,
    ExecuteResponse, HeadersRequest, HeadersResponse, JoinPathRequest, JoinPathResponse,
    Pagination, Row,
};
pub use worker_service::WorkerReportService;

use async_trait::async_trait;
use thiserror::Error;

use crate::query::QueryModel;
use crate::worker::protocol::FaultKind;
use crate::worker::WorkerError;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// The service answered with an error; the message is user-facing.
    #[error("{0}")]
    Remote(String),

    /// The service could not be reached.
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// The answer did not have the expected shape.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl From<WorkerError> for ServiceError {
    fn from(err: WorkerError) -> Self {
        match err {
            WorkerError::Rejected { fault } => match fault.kind() {
                FaultKind::UnknownMethod => ServiceError::Unavailable(fault.message),
                _ => ServiceError::Remote(fault.message),
            },
            WorkerError::Decode { .. } => ServiceError::Malformed(err.to_string()),
            other => ServiceError::Unavailable(other.to_string()),
        }
    }
}

/// The remote execution and catalog collaborator.
#[async_trait]
pub trait ReportService: Send + Sync {
    /// Run the model. `model.user_filters` is already merged.
    async fn execute(&self, model: &QueryModel) -> ServiceResult<ExecuteResponse>;

    /// Whether the base tables can be connected through known relations.
    async fn check_join_path(&self, request: &JoinPathRequest) -> ServiceResult<JoinPathResponse>;

    /// Joins the catalog's foreign-key search proposes for the tables.
    async fn auto_find_joins(&self, request: &JoinPathRequest) -> ServiceResult<AutoJoinResponse>;

    async fn distinct_values(
        &self,
        request: &DistinctValuesRequest,
    ) -> ServiceResult<DistinctValuesResponse>;

    /// Ordered output column names of a saved report.
    async fn derived_headers(&self, request: &HeadersRequest) -> ServiceResult<HeadersResponse>;
}
