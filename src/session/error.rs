//! Session-level error type.

use thiserror::Error;

use super::document::DocumentError;
use crate::binning::BinningError;
use crate::builder::BuilderError;
use crate::cache::CacheError;
use crate::drill::DrillError;
use crate::execute::{ExecuteError, GateRefusal};
use crate::service::ServiceError;

pub type ReportResult<T> = Result<T, ReportError>;

/// Everything a session operation can fail with. None of these end the
/// session; each is recoverable by further edits.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Builder(#[from] BuilderError),

    #[error(transparent)]
    Binning(#[from] BinningError),

    #[error(transparent)]
    Drill(#[from] DrillError),

    /// Execution refused locally, without calling the executor.
    #[error(transparent)]
    Gated(#[from] GateRefusal),

    /// The executor failed; `message` is its text, unmodified.
    #[error("{message}")]
    Execution { message: String },

    /// A catalog or lookup call failed.
    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error("group {0} is not binned")]
    NotBinned(usize),

    #[error("page {page} is outside 1..={total_pages}")]
    PageOutOfRange { page: u32, total_pages: u32 },

    #[error("no result page to navigate from")]
    NoResults,
}

impl From<ExecuteError> for ReportError {
    fn from(err: ExecuteError) -> Self {
        match err {
            ExecuteError::Gated(refusal) => ReportError::Gated(refusal),
            ExecuteError::Failed(message) => ReportError::Execution { message },
        }
    }
}

impl ReportError {
    /// Execution was blocked by the join resolver.
    pub fn is_join_blocked(&self) -> bool {
        matches!(self, ReportError::Gated(GateRefusal::JoinBlocked(_)))
    }
}
