//! Builder errors.

use thiserror::Error;

pub type BuilderResult<T> = Result<T, BuilderError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuilderError {
    #[error("no {kind} at position {index} (have {len})")]
    IndexOutOfRange {
        kind: &'static str,
        index: usize,
        len: usize,
    },

    #[error("a calculated field named '{0}' already exists")]
    DuplicateCalculatedField(String),

    #[error("no calculated field named '{0}'")]
    UnknownCalculatedField(String),

    #[error("page must be 1 or greater")]
    InvalidPage,

    #[error("page size must be between 1 and {max}, got {size}")]
    InvalidPageSize { size: u32, max: u32 },
}
