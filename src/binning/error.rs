//! Binning errors.

use thiserror::Error;

/// Result type for binning operations.
pub type BinningResult<T> = Result<T, BinningError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BinningError {
    #[error("bin count {bins} is outside the supported range 2-25")]
    BinCountOutOfRange { bins: usize },

    #[error("step width must be a positive number, got {0}")]
    InvalidStepWidth(f64),

    #[error("step width produces {count} bins (limit 1000)")]
    TooManyBins { count: usize },

    #[error("invalid custom edges: {0}")]
    InvalidEdges(String),

    #[error("invalid range: 'to' ({to}) must be greater than 'from' ({from})")]
    InvalidRange { from: f64, to: f64 },
}
