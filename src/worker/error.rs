//! Executor transport errors.

use std::io;
use std::time::Duration;

use thiserror::Error;

use super::protocol::{Fault, FaultKind};

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("no executor configured; set executor.path in vantage.toml")]
    NotConfigured,

    #[error("failed to start executor: {0}")]
    Spawn(#[source] io::Error),

    /// The child was started without a piped stream.
    #[error("executor {0} is not piped")]
    MissingPipe(&'static str),

    #[error("failed to write to executor: {0}")]
    Write(#[source] io::Error),

    #[error("failed to encode {method} request: {source}")]
    Encode {
        method: String,
        #[source]
        source: serde_json::Error,
    },

    /// The reply arrived but its result had the wrong shape.
    #[error("unexpected {method} result: {source}")]
    Decode {
        method: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{method} timed out after {}s", .after.as_secs())]
    TimedOut { method: String, after: Duration },

    #[error("executor exited")]
    Exited,

    /// The executor answered with a fault; the message is its text, as-is.
    #[error("{}", .fault.message)]
    Rejected { fault: Fault },
}

impl From<Fault> for WorkerError {
    fn from(fault: Fault) -> Self {
        match fault.kind() {
            FaultKind::Exited => WorkerError::Exited,
            _ => WorkerError::Rejected { fault },
        }
    }
}

impl WorkerError {
    /// The executor process is gone; further calls will fail the same way.
    pub fn is_fatal(&self) -> bool {
        matches!(self, WorkerError::Exited | WorkerError::Write(_))
    }
}
