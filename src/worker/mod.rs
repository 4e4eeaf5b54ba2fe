//! The executor process.
//!
//! Query execution and catalog questions (join paths, distinct values,
//! derived headers) are answered by an external executor that owns the
//! data-source connections. It runs as a long-lived child process and is
//! reached only through JSON lines on its stdin/stdout.
//!
//! ```text
//!   WorkerClient::call ──► stdin   {"id":"…","method":"report.execute","params":{…}}
//!        ▲
//!        └── reader task ◄── stdout {"id":"…","success":true,"result":{…}}
//! ```
//!
//! ```ignore
//! use vantage::worker::{protocol::methods, WorkerClient};
//!
//! let client = WorkerClient::spawn("./vantage-executor", &[], Duration::from_secs(30)).await?;
//! let answer: JoinPathResponse = client.call(methods::CHECK_JOIN_PATH, &request).await?;
//! ```

mod client;
mod error;
pub mod protocol;

pub use client::WorkerClient;
pub use error::{WorkerError, WorkerResult};
