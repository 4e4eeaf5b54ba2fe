//! Console logging for the CLI.
//!
//! The library only emits `tracing` events; installing a subscriber is the
//! binary's job.
//!
//! ```no_run
//! vantage::logging::init("vantage=info").ok();
//! tracing::info!("started");
//! ```

use tracing_subscriber::{fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _, EnvFilter};

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("invalid log filter '{filter}': {source}")]
    InvalidFilter {
        filter: String,
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },

    #[error("a global subscriber is already installed")]
    AlreadyInitialized,
}

/// Install a stderr fmt subscriber. `RUST_LOG` overrides `default_filter`.
pub fn init(default_filter: &str) -> Result<(), LoggingError> {
    let filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(from_env) if !from_env.trim().is_empty() => parse_filter(&from_env)?,
        _ => parse_filter(default_filter)?,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .try_init()
        .map_err(|_| LoggingError::AlreadyInitialized)
}

fn parse_filter(filter: &str) -> Result<EnvFilter, LoggingError> {
    EnvFilter::try_new(filter).map_err(|source| LoggingError::InvalidFilter {
        filter: filter.to_string(),
        source,
    })
}
