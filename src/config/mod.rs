//! Configuration module for Vantage.
//!
//! Handles the `vantage.toml` file, environment variable expansion and the
//! settings a report session runs with.

mod settings;

pub use settings::{
    expand_env_vars, CacheSettings, ExecutorSettings, InputSettings, LoggingSettings,
    PagingSettings, PreviewSettings, SessionSettings, Settings, SettingsError,
};
