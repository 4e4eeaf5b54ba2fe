//! TOML-based configuration for Vantage.
//!
//! Supports a config file (vantage.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! [executor]
//! path = "${VANTAGE_HOME}/bin/vantage-executor"
//! args = ["--log-level", "warn"]
//! timeout_secs = 60
//!
//! [paging]
//! default_page_size = 100
//! max_page_size = 5000
//!
//! [preview]
//! sample_size = 500
//! default_bins = 8
//!
//! [input]
//! debounce_ms = 250
//!
//! [cache]
//! enabled = true
//! path = "~/.cache/vantage/lookup.db"
//!
//! [logging]
//! filter = "vantage=debug"
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::binning::{DEFAULT_BINS, MAX_BINS, MIN_BINS};
use crate::builder::MAX_PAGE_SIZE;
use crate::query::DEFAULT_PAGE_SIZE;

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// External executor worker.
    pub executor: ExecutorSettings,

    /// Result paging.
    pub paging: PagingSettings,

    /// Local histogram preview.
    pub preview: PreviewSettings,

    /// Text input handling.
    pub input: InputSettings,

    /// Lookup cache for derived headers and distinct values.
    pub cache: CacheSettings,

    /// Log filter used by the CLI.
    pub logging: LoggingSettings,
}

/// Executor worker configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExecutorSettings {
    /// Path to the executor binary (supports ${ENV_VAR} expansion).
    pub path: Option<String>,

    /// Extra command-line arguments passed to the executor.
    pub args: Vec<String>,

    /// Per-request timeout.
    pub timeout_secs: u64,
}

impl Default for ExecutorSettings {
    fn default() -> Self {
        Self {
            path: None,
            args: Vec::new(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PagingSettings {
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl Default for PagingSettings {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PreviewSettings {
    /// Maximum number of sample values fed to the preview.
    pub sample_size: usize,

    /// Bin count used when a group is switched to `bin`.
    pub default_bins: usize,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            sample_size: 1000,
            default_bins: DEFAULT_BINS,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InputSettings {
    /// Quiet period before a text edit triggers a rebuild.
    pub debounce_ms: u64,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self { debounce_ms: 200 }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheSettings {
    pub enabled: bool,

    /// Database file. Defaults to `<cache_dir>/vantage/lookup.db`.
    pub path: Option<String>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            path: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `tracing-subscriber` env-filter directive.
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "vantage=info".to_string(),
        }
    }
}

/// The subset of settings a report session runs with.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    pub default_page_size: u32,
    pub max_page_size: u32,
    pub debounce: Duration,
    pub preview_sample_size: usize,
    pub default_bins: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Settings::default().session_settings()
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `VANTAGE_CONFIG`
    /// 2. `./vantage.toml`
    /// 3. `~/.config/vantage/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("VANTAGE_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("vantage.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("vantage").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    fn validate(&self) -> Result<(), SettingsError> {
        let paging = &self.paging;
        if paging.max_page_size == 0 || paging.max_page_size > MAX_PAGE_SIZE {
            return Err(SettingsError::InvalidConfig(format!(
                "paging.max_page_size must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }
        if paging.default_page_size == 0 || paging.default_page_size > paging.max_page_size {
            return Err(SettingsError::InvalidConfig(format!(
                "paging.default_page_size must be between 1 and {}",
                paging.max_page_size
            )));
        }
        if !(MIN_BINS..=MAX_BINS).contains(&self.preview.default_bins) {
            return Err(SettingsError::InvalidConfig(format!(
                "preview.default_bins must be between {MIN_BINS} and {MAX_BINS}"
            )));
        }
        if self.preview.sample_size == 0 {
            return Err(SettingsError::InvalidConfig(
                "preview.sample_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Executor binary path with environment variables expanded.
    pub fn executor_path(&self) -> Result<Option<PathBuf>, SettingsError> {
        self.executor
            .path
            .as_deref()
            .map(|p| expand_env_vars(p).map(PathBuf::from))
            .transpose()
    }

    /// Cache database path, falling back to the user cache directory.
    pub fn cache_path(&self) -> Result<Option<PathBuf>, SettingsError> {
        if let Some(path) = &self.cache.path {
            return expand_env_vars(path).map(|p| Some(PathBuf::from(p)));
        }
        Ok(dirs::cache_dir().map(|dir| dir.join("vantage").join("lookup.db")))
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            default_page_size: self.paging.default_page_size,
            max_page_size: self.paging.max_page_size,
            debounce: Duration::from_millis(self.input.debounce_ms),
            preview_sample_size: self.preview.sample_size,
            default_bins: self.preview.default_bins,
        }
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let var_name: String = if chars.next_if_eq(&'{').is_some() {
            let name = chars.by_ref().take_while(|&ch| ch != '}').collect();
            name
        } else {
            let mut name = String::new();
            while let Some(ch) = chars.next_if(|ch| ch.is_alphanumeric() || *ch == '_') {
                name.push(ch);
            }
            if name.is_empty() {
                // A lone $ is kept
                result.push('$');
                continue;
            }
            name
        };

        let value = env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name))?;
        result.push_str(&value);
    }

    Ok(result)
}
