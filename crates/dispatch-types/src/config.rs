//! Configuration loading for job-dispatch.
//!
//! Layered config: defaults -> config file -> env vars. The only knobs the
//! descriptor core consumes are the log level and the fallback retry
//! strategy used when a failed descriptor carries none.

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::DispatchError;
use crate::retry::{
    RetryPolicy, RetryStrategy, DEFAULT_INITIAL_BACKOFF_SECS, DEFAULT_MAXIMUM_BACKOFF_SECS,
};

/// Fallback retry configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RetrySettings {
    /// Backoff curve shape
    #[serde(default)]
    pub policy: RetryPolicy,

    /// First backoff in seconds
    #[serde(default = "default_initial_backoff")]
    pub initial_backoff_secs: u32,

    /// Backoff ceiling in seconds
    #[serde(default = "default_maximum_backoff")]
    pub maximum_backoff_secs: u32,
}

fn default_initial_backoff() -> u32 {
    DEFAULT_INITIAL_BACKOFF_SECS
}

fn default_maximum_backoff() -> u32 {
    DEFAULT_MAXIMUM_BACKOFF_SECS
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            policy: RetryPolicy::default(),
            initial_backoff_secs: default_initial_backoff(),
            maximum_backoff_secs: default_maximum_backoff(),
        }
    }
}

impl RetrySettings {
    /// Validate into a [`RetryStrategy`].
    pub fn to_strategy(&self) -> Result<RetryStrategy, DispatchError> {
        RetryStrategy::new(
            self.policy,
            self.initial_backoff_secs,
            self.maximum_backoff_secs,
        )
    }
}

/// Main dispatch settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchSettings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Retry strategy applied to failed jobs that carry none
    #[serde(default)]
    pub retry: RetrySettings,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            retry: RetrySettings::default(),
        }
    }
}

impl DispatchSettings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. `config` file in the platform config dir (e.g. ~/.config/job-dispatch/),
    ///    any extension the `config` crate understands (.toml, .yaml, .json, ...)
    /// 3. Caller-specified config file (optional)
    /// 4. Environment variables (JOBDISPATCH_*)
    pub fn load(config_path: Option<&str>) -> Result<Self, DispatchError> {
        let config_dir = ProjectDirs::from("", "", "job-dispatch")
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            .set_default("log_level", default_log_level())
            .map_err(|e| DispatchError::Config(e.to_string()))?
            .set_default("retry.policy", "exponential")
            .map_err(|e| DispatchError::Config(e.to_string()))?
            .set_default("retry.initial_backoff_secs", default_initial_backoff() as i64)
            .map_err(|e| DispatchError::Config(e.to_string()))?
            .set_default("retry.maximum_backoff_secs", default_maximum_backoff() as i64)
            .map_err(|e| DispatchError::Config(e.to_string()))?
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // Format: JOBDISPATCH_LOG_LEVEL, JOBDISPATCH_RETRY__POLICY, etc.
        builder = builder.add_source(
            Environment::with_prefix("JOBDISPATCH")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| DispatchError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| DispatchError::Config(e.to_string()))
    }
}
