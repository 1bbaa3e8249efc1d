//! Application configuration.
//!
//! Loaded from YAML files and `TOPIC_NOTIFY__*` environment variables.

use std::time::Duration;

use serde::Deserialize;

use crate::sink::DEFAULT_ADDRESS_PREFIX;
use crate::source::DEFAULT_DELIVERY_TIMEOUT;
use crate::utils::retry::RetryConfig;

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "topic-notify.yaml";
/// Environment variable for configuration file path.
pub const CONFIG_ENV_VAR: &str = "TOPIC_NOTIFY_CONFIG";
/// Prefix for configuration environment variables.
pub const CONFIG_ENV_PREFIX: &str = "TOPIC_NOTIFY";
/// Environment variable for logging configuration.
pub const LOG_ENV_VAR: &str = "TOPIC_NOTIFY_LOG";

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory addressing.
    pub directory: DirectoryConfig,
    /// Retry policy for register/unsubscribe.
    pub retry: RetryConfig,
    /// Source fan-out settings.
    pub source: SourceConfig,
}

/// Directory addressing shared by publishers and subscribers.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    /// Prepended to a topic code to form its address.
    pub prefix: String,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_ADDRESS_PREFIX.to_string(),
        }
    }
}

/// Source fan-out settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Bound on one push to one sink, in milliseconds.
    pub delivery_timeout_ms: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            delivery_timeout_ms: DEFAULT_DELIVERY_TIMEOUT.as_millis() as u64,
        }
    }
}

impl SourceConfig {
    pub fn delivery_timeout(&self) -> Duration {
        Duration::from_millis(self.delivery_timeout_ms)
    }
}

impl Config {
    /// Load configuration from file and environment.
    ///
    /// Configuration sources (in order of priority, later overrides earlier):
    /// 1. `topic-notify.yaml` in current directory (if exists)
    /// 2. File specified by `path` argument (if provided)
    /// 3. File specified by `CONFIG_ENV_VAR` environment variable (if set)
    /// 4. Environment variables with `CONFIG_ENV_PREFIX` prefix
    pub fn load(path: Option<&str>) -> Result<Self, Box<dyn std::error::Error>> {
        use ::config::{Config as ConfigLib, Environment, File, FileFormat};

        let mut builder = ConfigLib::builder()
            .add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml).required(false));

        if let Some(config_path) = path {
            builder = builder.add_source(File::new(config_path, FileFormat::Yaml).required(true));
        }

        if let Ok(config_path) = std::env::var(CONFIG_ENV_VAR) {
            builder = builder.add_source(File::new(&config_path, FileFormat::Yaml).required(true));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = config.try_deserialize()?;
        Ok(config)
    }

    /// Create config for testing.
    pub fn for_test() -> Self {
        Self {
            retry: RetryConfig::immediate(crate::utils::retry::DEFAULT_MAX_RETRIES),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests;
