#![deny(unsafe_code)]

//! Configuration loading and validation for smsport.
//!
//! Loads an optional TOML configuration file and validates it. The
//! [`AppConfig`] type is the central configuration structure; the core
//! converter reads its `[output]` section to decide how timestamps are
//! rendered, and the CLI reads it to choose output paths and log levels.

use std::path::Path;

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

/// Top-level application configuration.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Output document and file naming configuration.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g. "info", "debug", "trace").
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Which clock human-readable timestamps are rendered in.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timezone {
    /// Coordinated Universal Time.
    #[default]
    Utc,
    /// The host's local timezone.
    Local,
}

/// Output configuration.
///
/// ## TOML Example
///
/// ```toml
/// [output]
/// dir = "backups"
/// android_file_prefix = "sms"
/// wp_file_prefix = "wp"
/// readable_date_format = "%Y-%m-%d %H:%M:%S"
/// timezone = "local"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory converted files are written to when no explicit path is given.
    #[serde(default = "default_output_dir")]
    pub dir: String,

    /// File name prefix for Android documents (`<prefix>-<yyyyMMddHHmmss>.xml`).
    #[serde(default = "default_android_file_prefix")]
    pub android_file_prefix: String,

    /// File name prefix for WP documents (`<prefix>-<yyyyMMddHHmmss>.msg`).
    #[serde(default = "default_wp_file_prefix")]
    pub wp_file_prefix: String,

    /// chrono `strftime` pattern for the `readable_date` attribute.
    #[serde(default = "default_readable_date_format")]
    pub readable_date_format: String,

    /// Clock used for `readable_date`, the `m_id` stamp, and file names.
    #[serde(default)]
    pub timezone: Timezone,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            android_file_prefix: default_android_file_prefix(),
            wp_file_prefix: default_wp_file_prefix(),
            readable_date_format: default_readable_date_format(),
            timezone: Timezone::default(),
        }
    }
}

fn default_output_dir() -> String {
    ".".to_string()
}

fn default_android_file_prefix() -> String {
    "sms".to_string()
}

fn default_wp_file_prefix() -> String {
    "wp".to_string()
}

/// Matches the US general date/time rendering, e.g. `7/29/2017 6:49:28 PM`.
pub fn default_readable_date_format() -> String {
    "%-m/%-d/%Y %-I:%M:%S %p".to_string()
}

impl AppConfig {
    /// Load configuration from a TOML file at the given path using async I/O.
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = tokio::fs::read_to_string(path).await?;
        let config = Self::parse(&content)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::Validation(format!(
                "logging.level must be one of {:?}, got {:?}",
                valid_levels, self.logging.level
            )));
        }

        if self.output.dir.is_empty() {
            return Err(ConfigError::Validation(
                "output.dir must not be empty".to_string(),
            ));
        }
        for (key, prefix) in [
            ("android_file_prefix", &self.output.android_file_prefix),
            ("wp_file_prefix", &self.output.wp_file_prefix),
        ] {
            if prefix.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "output.{key} must not be empty"
                )));
            }
            if prefix.contains(['/', '\\']) {
                return Err(ConfigError::Validation(format!(
                    "output.{key} must not contain path separators, got {prefix:?}"
                )));
            }
        }

        let format = &self.output.readable_date_format;
        if format.is_empty() {
            return Err(ConfigError::Validation(
                "output.readable_date_format must not be empty".to_string(),
            ));
        }
        if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
            return Err(ConfigError::Validation(format!(
                "output.readable_date_format is not a valid strftime pattern: {format:?}"
            )));
        }

        Ok(())
    }
}
