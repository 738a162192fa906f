//! Logging configuration read from the environment.
//!
//! Standard output carries the output object and nothing else, so the only
//! tunables are how much is logged to standard error and in which format.

use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

/// Environment variable holding the tracing filter expression.
pub const LOG_FILTER_ENV: &str = "INVOKE_LOG";

/// Environment variable selecting the log format.
pub const LOG_FORMAT_ENV: &str = "INVOKE_LOG_FORMAT";

/// Filter used when [`LOG_FILTER_ENV`] is unset.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Supported log output formats.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// Human-readable single line output.
    #[default]
    Compact,
    /// Structured JSON, one object per event.
    Json,
}

/// Errors encountered while reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The log format variable named an unknown format.
    #[error("unsupported log format '{value}' in INVOKE_LOG_FORMAT")]
    InvalidLogFormat {
        /// The rejected value.
        value: String,
        /// Parser diagnostic.
        #[source]
        source: strum::ParseError,
    },
}

/// Resolved logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    log_filter: String,
    log_format: LogFormat,
}

impl Config {
    /// Builds a configuration from explicit values.
    #[must_use]
    pub fn new(log_filter: impl Into<String>, log_format: LogFormat) -> Self {
        Self {
            log_filter: log_filter.into(),
            log_format,
        }
    }

    /// Reads [`LOG_FILTER_ENV`] and [`LOG_FORMAT_ENV`] from the process
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidLogFormat`] when the format variable is
    /// set to an unknown value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Resolves the configuration through `lookup`; unset or blank values
    /// fall back to the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidLogFormat`] when the format value is not
    /// recognised.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let present = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let log_filter = present(LOG_FILTER_ENV).unwrap_or_else(|| DEFAULT_LOG_FILTER.to_owned());
        let log_format = match present(LOG_FORMAT_ENV) {
            Some(value) => LogFormat::from_str(value.trim())
                .map_err(|source| ConfigError::InvalidLogFormat { value, source })?,
            None => LogFormat::default(),
        };

        Ok(Self {
            log_filter,
            log_format,
        })
    }

    /// Returns the tracing filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Returns the log format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_FILTER, LogFormat::default())
    }
}
