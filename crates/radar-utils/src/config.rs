//! Configuration management utilities

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while reading application configuration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A value could not be interpreted
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// Output format for log lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::InvalidValue {
                key: "RADAR_LOG_FORMAT".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application name
    pub app_name: String,
    /// Environment (dev, prod, etc.)
    pub environment: String,
    /// Log output format
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "radar".to_string(),
            environment: "development".to_string(),
            log_format: LogFormat::default(),
        }
    }
}

impl Config {
    /// Load configuration from `RADAR_ENV` and `RADAR_LOG_FORMAT`
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(environment) = std::env::var("RADAR_ENV") {
            config.environment = environment;
        }
        if let Ok(format) = std::env::var("RADAR_LOG_FORMAT") {
            config.log_format = format.parse()?;
        }

        Ok(config)
    }

    /// Whether the process runs in a production environment
    pub fn is_production(&self) -> bool {
        matches!(self.environment.as_str(), "prod" | "production")
    }
}
