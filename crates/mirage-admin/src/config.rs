// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Admin interface configuration.
//!
//! Supports both programmatic and file-based configuration. Command-line
//! flags are layered on top of the file by the binary.

use crate::state::Mode;
use mirage_store::{DEFAULT_BUCKET, DEFAULT_MAX_RECORD_BYTES};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Admin interface configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Bind address.
    pub bind: String,

    /// Admin HTTP port.
    pub port: u16,

    /// Target host of the proxied service. Fixed for the process lifetime.
    pub destination: String,

    /// Mode the proxy starts in.
    pub mode: Mode,

    /// SQLite database path.
    pub db_path: String,

    /// Keep records in memory only.
    pub in_memory: bool,

    /// Bucket holding captured requests.
    pub bucket: String,

    /// Live stats push period (milliseconds).
    pub stats_interval_ms: u64,

    /// Largest accepted encoded record (bytes).
    pub max_record_bytes: u64,

    /// Serve the REST API only, without the embedded Web UI.
    pub api_only: bool,

    /// Log level (trace, debug, info, warn, error) or an `EnvFilter` directive.
    pub log_level: String,

    /// Force debug logging.
    pub verbose: bool,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 8888,
            destination: ".".to_string(),
            mode: Mode::Virtualize,
            db_path: "requests.db".to_string(),
            in_memory: false,
            bucket: DEFAULT_BUCKET.to_string(),
            stats_interval_ms: 1000,
            max_record_bytes: DEFAULT_MAX_RECORD_BYTES,
            api_only: false,
            log_level: "info".to_string(),
            verbose: false,
        }
    }
}

impl AdminConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.destination.is_empty() {
            return Err(ConfigError::Invalid("Destination must not be empty".into()));
        }
        if self.bucket.is_empty() {
            return Err(ConfigError::Invalid("Bucket name must not be empty".into()));
        }
        if self.stats_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "Stats interval must be greater than zero".into(),
            ));
        }
        if self.max_record_bytes == 0 {
            return Err(ConfigError::Invalid(
                "Maximum record size must be greater than zero".into(),
            ));
        }
        if !self.in_memory && self.db_path.is_empty() {
            return Err(ConfigError::Invalid(
                "Database path must not be empty (or use in_memory)".into(),
            ));
        }
        Ok(())
    }

    pub fn stats_interval(&self) -> Duration {
        Duration::from_millis(self.stats_interval_ms)
    }

    /// `bind:port` listen address.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }

    /// Effective log filter directive.
    pub fn log_filter(&self) -> &str {
        if self.verbose {
            "debug"
        } else {
            &self.log_level
        }
    }
}
