// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Logging configuration types

use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log level (trace, debug, info, warn, error)
    pub level: String,

    /// Console format
    pub format: LogFormat,

    /// Per-run log files; ignored without the `file-logging` feature
    pub file: Option<FileLoggingConfig>,
}

/// Log format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format: {}", other)),
        }
    }
}

/// File logging with retention
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileLoggingConfig {
    /// Base directory; each run gets a `run_YYYYMMDD_HHMMSS` folder
    pub log_dir: PathBuf,
    /// Keep logs for N days
    pub retention_days: u64,
    /// Keep N most recent runs
    pub retention_runs: usize,
}

impl LoggingConfig {
    /// Build from the `level` / `format` strings of a configuration file.
    pub fn from_settings(level: &str, format: &str) -> Result<Self, String> {
        Ok(LoggingConfig {
            level: normalize_level(level),
            format: format.parse()?,
            file: None,
        })
    }

    pub fn with_file(mut self, file: FileLoggingConfig) -> Self {
        self.file = Some(file);
        self
    }
}

/// Lower-case a level name and map `warning` to `warn`.
pub fn normalize_level(level: &str) -> String {
    match level.to_lowercase().as_str() {
        "warning" => "warn".to_string(),
        other => other.to_string(),
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
            format: LogFormat::Text,
            file: None,
        }
    }
}

impl Default for FileLoggingConfig {
    fn default() -> Self {
        FileLoggingConfig {
            log_dir: PathBuf::from("./logs"),
            retention_days: 30,
            retention_runs: 10,
        }
    }
}
