// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! This module defines all configuration structs that map to sections in
//! `neurocarto_configuration.toml`.

use std::collections::BTreeMap;

use neurocarto_probe_npx::NpxProbeType;
use serde::{Deserialize, Serialize};

use crate::{ConfigError, ConfigResult};

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct NeurocartoConfig {
    pub probe: ProbeConfig,
    pub selection: SelectionConfig,
    pub logging: LoggingConfig,
}

/// Probe defaults
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Probe code or alias, e.g. `NP24` or `PRB2_4_2_0640_0`
    pub default_code: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            default_code: "NP24".to_string(),
        }
    }
}

impl ProbeConfig {
    /// Resolve `default_code` to a probe variant.
    pub fn probe_type(&self) -> ConfigResult<NpxProbeType> {
        self.default_code
            .parse()
            .map_err(|e| ConfigError::InvalidValue(format!("probe.default_code: {}", e)))
    }
}

/// Electrode selection settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Registered selector name
    pub selector: String,
    /// Base random seed; `None` draws one from the OS
    pub seed: Option<u64>,
    /// Number of runs; the most efficient complete map wins when > 1
    pub sample_times: usize,
    /// Run samples in parallel
    pub parallel: bool,
    /// Selector options, passed through `set_option`
    pub options: BTreeMap<String, String>,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            selector: "default".to_string(),
            seed: None,
            sample_times: 1,
            parallel: true,
            options: BTreeMap::new(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// trace, debug, info, warn or error
    pub level: String,
    /// `text` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}
