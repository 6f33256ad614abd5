// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! Checks that the configured probe code, selector and logging settings are
//! known before any tool acts on them. All problems are reported together.

use neurocarto_probe_npx::SelectorRegistry;

use crate::{ConfigError, ConfigResult, NeurocartoConfig};

const LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "warning", "error"];
const LOG_FORMATS: [&str; 2] = ["text", "json"];

/// Validation errors that can occur during config validation
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    UnknownProbeCode { code: String },
    UnknownSelector { name: String, known: Vec<String> },
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownProbeCode { code } => {
                write!(f, "Unknown probe code: {}", code)
            }
            Self::UnknownSelector { name, known } => {
                write!(
                    f,
                    "Unknown selector '{}' (available: {})",
                    name,
                    known.join(", ")
                )
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

/// Validate the complete configuration
///
/// Checks for:
/// - Probe code resolving to a known variant
/// - Selector name registered in the default registry
/// - At least one selection sample
/// - Known log level and format
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` with details if validation fails
pub fn validate_config(config: &NeurocartoConfig) -> ConfigResult<()> {
    let errors = collect_errors(config);
    if errors.is_empty() {
        return Ok(());
    }

    let error_messages = errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::ValidationError(format!(
        "Configuration validation failed:\n{}",
        error_messages
    )))
}

/// Every problem found in `config`, in section order.
pub fn collect_errors(config: &NeurocartoConfig) -> Vec<ConfigValidationError> {
    let mut errors = Vec::new();
    validate_probe(config, &mut errors);
    validate_selection(config, &mut errors);
    validate_logging(config, &mut errors);
    errors
}

fn validate_probe(config: &NeurocartoConfig, errors: &mut Vec<ConfigValidationError>) {
    if config.probe.probe_type().is_err() {
        errors.push(ConfigValidationError::UnknownProbeCode {
            code: config.probe.default_code.clone(),
        });
    }
}

fn validate_selection(config: &NeurocartoConfig, errors: &mut Vec<ConfigValidationError>) {
    let registry = SelectorRegistry::with_defaults();
    if !registry.contains(&config.selection.selector) {
        errors.push(ConfigValidationError::UnknownSelector {
            name: config.selection.selector.clone(),
            known: registry.names().into_iter().map(String::from).collect(),
        });
    }

    if config.selection.sample_times == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "selection.sample_times".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
}

fn validate_logging(config: &NeurocartoConfig, errors: &mut Vec<ConfigValidationError>) {
    let level = config.logging.level.to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "logging.level".to_string(),
            reason: format!("'{}' is not one of {}", config.logging.level, LOG_LEVELS.join(", ")),
        });
    }

    if !LOG_FORMATS.contains(&config.logging.format.as_str()) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "logging.format".to_string(),
            reason: format!("'{}' is not one of {}", config.logging.format, LOG_FORMATS.join(", ")),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_default_config() {
        let config = NeurocartoConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_all_problems_reported_together() {
        let mut config = NeurocartoConfig::default();
        config.probe.default_code = "NP3".to_string();
        config.selection.selector = "greedy".to_string();
        config.selection.sample_times = 0;
        config.logging.level = "LOUD".to_string();

        let errors = collect_errors(&config);
        assert_eq!(errors.len(), 4);
        assert_eq!(
            errors[0],
            ConfigValidationError::UnknownProbeCode {
                code: "NP3".to_string()
            }
        );

        let message = validate_config(&config).unwrap_err().to_string();
        assert!(message.contains("Unknown selector 'greedy' (available: default, random, weaker)"));
        assert!(message.contains("selection.sample_times"));
        assert!(message.contains("logging.level"));
    }

    #[test]
    fn test_log_level_case_insensitive() {
        let mut config = NeurocartoConfig::default();
        config.logging.level = "WARNING".to_string();
        assert!(validate_config(&config).is_ok());

        config.logging.format = "yaml".to_string();
        assert!(validate_config(&config).is_err());
    }
}
