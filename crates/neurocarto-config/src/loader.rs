// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! This module implements the 3-tier configuration loading system:
//! 1. TOML file (base defaults)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::{ConfigError, ConfigResult, NeurocartoConfig, CONFIG_FILE_NAME};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// CLI keys of the form `option.<name>` set a selector option.
const CLI_OPTION_PREFIX: &str = "option.";

fn parse_bool(value: &str) -> bool {
    let value = value.to_lowercase();
    value == "true" || value == "1" || value == "yes"
}

/// Find the NeuroCarto configuration file
///
/// Search order:
/// 1. `NEUROCARTO_CONFIG_PATH` environment variable
/// 2. Current working directory: `./neurocarto_configuration.toml`
/// 3. Up to 5 parent directories
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("NEUROCARTO_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by NEUROCARTO_CONFIG_PATH not found: {}",
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));
        let mut current = cwd.as_path();
        for _ in 0..5 {
            match current.parent() {
                Some(parent) => {
                    search_paths.push(parent.join(CONFIG_FILE_NAME));
                    current = parent;
                }
                None => break,
            }
        }
    }

    if let Some(path) = search_paths.iter().find(|p| p.exists()) {
        return Ok(path.clone());
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "NeuroCarto configuration file '{}' not found in any of these locations:\n{}\n\nSet NEUROCARTO_CONFIG_PATH environment variable to specify custom location.",
        CONFIG_FILE_NAME, search_list
    )))
}

/// Load configuration from TOML file
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, will search for config file.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if config file is not found or contains invalid TOML
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<NeurocartoConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: NeurocartoConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config);
    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli);
    }

    Ok(config)
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `NEUROCARTO_PROBE_CODE` -> `probe.default_code`
/// - `NEUROCARTO_SELECTOR` -> `selection.selector`
/// - `NEUROCARTO_SEED` -> `selection.seed`
/// - `NEUROCARTO_SAMPLE_TIMES` -> `selection.sample_times`
/// - `NEUROCARTO_PARALLEL` -> `selection.parallel`
/// - `NEUROCARTO_LOG_LEVEL` -> `logging.level`
///
/// Values that fail to parse are ignored.
pub fn apply_environment_overrides(config: &mut NeurocartoConfig) {
    if let Ok(value) = env::var("NEUROCARTO_PROBE_CODE") {
        config.probe.default_code = value;
    }
    if let Ok(value) = env::var("NEUROCARTO_SELECTOR") {
        config.selection.selector = value;
    }
    if let Ok(value) = env::var("NEUROCARTO_SEED") {
        if let Ok(seed) = value.parse::<u64>() {
            config.selection.seed = Some(seed);
        }
    }
    if let Ok(value) = env::var("NEUROCARTO_SAMPLE_TIMES") {
        if let Ok(n) = value.parse::<usize>() {
            config.selection.sample_times = n;
        }
    }
    if let Ok(value) = env::var("NEUROCARTO_PARALLEL") {
        config.selection.parallel = parse_bool(&value);
    }
    if let Ok(value) = env::var("NEUROCARTO_LOG_LEVEL") {
        config.logging.level = value;
    }
}

/// Apply CLI argument overrides to configuration
///
/// Recognized keys: `probe`, `selector`, `seed`, `sample_times`, `parallel`,
/// `log_level`, `log_format`, and `option.<name>` for selector options.
pub fn apply_cli_overrides(config: &mut NeurocartoConfig, cli_args: &HashMap<String, String>) {
    if let Some(value) = cli_args.get("probe") {
        config.probe.default_code = value.clone();
    }
    if let Some(value) = cli_args.get("selector") {
        config.selection.selector = value.clone();
    }
    if let Some(value) = cli_args.get("seed") {
        if let Ok(seed) = value.parse::<u64>() {
            config.selection.seed = Some(seed);
        }
    }
    if let Some(value) = cli_args.get("sample_times") {
        if let Ok(n) = value.parse::<usize>() {
            config.selection.sample_times = n;
        }
    }
    if let Some(value) = cli_args.get("parallel") {
        config.selection.parallel = parse_bool(value);
    }
    if let Some(value) = cli_args.get("log_level") {
        config.logging.level = value.clone();
    }
    if let Some(value) = cli_args.get("log_format") {
        config.logging.format = value.clone();
    }

    for (key, value) in cli_args {
        if let Some(name) = key.strip_prefix(CLI_OPTION_PREFIX) {
            config
                .selection
                .options
                .insert(name.to_string(), value.clone());
        }
    }
}
