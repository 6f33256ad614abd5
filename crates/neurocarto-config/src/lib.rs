// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # neurocarto-config
//!
//! Settings for the selection tools, read from `neurocarto_configuration.toml`
//! and then overridden by `NEUROCARTO_*` environment variables and finally by
//! command-line `key=value` pairs. Every section is optional.
//!
//! ```toml
//! [probe]
//! default_code = "NP24"        # NP0, NP21, NP24 or a part number alias
//!
//! [selection]
//! selector = "weaker"          # default, weaker, random
//! seed = 42                    # omit to draw a fresh seed per run
//! sample_times = 100           # keep the most efficient complete map
//! parallel = true
//!
//! [selection.options]
//! ignore_exclude = "0"
//!
//! [logging]
//! level = "info"
//! format = "text"              # or "json"
//! ```
//!
//! ```rust,no_run
//! use neurocarto_config::{load_config, validate_config};
//!
//! let config = load_config(None, None)?;
//! validate_config(&config)?;
//! let probe = config.probe.probe_type()?;
//! println!("{} with '{}'", probe, config.selection.selector);
//! # Ok::<(), neurocarto_config::ConfigError>(())
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "neurocarto_configuration.toml";

pub mod loader;
pub mod types;
pub mod validation;

pub use loader::{apply_cli_overrides, apply_environment_overrides, find_config_file, load_config};
pub use types::*;
pub use validation::{validate_config, ConfigValidationError};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No file at the named or searched locations
    #[error("{0}")]
    FileNotFound(String),

    #[error("cannot read configuration: {0}")]
    IoError(#[from] std::io::Error),

    /// Malformed TOML or a field of the wrong type
    #[error("cannot parse configuration: {0}")]
    ParseError(String),

    /// One or more settings failed [`validate_config`]
    #[error("{0}")]
    ValidationError(String),

    #[error("bad configuration value: {0}")]
    InvalidValue(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;
