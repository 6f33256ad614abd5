// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # neurocarto-observability
//!
//! Logging setup shared by NeuroCarto tools, with per-crate debug flag
//! support.
//!
//! ## Features
//! - `file-logging`: JSON log files in timestamped run folders (desktop only)

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod config;
pub mod init;

// Re-export commonly used items
pub use cli::*;
pub use config::*;
pub use init::*;

/// Known NeuroCarto crate names for debug flags
pub const KNOWN_CRATES: &[&str] = &[
    "neurocarto",
    "neurocarto-probe-npx",
    "neurocarto-config",
    "neurocarto-observability",
];
