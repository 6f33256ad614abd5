// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # NeuroCarto - Neuropixels channel-map toolkit
//!
//! Probe geometry, hardware channel addressing and electrode selection for
//! Neuropixels 1.0 and 2.0 probes.
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! neurocarto = "0.1"  # Default: parallel sampling + config/logging helpers
//! ```
//!
//! ## Feature Flags
//!
//! - **`parallel`** (default): run multi-sample selection on rayon
//! - **`tools`** (default): configuration loader and logging setup
//! - **`file-logging`**: JSON log files in timestamped run folders
//!
//! ## Usage
//!
//! ```rust
//! use neurocarto::prelude::*;
//! use rand::SeedableRng;
//!
//! let mut blueprint = ProbeBlueprint::new(NpxProbeType::Np0);
//! for row in 0..40 {
//!     blueprint.set_category_at(0, 0, row, CATE_HALF)?;
//!     blueprint.set_category_at(0, 1, row, CATE_HALF)?;
//! }
//!
//! let registry = SelectorRegistry::with_defaults();
//! let mut rng = rand::rngs::StdRng::seed_from_u64(1);
//! let chmap = registry.select("default", &blueprint, &mut rng)?;
//! assert!(chmap.is_complete());
//! # Ok::<(), neurocarto::probe_npx::NpxError>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Core: neurocarto-probe-npx                             │
//! │  (probe types, translator, channel map, selectors)      │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Infrastructure: neurocarto-config,                     │
//! │                  neurocarto-observability               │
//! │  (TOML + env + CLI settings, tracing setup)             │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Tools: npx_select                                      │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## License
//!
//! Apache-2.0

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Re-export core
pub use neurocarto_probe_npx as probe_npx;

// Re-export infrastructure
#[cfg(feature = "tools")]
pub use neurocarto_config as config;

#[cfg(feature = "tools")]
pub use neurocarto_observability as observability;

/// Prelude - commonly used types and traits
pub mod prelude {
    pub use crate::probe_npx::prelude::*;
    pub use crate::probe_npx::{
        channel_efficiency, select_best_efficiency, ChannelMapSnapshot, Efficiency,
    };

    #[cfg(feature = "tools")]
    pub use crate::config::{load_config, validate_config, NeurocartoConfig};
}
