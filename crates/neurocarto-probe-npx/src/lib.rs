// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
# NeuroCarto Neuropixels core

Geometry, hardware channel addressing and electrode selection for the
Neuropixels 1.0 (`NP0`), 2.0 single-shank (`NP21`) and 2.0 four-shank
(`NP24`) probes.

- [`probe_type`]: closed set of variants and their fixed geometry
- [`transform`]: electrode index, grid position, spatial position and
  channel/bank conversions
- [`channelmap`]: the channel-indexed electrode assignment and its
  conflict-free mutation
- [`blueprint`]: per-electrode category annotations consumed by selectors
- [`select`]: the `default`, `weaker` and `random` selectors plus sampling
  and efficiency tools
- [`presets`]: ready-made four-shank maps
- [`density`]: smoothed electrode density along each shank

## Example

```rust
use neurocarto_probe_npx::prelude::*;
use rand::SeedableRng;

let mut blueprint = ProbeBlueprint::new(NpxProbeType::Np24);
blueprint.set_category_at(0, 0, 100, CATE_SET).unwrap();

let registry = SelectorRegistry::with_defaults();
let mut rng = rand::rngs::StdRng::seed_from_u64(0);
let chmap = registry.select("default", &blueprint, &mut rng).unwrap();
assert!(chmap.get_electrode(0, 0, 100).is_some());
```
*/

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod blueprint;
pub mod channelmap;
pub mod density;
pub mod electrode;
pub mod error;
pub mod meta;
pub mod presets;
pub mod probe_type;
pub mod reference;
pub mod select;
pub mod transform;

pub use blueprint::{Blueprint, Category, ElectrodeDescription, ProbeBlueprint};
pub use channelmap::{ChannelConflict, ChannelMap, ChannelMapSnapshot};
pub use electrode::Electrode;
pub use error::{NpxError, NpxResult};
pub use meta::NpxMeta;
pub use probe_type::NpxProbeType;
pub use reference::{ReferenceInfo, ReferenceType};
pub use select::efficiency::{
    channel_efficiency, electrode_probability, request_electrode, select_best_efficiency,
    Efficiency, ProbabilityResult, SampledSelection,
};
pub use select::{DefaultSelector, ElectrodeSelector, RandomSelector, SelectorRegistry, WeakerSelector};
pub use transform::{ChannelBank, ShankColumnRow, ShankPosition};

/// Commonly used types and category codes.
pub mod prelude {
    pub use crate::blueprint::{
        Blueprint, Category, ProbeBlueprint, CATE_EXCLUDED, CATE_FULL, CATE_HALF, CATE_LOW,
        CATE_QUARTER, CATE_SET, CATE_UNSET,
    };
    pub use crate::channelmap::ChannelMap;
    pub use crate::electrode::Electrode;
    pub use crate::error::{NpxError, NpxResult};
    pub use crate::probe_type::NpxProbeType;
    pub use crate::select::{ElectrodeSelector, SelectorRegistry};
}
