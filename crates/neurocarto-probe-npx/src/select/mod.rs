// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Electrode selection.

A selector turns a [`Blueprint`] into a conflict-free [`ChannelMap`]. All
selectors share the same setup: pre-selected electrodes are placed first and
every electrode sharing a hardware channel with a placed one becomes
ineligible. They differ in how the remaining channels are filled:

- `default`: greedy by category tier with hard density patterns
- `weaker`: score-based, density patterns only nudge neighbor scores
- `random`: uniform pick among all eligible electrodes

Running out of eligible electrodes ends a run normally; callers compare
`size()` with `capacity()` to detect an incomplete map.

All randomness is drawn from the injected `rng`, so a seeded generator
reproduces a run exactly.
*/

mod default;
pub mod efficiency;
pub mod pattern;
mod random;
mod registry;
pub(crate) mod toolkit;
mod weaker;

pub use default::DefaultSelector;
pub use random::RandomSelector;
pub use registry::{SelectorFactory, SelectorRegistry};
pub use weaker::WeakerSelector;

use std::collections::BTreeMap;

use rand::RngCore;

use crate::blueprint::Blueprint;
use crate::channelmap::ChannelMap;
use crate::error::{NpxError, NpxResult};
use crate::probe_type::NpxProbeType;

/// An electrode selection algorithm.
pub trait ElectrodeSelector: Send + Sync {
    /// Unique registry name.
    fn name(&self) -> &str;

    fn supported_probe_types(&self) -> &[NpxProbeType] {
        &NpxProbeType::ALL
    }

    fn supports(&self, probe_type: NpxProbeType) -> bool {
        self.supported_probe_types().contains(&probe_type)
    }

    /// Current option values, keyed by option name.
    fn options(&self) -> BTreeMap<String, String> {
        BTreeMap::new()
    }

    /// Set an option. Unknown names are ignored.
    ///
    /// # Errors
    ///
    /// `InvalidOption` if `value` cannot be parsed for a known option.
    fn set_option(&mut self, _name: &str, _value: &str) -> NpxResult<()> {
        Ok(())
    }

    /// Produce a channel map for `blueprint`.
    ///
    /// # Errors
    ///
    /// `UnsupportedVariant` before any work if the blueprint's probe type is
    /// not supported.
    fn select(&self, blueprint: &dyn Blueprint, rng: &mut dyn RngCore) -> NpxResult<ChannelMap>;
}

/// Reject `probe_type` if `selector` does not declare support for it.
pub fn ensure_supported<S>(selector: &S, probe_type: NpxProbeType) -> NpxResult<()>
where
    S: ElectrodeSelector + ?Sized,
{
    if selector.supports(probe_type) {
        Ok(())
    } else {
        Err(NpxError::UnsupportedVariant {
            selector: selector.name().to_string(),
            probe: probe_type,
        })
    }
}

/// Parse a `0`/`1` style flag option.
pub(crate) fn parse_flag(name: &str, value: &str) -> NpxResult<bool> {
    value
        .trim()
        .parse::<i64>()
        .map(|v| v != 0)
        .map_err(|_| NpxError::InvalidOption {
            name: name.to_string(),
            value: value.to_string(),
        })
}

pub(crate) fn format_flag(flag: bool) -> String {
    if flag { "1" } else { "0" }.to_string()
}
