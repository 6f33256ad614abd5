// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Blueprint: the per-electrode annotation consumed by the selectors.

A blueprint lists every candidate electrode of a probe together with its
position, its hardware channel, a user-assigned [`Category`] code and a
state. Selectors only read a blueprint; they never mutate it.

[`ProbeBlueprint`] is the in-memory implementation, including the 5xN table
form used to persist annotations between sessions.
*/

pub mod category;
mod probe_blueprint;

pub use category::*;
pub use probe_blueprint::{all_electrodes, ProbeBlueprint, BLUEPRINT_ROWS};

use serde::{Deserialize, Serialize};

use crate::electrode::Electrode;
use crate::probe_type::NpxProbeType;

/// One candidate electrode as seen by a selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectrodeDescription {
    pub electrode: Electrode,
    /// X position in um.
    pub x: u32,
    /// Y position in um.
    pub y: u32,
    pub channel: u32,
    pub state: i32,
    pub category: i32,
}

impl ElectrodeDescription {
    pub fn shank(&self) -> u32 {
        self.electrode.shank
    }
}

/// Read/write access to a probe's electrode annotations.
///
/// `index` arguments are positions in [`Blueprint::electrodes`].
pub trait Blueprint: Send + Sync {
    fn probe_type(&self) -> NpxProbeType;

    fn electrodes(&self) -> &[ElectrodeDescription];

    fn len(&self) -> usize {
        self.electrodes().len()
    }

    fn is_empty(&self) -> bool {
        self.electrodes().is_empty()
    }

    fn category(&self, index: usize) -> i32 {
        self.electrodes()[index].category
    }

    fn set_category(&mut self, index: usize, category: i32);

    fn state(&self, index: usize) -> i32 {
        self.electrodes()[index].state
    }

    fn set_state(&mut self, index: usize, state: i32);

    /// Resolve a spatial position to an electrode index.
    ///
    /// Coordinates are signed so that neighbor offsets falling off the probe
    /// resolve to `None` instead of wrapping.
    fn index_of(&self, shank: u32, x: i64, y: i64) -> Option<usize>;

    /// Indices of every electrode wired to the same channel as `index`,
    /// `index` itself included.
    fn invalid_electrodes(&self, index: usize) -> Vec<usize> {
        let channel = self.electrodes()[index].channel;
        self.electrodes()
            .iter()
            .enumerate()
            .filter(|(_, e)| e.channel == channel)
            .map(|(i, _)| i)
            .collect()
    }

    /// Number of electrodes carrying `category`.
    fn count_category(&self, category: i32) -> usize {
        self.electrodes()
            .iter()
            .filter(|e| e.category == category)
            .count()
    }
}
