// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Physical recording site identity plus its analog front-end settings.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// One electrode site.
///
/// Identity is `(shank, column, row)`. The front-end attributes travel with
/// the electrode when it is copied into a channel map but take no part in
/// equality, hashing or ordering.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Electrode {
    pub shank: u32,
    pub column: u32,
    pub row: u32,
    /// Channel is used for readout.
    #[serde(default)]
    pub in_used: bool,
    #[serde(default)]
    pub ap_band_gain: u32,
    #[serde(default)]
    pub lf_band_gain: u32,
    #[serde(default)]
    pub ap_hp_filter: bool,
}

impl Electrode {
    pub const fn new(shank: u32, column: u32, row: u32) -> Self {
        Self {
            shank,
            column,
            row,
            in_used: false,
            ap_band_gain: 0,
            lf_band_gain: 0,
            ap_hp_filter: false,
        }
    }

    /// Copy the front-end settings from `other`, keeping this identity.
    pub fn copy_from(&mut self, other: &Electrode) {
        self.ap_band_gain = other.ap_band_gain;
        self.lf_band_gain = other.lf_band_gain;
        self.ap_hp_filter = other.ap_hp_filter;
    }

    /// `(shank, column, row)` tuple.
    pub const fn identity(&self) -> (u32, u32, u32) {
        (self.shank, self.column, self.row)
    }

    pub const fn is_at(&self, shank: u32, column: u32, row: u32) -> bool {
        self.shank == shank && self.column == column && self.row == row
    }
}

impl PartialEq for Electrode {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for Electrode {}

impl Hash for Electrode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

impl Ord for Electrode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.shank
            .cmp(&other.shank)
            .then(self.row.cmp(&other.row))
            .then(self.column.cmp(&other.column))
    }
}

impl PartialOrd for Electrode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Electrode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Electrode[{},{},{}]", self.shank, self.column, self.row)
    }
}
