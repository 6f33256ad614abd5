// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Probe variant descriptors.

Each supported Neuropixels variant is a closed enum value carrying its fixed
geometry: shank count, electrode grid per shank, amplifier channel count and
the micrometer spacing used to place electrodes in space.

References:
- open-ephys-plugins `neuropixels-pxi/Source/Probes/Geometry.cpp`
- SpikeGLX `SGLXMetaToCoords.py`
*/

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{NpxError, NpxResult};

/// Supported Neuropixels probe variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NpxProbeType {
    /// Neuropixels 1.0, single shank.
    #[serde(rename = "NP0")]
    Np0,
    /// Neuropixels 2.0, single shank.
    #[serde(rename = "NP21")]
    Np21,
    /// Neuropixels 2.0, four shanks.
    #[serde(rename = "NP24")]
    Np24,
}

impl NpxProbeType {
    /// All variants, in code order.
    pub const ALL: [NpxProbeType; 3] = [NpxProbeType::Np0, NpxProbeType::Np21, NpxProbeType::Np24];

    /// Look up a variant by its numeric code (0, 21 or 24).
    pub fn from_code(code: i32) -> NpxResult<Self> {
        match code {
            0 => Ok(NpxProbeType::Np0),
            21 => Ok(NpxProbeType::Np21),
            24 => Ok(NpxProbeType::Np24),
            _ => Err(NpxError::UnknownProbeCode(code.to_string())),
        }
    }

    /// Numeric code as written in channel-map files.
    pub const fn code(self) -> i32 {
        match self {
            NpxProbeType::Np0 => 0,
            NpxProbeType::Np21 => 21,
            NpxProbeType::Np24 => 24,
        }
    }

    /// Canonical short name (`NP0`, `NP21`, `NP24`).
    pub const fn name(self) -> &'static str {
        match self {
            NpxProbeType::Np0 => "NP0",
            NpxProbeType::Np21 => "NP21",
            NpxProbeType::Np24 => "NP24",
        }
    }

    /// Human-readable description.
    pub const fn description(self) -> &'static str {
        match self {
            NpxProbeType::Np0 => "Neuropixels probe",
            NpxProbeType::Np21 => "Neuropixels probe 2.0",
            NpxProbeType::Np24 => "4-Shank Neuropixels probe 2.0",
        }
    }

    pub const fn n_shank(self) -> u32 {
        match self {
            NpxProbeType::Np0 | NpxProbeType::Np21 => 1,
            NpxProbeType::Np24 => 4,
        }
    }

    pub const fn n_column_per_shank(self) -> u32 {
        2
    }

    pub const fn n_row_per_shank(self) -> u32 {
        match self {
            NpxProbeType::Np0 => 480,
            NpxProbeType::Np21 | NpxProbeType::Np24 => 640,
        }
    }

    /// Electrodes per shank, always `n_column_per_shank * n_row_per_shank`.
    pub const fn n_electrode_per_shank(self) -> u32 {
        self.n_column_per_shank() * self.n_row_per_shank()
    }

    /// Electrodes over all shanks.
    pub const fn n_electrode(self) -> u32 {
        self.n_shank() * self.n_electrode_per_shank()
    }

    /// Number of amplifier channels.
    pub const fn n_channel(self) -> u32 {
        384
    }

    pub const fn n_electrode_per_block(self) -> u32 {
        match self {
            NpxProbeType::Np0 => 32,
            NpxProbeType::Np21 | NpxProbeType::Np24 => 48,
        }
    }

    /// Column spacing in um.
    pub const fn space_per_column(self) -> u32 {
        32
    }

    /// Row spacing in um.
    pub const fn space_per_row(self) -> u32 {
        match self {
            NpxProbeType::Np0 => 20,
            NpxProbeType::Np21 | NpxProbeType::Np24 => 15,
        }
    }

    /// Shank spacing in um.
    pub const fn space_per_shank(self) -> u32 {
        match self {
            NpxProbeType::Np0 | NpxProbeType::Np21 => 0,
            NpxProbeType::Np24 => 250,
        }
    }

    /// Electrode indices usable as on-shank references.
    pub const fn reference(self) -> &'static [u32] {
        match self {
            NpxProbeType::Np0 => &[192, 576, 960],
            NpxProbeType::Np21 => &[127, 507, 887, 1251],
            NpxProbeType::Np24 => &[127, 511, 895, 1279],
        }
    }

    /// Number of banks sharing one channel, rounded up.
    pub const fn n_bank(self) -> u32 {
        self.n_electrode_per_shank().div_ceil(self.n_channel())
    }

    pub const fn n_block(self) -> u32 {
        self.n_electrode_per_shank() / self.n_electrode_per_block()
    }

    pub const fn n_block_per_bank(self) -> u32 {
        self.n_channel() / self.n_electrode_per_block()
    }
}

impl fmt::Display for NpxProbeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NpxProbeType {
    type Err = NpxError;

    /// Accepts the numeric code, the canonical name and the part-number
    /// aliases found in SpikeGLX meta files.
    fn from_str(code: &str) -> Result<Self, Self::Err> {
        match code {
            "0" | "NP0" => Ok(NpxProbeType::Np0),
            "21" | "NP21" | "NP2_1" | "PRB2_1_2_0640_0" | "PRB2_1_4_0480_1" | "NP2000"
            | "NP2003" | "NP2004" => Ok(NpxProbeType::Np21),
            "24" | "NP24" | "NP2_4" | "PRB2_4_2_0640_0" | "NP2010" | "NP2013" | "NP2014" => {
                Ok(NpxProbeType::Np24)
            }
            _ => Err(NpxError::UnknownProbeCode(code.to_string())),
        }
    }
}
