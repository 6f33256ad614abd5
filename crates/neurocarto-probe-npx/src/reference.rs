// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Reference-scheme decoding.
//!
//! A channel map carries a single scalar selecting the recording reference.
//! Value `0` is the external reference, `1..=n_shank` the tip of each shank,
//! and the remaining values enumerate the on-shank reference electrodes
//! shank-major.

use serde::{Deserialize, Serialize};

use crate::error::{NpxError, NpxResult};
use crate::probe_type::NpxProbeType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReferenceType {
    External,
    Tip,
    OnShank,
}

/// Decoded reference value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReferenceInfo {
    pub code: u32,
    pub kind: ReferenceType,
    pub shank: u32,
    /// Reference electrode index; zero unless `kind` is `OnShank`.
    pub channel: u32,
}

/// Exclusive upper bound of valid reference values for `probe`.
pub const fn max_reference_value(probe: NpxProbeType) -> u32 {
    let ns = probe.n_shank();
    1 + ns + ns * probe.reference().len() as u32
}

impl ReferenceInfo {
    pub fn of(probe: NpxProbeType, reference: u32) -> NpxResult<Self> {
        let max = max_reference_value(probe);
        if reference >= max {
            return Err(NpxError::InvalidReference { reference, max });
        }

        let ns = probe.n_shank();
        if reference == 0 {
            return Ok(ReferenceInfo {
                code: 0,
                kind: ReferenceType::External,
                shank: 0,
                channel: 0,
            });
        }
        if reference < ns + 1 {
            return Ok(ReferenceInfo {
                code: reference,
                kind: ReferenceType::Tip,
                shank: reference - 1,
                channel: 0,
            });
        }

        let refs = probe.reference();
        let r = reference - ns - 1;
        let len = refs.len() as u32;
        Ok(ReferenceInfo {
            code: reference,
            kind: ReferenceType::OnShank,
            shank: r / len,
            channel: refs[(r % len) as usize],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_reference_value() {
        assert_eq!(max_reference_value(NpxProbeType::Np0), 5);
        assert_eq!(max_reference_value(NpxProbeType::Np21), 6);
        assert_eq!(max_reference_value(NpxProbeType::Np24), 21);
    }

    #[test]
    fn test_decode_each_kind() {
        let ext = ReferenceInfo::of(NpxProbeType::Np24, 0).unwrap();
        assert_eq!(ext.kind, ReferenceType::External);

        let tip = ReferenceInfo::of(NpxProbeType::Np24, 3).unwrap();
        assert_eq!((tip.kind, tip.shank), (ReferenceType::Tip, 2));

        // 4 shanks, 4 references per shank: 5 + 4*2 + 1 is shank 2, second reference
        let on = ReferenceInfo::of(NpxProbeType::Np24, 14).unwrap();
        assert_eq!(on.kind, ReferenceType::OnShank);
        assert_eq!((on.shank, on.channel), (2, 511));

        let on = ReferenceInfo::of(NpxProbeType::Np0, 4).unwrap();
        assert_eq!((on.shank, on.channel), (0, 960));
    }

    #[test]
    fn test_out_of_range() {
        assert!(matches!(
            ReferenceInfo::of(NpxProbeType::Np21, 6),
            Err(NpxError::InvalidReference { reference: 6, max: 6 })
        ));
    }
}
