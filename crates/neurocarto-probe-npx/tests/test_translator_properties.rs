// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Property tests for the coordinate translator.

use neurocarto_probe_npx::transform::{cb2e, cr2e, cr2xy, e2cb, e2cr, e2xy};
use neurocarto_probe_npx::NpxProbeType;
use proptest::prelude::*;

fn probe_strategy() -> impl Strategy<Value = NpxProbeType> {
    prop_oneof![
        Just(NpxProbeType::Np0),
        Just(NpxProbeType::Np21),
        Just(NpxProbeType::Np24),
    ]
}

/// A probe together with a valid (shank, electrode) on it.
fn site_strategy() -> impl Strategy<Value = (NpxProbeType, u32, u32)> {
    probe_strategy().prop_flat_map(|probe| {
        (
            Just(probe),
            0..probe.n_shank(),
            0..probe.n_electrode_per_shank(),
        )
    })
}

proptest! {
    #[test]
    fn test_index_column_row_round_trip((probe, _shank, e) in site_strategy()) {
        let cr = e2cr(probe, e).unwrap();
        prop_assert!(cr.column < probe.n_column_per_shank());
        prop_assert!(cr.row < probe.n_row_per_shank());
        prop_assert_eq!(cr2e(probe, cr.column, cr.row).unwrap(), e);
    }

    #[test]
    fn test_channel_bank_round_trip((probe, shank, e) in site_strategy()) {
        let cb = e2cb(probe, shank, e).unwrap();
        prop_assert!(cb.channel < probe.n_channel());
        prop_assert!(cb.bank < probe.n_bank());
        prop_assert_eq!(cb2e(probe, shank, cb.channel, cb.bank).unwrap(), Some(e));
    }

    #[test]
    fn test_depth_monotonic_in_index((probe, shank, e) in site_strategy()) {
        prop_assume!(e + 1 < probe.n_electrode_per_shank());
        let a = e2xy(probe, shank, e).unwrap();
        let b = e2xy(probe, shank, e + 1).unwrap();
        prop_assert!(a.y <= b.y);
        prop_assert_eq!(a.shank, b.shank);
    }

    #[test]
    fn test_x_strictly_increasing_in_column((probe, shank, e) in site_strategy()) {
        let cr = e2cr(probe, e).unwrap();
        prop_assume!(cr.column + 1 < probe.n_column_per_shank());
        let a = cr2xy(probe, shank, cr.column, cr.row).unwrap();
        let b = cr2xy(probe, shank, cr.column + 1, cr.row).unwrap();
        prop_assert!(a.x < b.x);
        prop_assert_eq!(a.y, b.y);
    }

    #[test]
    fn test_y_strictly_increasing_in_row((probe, shank, e) in site_strategy()) {
        let cr = e2cr(probe, e).unwrap();
        prop_assume!(cr.row + 1 < probe.n_row_per_shank());
        let a = cr2xy(probe, shank, cr.column, cr.row).unwrap();
        let b = cr2xy(probe, shank, cr.column, cr.row + 1).unwrap();
        prop_assert!(a.y < b.y);
        prop_assert_eq!(a.x, b.x);
    }

    #[test]
    fn test_bank_monotonic_in_index((probe, shank, e) in site_strategy()) {
        prop_assume!(e + 1 < probe.n_electrode_per_shank());
        let a = e2cb(probe, shank, e).unwrap();
        let b = e2cb(probe, shank, e + 1).unwrap();
        prop_assert!(a.bank <= b.bank);
    }

    #[test]
    fn test_shank_offsets_x((probe, shank, e) in site_strategy()) {
        let cr = e2cr(probe, e).unwrap();
        let p = cr2xy(probe, shank, cr.column, cr.row).unwrap();
        prop_assert_eq!(p.x, shank * probe.space_per_shank() + cr.column * probe.space_per_column());
        prop_assert_eq!(p.y, cr.row * probe.space_per_row());
    }

    #[test]
    fn test_out_of_range_rejected(probe in probe_strategy(), extra in 0u32..1000) {
        prop_assert!(e2cr(probe, probe.n_electrode_per_shank() + extra).is_err());
        prop_assert!(e2cb(probe, probe.n_shank() + extra, 0).is_err());
        prop_assert!(cr2e(probe, probe.n_column_per_shank() + extra, 0).is_err());
        prop_assert!(cr2e(probe, 0, probe.n_row_per_shank() + extra).is_err());
    }
}

#[test]
fn test_each_bank_is_a_permutation() {
    for probe in NpxProbeType::ALL {
        for shank in 0..probe.n_shank() {
            let n = probe.n_channel();
            let mut seen = vec![0u32; n as usize];
            for e in 0..n {
                seen[e2cb(probe, shank, e).unwrap().channel as usize] += 1;
            }
            assert!(seen.iter().all(|&c| c == 1), "{probe} shank {shank}");
        }
    }
}
