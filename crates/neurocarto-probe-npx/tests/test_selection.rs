// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Selection integration tests

Drives the registered selectors end to end through the public API:
- every selector yields a conflict-free map on every probe variant
- pre-selected electrodes survive selection
- seeded runs reproduce
- blueprint and channel map interchange forms
*/

use neurocarto_probe_npx::prelude::*;
use neurocarto_probe_npx::{presets, select_best_efficiency, ChannelMapSnapshot};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Blueprint with a little of every category on shank 0.
fn mixed_blueprint(probe: NpxProbeType) -> ProbeBlueprint {
    let mut bp = ProbeBlueprint::new(probe);
    bp.set_category_at(0, 0, 5, CATE_SET).unwrap();
    for r in 20..60 {
        bp.set_category_at(0, 0, r, CATE_FULL).unwrap();
        bp.set_category_at(0, 1, r, CATE_FULL).unwrap();
    }
    for r in 100..180 {
        bp.set_category_at(0, 0, r, CATE_HALF).unwrap();
        bp.set_category_at(0, 1, r, CATE_HALF).unwrap();
    }
    for r in 200..300 {
        bp.set_category_at(0, r % 2, r, CATE_QUARTER).unwrap();
    }
    for r in 300..320 {
        bp.set_category_at(0, 0, r, CATE_EXCLUDED).unwrap();
    }
    for r in 320..340 {
        bp.set_category_at(0, 1, r, CATE_LOW).unwrap();
    }
    bp
}

#[test]
fn test_every_selector_on_every_variant() {
    let registry = SelectorRegistry::with_defaults();
    for probe in NpxProbeType::ALL {
        let bp = mixed_blueprint(probe);
        for name in registry.names() {
            let chmap = registry
                .select(name, &bp, &mut StdRng::seed_from_u64(1))
                .unwrap();
            assert_eq!(chmap.probe_type(), probe);
            assert!(chmap.size() <= chmap.capacity());
            chmap.validate().unwrap();
            assert!(
                chmap.get_electrode(0, 0, 5).is_some(),
                "{name} dropped the pre-selected electrode on {probe}"
            );
        }
    }
}

#[test]
fn test_np0_unset_default_is_complete() {
    let bp = ProbeBlueprint::new(NpxProbeType::Np0);
    let registry = SelectorRegistry::with_defaults();
    let chmap = registry
        .select("default", &bp, &mut StdRng::seed_from_u64(0))
        .unwrap();
    assert_eq!(chmap.size(), 384);
    assert!(chmap.is_complete());
}

#[test]
fn test_seeded_selection_is_reproducible() {
    let registry = SelectorRegistry::with_defaults();
    let bp = mixed_blueprint(NpxProbeType::Np24);
    for name in registry.names() {
        let a = registry.select(name, &bp, &mut StdRng::seed_from_u64(77)).unwrap();
        let b = registry.select(name, &bp, &mut StdRng::seed_from_u64(77)).unwrap();
        assert_eq!(a, b, "{name} is not reproducible");
    }
}

#[test]
fn test_conflict_and_force_add() {
    let mut chmap = ChannelMap::new(NpxProbeType::Np0);
    chmap.add_electrode_index(0, 0).unwrap();
    // electrode 384 shares channel 0 with electrode 0
    let err = chmap.add_electrode_index(0, 384).unwrap_err();
    let conflict = err.into_conflict().unwrap();
    assert_eq!(conflict.channel, 0);
    assert_eq!(conflict.occupant.identity(), (0, 0, 0));

    conflict.force_add(&mut chmap).unwrap();
    assert!(chmap.get_electrode(0, 0, 0).is_none());
    assert_eq!(chmap.get_channel(0).map(|e| e.identity()), Some((0, 0, 192)));
    assert_eq!(chmap.size(), 1);
}

#[test]
fn test_blueprint_records_selection() {
    let registry = SelectorRegistry::with_defaults();
    let mut bp = mixed_blueprint(NpxProbeType::Np21);
    let chmap = registry
        .select("default", &bp, &mut StdRng::seed_from_u64(3))
        .unwrap();
    bp.apply_channelmap(&chmap).unwrap();

    let used = bp
        .electrodes()
        .iter()
        .filter(|e| e.state == neurocarto_probe_npx::blueprint::STATE_USED)
        .count();
    assert_eq!(used, chmap.size());

    let table = bp.to_array();
    let restored = ProbeBlueprint::from_array(&table).unwrap();
    assert_eq!(restored.probe_type(), NpxProbeType::Np21);
    assert_eq!(restored.electrodes(), bp.electrodes());
}

#[test]
fn test_snapshot_json_round_trip() {
    let chmap = presets::half_density(2, 40).unwrap();
    let json = serde_json::to_string(&chmap.snapshot()).unwrap();
    let snapshot: ChannelMapSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(ChannelMap::from_snapshot(&snapshot).unwrap(), chmap);
}

#[test]
fn test_best_efficiency_prefers_complete_maps() {
    let mut bp = ProbeBlueprint::new(NpxProbeType::Np24);
    for r in 0..192 {
        bp.set_category_at(1, 0, r, CATE_FULL).unwrap();
        bp.set_category_at(1, 1, r, CATE_FULL).unwrap();
    }
    let best = select_best_efficiency(&neurocarto_probe_npx::DefaultSelector, &bp, 3, 5, false)
        .unwrap()
        .expect("a complete map");
    assert!(best.chmap.is_complete());
    assert_eq!(best.efficiency.area, 1.0);
    assert_eq!(best.efficiency.efficiency(), 1.0);
}
