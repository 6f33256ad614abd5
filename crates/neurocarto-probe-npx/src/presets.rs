// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Ready-made channel maps for the four-shank probe.

Every preset rejects a starting row past the top of the shank. Dense presets
(`single_shank`, `stripe`) also require the whole block to fit on the shank.
In sparse presets, sites that fall off the top of the probe or collide on a
channel are skipped, so those maps may come out incomplete near the shank top.
*/

use crate::channelmap::ChannelMap;
use crate::error::{NpxError, NpxResult};
use crate::probe_type::NpxProbeType;

const PROBE: NpxProbeType = NpxProbeType::Np24;

/// Convert a depth in micrometers into a row index on the four-shank probe.
pub fn row_from_um(um: f64) -> NpxResult<u32> {
    if !um.is_finite() || um < 0.0 {
        return Err(NpxError::InvalidGeometry(format!("row over range : {} um", um)));
    }
    Ok((um / PROBE.space_per_row() as f64) as u32)
}

fn check_shank(name: &str, shank: u32) -> NpxResult<()> {
    if shank < PROBE.n_shank() {
        Ok(())
    } else {
        Err(NpxError::InvalidGeometry(format!("{} over range : {}", name, shank)))
    }
}

fn check_row(row: u32) -> NpxResult<()> {
    if row < PROBE.n_row_per_shank() {
        Ok(())
    } else {
        Err(NpxError::InvalidGeometry(format!("row over range : {}", row)))
    }
}

fn check_rows(row: u32, nr: u32) -> NpxResult<()> {
    if row.checked_add(nr).map_or(false, |end| end < PROBE.n_row_per_shank()) {
        Ok(())
    } else {
        Err(NpxError::InvalidGeometry(format!("row over range : {}", row)))
    }
}

/// Add the site `offset` rows above `row`, ignoring conflicts and positions
/// off the probe.
fn add(chmap: &mut ChannelMap, shank: u32, column: u32, row: u32, offset: u32) {
    if let Some(row) = row.checked_add(offset) {
        let _ = chmap.add_electrode(shank, column, row);
    }
}

/// Both columns of `shank` from `row` upwards, one channel per site.
pub fn single_shank(shank: u32, row: u32) -> NpxResult<ChannelMap> {
    check_shank("shank", shank)?;
    let nc = PROBE.n_column_per_shank();
    let nr = PROBE.n_channel() / nc;
    check_rows(row, nr)?;

    let mut ret = ChannelMap::new(PROBE);
    for r in 0..nr {
        for c in 0..nc {
            add(&mut ret, shank, c, row, r);
        }
    }
    Ok(ret)
}

/// A full-density stripe across all four shanks starting at `row`.
pub fn stripe(row: u32) -> NpxResult<ChannelMap> {
    let ns = PROBE.n_shank();
    let nc = PROBE.n_column_per_shank();
    let nr = PROBE.n_channel() / (nc * ns);
    check_rows(row, nr)?;

    let mut ret = ChannelMap::new(PROBE);
    for s in 0..ns {
        for r in 0..nr {
            for c in 0..nc {
                add(&mut ret, s, c, row, r);
            }
        }
    }
    Ok(ret)
}

/// Checkerboard on one shank, the column phase flips halfway up.
pub fn half_density(shank: u32, row: u32) -> NpxResult<ChannelMap> {
    check_shank("shank", shank)?;
    check_row(row)?;

    let mut ret = ChannelMap::new(PROBE);
    for r in (0..192).step_by(2) {
        add(&mut ret, shank, 0, row, r);
        add(&mut ret, shank, 1, row, r + 1);
    }
    for r in (192..384).step_by(2) {
        add(&mut ret, shank, 1, row, r);
        add(&mut ret, shank, 0, row, r + 1);
    }
    Ok(ret)
}

/// Checkerboard on two shanks, opposite column phase on `s2`.
pub fn half_density_pair(s1: u32, s2: u32, row: u32) -> NpxResult<ChannelMap> {
    check_shank("shank (s1)", s1)?;
    check_shank("shank (s2)", s2)?;
    check_row(row)?;

    let mut ret = ChannelMap::new(PROBE);
    for r in (0..192).step_by(2) {
        add(&mut ret, s1, 0, row, r);
        add(&mut ret, s1, 1, row, r + 1);
    }
    for r in (0..192).step_by(2) {
        add(&mut ret, s2, 1, row, r);
        add(&mut ret, s2, 0, row, r + 1);
    }
    Ok(ret)
}

/// Every fourth site on all shanks, staggered between shanks.
pub fn quarter_density(row: u32) -> NpxResult<ChannelMap> {
    check_row(row)?;

    let mut ret = ChannelMap::new(PROBE);
    for r in (0..192).step_by(4) {
        add(&mut ret, 0, 0, row, r);
        add(&mut ret, 0, 1, row, r + 2);
        add(&mut ret, 1, 1, row, r);
        add(&mut ret, 1, 0, row, r + 2);
        add(&mut ret, 2, 0, row, r + 1);
        add(&mut ret, 2, 1, row, r + 3);
        add(&mut ret, 3, 1, row, r + 1);
        add(&mut ret, 3, 0, row, r + 3);
    }
    Ok(ret)
}

/// Quarter density along the full length of a single shank.
pub fn quarter_density_shank(shank: u32, row: u32) -> NpxResult<ChannelMap> {
    check_shank("shank", shank)?;
    check_row(row)?;

    let mut ret = ChannelMap::new(PROBE);
    for r in (0..192).step_by(4) {
        add(&mut ret, shank, 0, row, r);
        add(&mut ret, shank, 1, row, r + 2);
    }
    for r in (192..384).step_by(4) {
        add(&mut ret, shank, 1, row, r);
        add(&mut ret, shank, 0, row, r + 2);
    }
    for r in (384..576).step_by(4) {
        add(&mut ret, shank, 0, row, r + 1);
        add(&mut ret, shank, 1, row, r + 3);
    }
    for r in (576..768).step_by(4) {
        add(&mut ret, shank, 1, row, r + 1);
        add(&mut ret, shank, 0, row, r + 3);
    }
    Ok(ret)
}

/// Quarter density on two shanks, interleaved by one row.
pub fn quarter_density_pair(s1: u32, s2: u32, row: u32) -> NpxResult<ChannelMap> {
    check_shank("shank (s1)", s1)?;
    check_shank("shank (s2)", s2)?;
    check_row(row)?;

    let mut ret = ChannelMap::new(PROBE);
    for r in (0..192).step_by(4) {
        add(&mut ret, s1, 0, row, r);
        add(&mut ret, s1, 1, row, r + 2);
        add(&mut ret, s2, 1, row, r + 1);
        add(&mut ret, s2, 0, row, r + 3);
    }
    for r in (192..384).step_by(4) {
        add(&mut ret, s1, 1, row, r);
        add(&mut ret, s1, 0, row, r + 2);
        add(&mut ret, s2, 0, row, r + 1);
        add(&mut ret, s2, 1, row, r + 3);
    }
    Ok(ret)
}

/// One site in eight on all shanks.
pub fn one_eighth_density(row: u32) -> NpxResult<ChannelMap> {
    check_row(row)?;

    let mut ret = ChannelMap::new(PROBE);
    for r in (0..192).step_by(8) {
        for s in 0..4 {
            add(&mut ret, s, 0, row, r + s);
        }
        for s in 0..4 {
            add(&mut ret, s, 1, row, r + s + 5);
        }
    }
    for r in (192..384).step_by(8) {
        for s in 0..4 {
            add(&mut ret, s, 1, row, r + s);
        }
        for s in 0..4 {
            add(&mut ret, s, 0, row, r + s + 5);
        }
    }
    Ok(ret)
}
