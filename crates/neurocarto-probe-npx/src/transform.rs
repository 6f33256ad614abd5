// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Coordinate translation between the four electrode address spaces:

- electrode index (shank-local, `column + n_column * row`)
- grid position `(shank, column, row)`
- spatial position `(shank, x, y)` in um
- hardware address `(channel, bank)`

The hardware address depends on how each variant's analog multiplexer wires
electrode sites to amplifier channels. The wiring tables below are fixed by
the probe ASICs and must not be altered.
*/

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::electrode::Electrode;
use crate::error::{NpxError, NpxResult};
use crate::probe_type::NpxProbeType;

/// NP21 per-bank row factor (`[0]`) and column offset (`[1]`).
pub const ELECTRODE_MAP_21: [[u32; 4]; 2] = [
    [1, 7, 5, 3],
    [0, 4, 8, 12],
];

/// NP24 per-shank block permutation, indexed `[shank][block]`.
pub const ELECTRODE_MAP_24: [[u32; 8]; 4] = [
    [0, 2, 4, 6, 5, 7, 1, 3],
    [1, 3, 5, 7, 4, 6, 0, 2],
    [4, 6, 0, 2, 1, 3, 5, 7],
    [5, 7, 1, 3, 0, 2, 4, 6],
];

/// NP21 interleave block size.
const NP21_BLOCK: u32 = 32;
/// NP24 permutation block size.
const NP24_BLOCK: u32 = 48;

/// Grid position of an electrode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShankColumnRow {
    pub shank: u32,
    pub column: u32,
    pub row: u32,
}

/// Spatial position of an electrode in um.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShankPosition {
    pub shank: u32,
    pub x: u32,
    pub y: u32,
}

/// Hardware address of an electrode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelBank {
    pub channel: u32,
    pub bank: u32,
}

fn check_shank(probe: NpxProbeType, shank: u32) -> NpxResult<()> {
    if shank >= probe.n_shank() {
        return Err(NpxError::InvalidGeometry(format!(
            "shank value out of range: {} (probe {} has {} shanks)",
            shank,
            probe,
            probe.n_shank()
        )));
    }
    Ok(())
}

fn check_electrode(probe: NpxProbeType, electrode: u32) -> NpxResult<()> {
    if electrode >= probe.n_electrode_per_shank() {
        return Err(NpxError::InvalidGeometry(format!(
            "electrode index out of range: {} (probe {} has {} electrodes per shank)",
            electrode,
            probe,
            probe.n_electrode_per_shank()
        )));
    }
    Ok(())
}

pub(crate) fn check_column_row(probe: NpxProbeType, column: u32, row: u32) -> NpxResult<()> {
    if column >= probe.n_column_per_shank() {
        return Err(NpxError::InvalidGeometry(format!(
            "column value out of range: {}",
            column
        )));
    }
    if row >= probe.n_row_per_shank() {
        return Err(NpxError::InvalidGeometry(format!("row value out of range: {}", row)));
    }
    Ok(())
}

/// Validate a full `(shank, column, row)` triple against `probe`.
pub fn check_position(probe: NpxProbeType, shank: u32, column: u32, row: u32) -> NpxResult<()> {
    check_shank(probe, shank)?;
    check_column_row(probe, column, row)
}

/// Electrode index to grid position on shank 0.
pub fn e2cr(probe: NpxProbeType, electrode: u32) -> NpxResult<ShankColumnRow> {
    check_electrode(probe, electrode)?;
    let nc = probe.n_column_per_shank();
    Ok(ShankColumnRow {
        shank: 0,
        column: electrode % nc,
        row: electrode / nc,
    })
}

/// Grid position to shank-local electrode index.
pub fn cr2e(probe: NpxProbeType, column: u32, row: u32) -> NpxResult<u32> {
    check_column_row(probe, column, row)?;
    Ok(column_row_index(probe, column, row))
}

#[inline]
pub(crate) const fn column_row_index(probe: NpxProbeType, column: u32, row: u32) -> u32 {
    column + probe.n_column_per_shank() * row
}

/// Grid position to spatial position.
pub fn cr2xy(probe: NpxProbeType, shank: u32, column: u32, row: u32) -> NpxResult<ShankPosition> {
    check_position(probe, shank, column, row)?;
    Ok(position(probe, shank, column, row))
}

/// Electrode index on `shank` to spatial position.
pub fn e2xy(probe: NpxProbeType, shank: u32, electrode: u32) -> NpxResult<ShankPosition> {
    check_shank(probe, shank)?;
    let cr = e2cr(probe, electrode)?;
    Ok(position(probe, shank, cr.column, cr.row))
}

/// Spatial position of an electrode; range-checked.
pub fn electrode_xy(probe: NpxProbeType, electrode: &Electrode) -> NpxResult<ShankPosition> {
    cr2xy(probe, electrode.shank, electrode.column, electrode.row)
}

#[inline]
pub(crate) const fn position(probe: NpxProbeType, shank: u32, column: u32, row: u32) -> ShankPosition {
    ShankPosition {
        shank,
        x: shank * probe.space_per_shank() + column * probe.space_per_column(),
        y: row * probe.space_per_row(),
    }
}

/// Electrode index on `shank` to hardware address.
pub fn e2cb(probe: NpxProbeType, shank: u32, electrode: u32) -> NpxResult<ChannelBank> {
    check_shank(probe, shank)?;
    check_electrode(probe, electrode)?;
    Ok(channel_bank(probe, shank, electrode))
}

/// Grid position to hardware address.
pub fn cr2cb(probe: NpxProbeType, shank: u32, column: u32, row: u32) -> NpxResult<ChannelBank> {
    check_position(probe, shank, column, row)?;
    Ok(channel_bank(probe, shank, column_row_index(probe, column, row)))
}

/// Electrode index on `shank` to channel number.
pub fn e2c(probe: NpxProbeType, shank: u32, electrode: u32) -> NpxResult<u32> {
    e2cb(probe, shank, electrode).map(|cb| cb.channel)
}

/// Hardware address of an electrode; range-checked.
pub fn electrode_cb(probe: NpxProbeType, electrode: &Electrode) -> NpxResult<ChannelBank> {
    cr2cb(probe, electrode.shank, electrode.column, electrode.row)
}

/// Unchecked hardware address; callers guarantee the inputs are in range.
#[inline]
pub(crate) const fn channel_bank(probe: NpxProbeType, shank: u32, electrode: u32) -> ChannelBank {
    match probe {
        NpxProbeType::Np0 => e2c0(electrode),
        NpxProbeType::Np21 => e2c21(electrode),
        NpxProbeType::Np24 => e2c24(shank, electrode),
    }
}

const fn e2c0(electrode: u32) -> ChannelBank {
    let n = NpxProbeType::Np0.n_channel();
    ChannelBank {
        channel: electrode % n,
        bank: electrode / n,
    }
}

const fn e2c21(electrode: u32) -> ChannelBank {
    let n = NpxProbeType::Np21.n_channel();
    let bf = ELECTRODE_MAP_21[0];
    let ba = ELECTRODE_MAP_21[1];
    let bank = electrode / n;
    let e1 = electrode % n;
    let block = e1 / NP21_BLOCK;
    let e2 = e1 % NP21_BLOCK;
    let row = e2 / 2;
    let column = e2 % 2;
    let b = bank as usize;
    let channel = 2 * ((row * bf[b] + column * ba[b]) % 16) + NP21_BLOCK * block + column;
    ChannelBank { channel, bank }
}

const fn e2c24(shank: u32, electrode: u32) -> ChannelBank {
    let n = NpxProbeType::Np24.n_channel();
    let bank = electrode / n;
    let e1 = electrode % n;
    let b1 = e1 / NP24_BLOCK;
    let index = e1 % NP24_BLOCK;
    let block = ELECTRODE_MAP_24[shank as usize][b1 as usize];
    ChannelBank {
        channel: NP24_BLOCK * block + index,
        bank,
    }
}

/// Hardware address back to the shank-local electrode index.
///
/// Returns `None` when the bank does not wire an electrode to `channel`
/// (the last bank of a shank is only partially populated).
pub fn cb2e(probe: NpxProbeType, shank: u32, channel: u32, bank: u32) -> NpxResult<Option<u32>> {
    check_shank(probe, shank)?;
    let n = probe.n_channel();
    if channel >= n {
        return Err(NpxError::InvalidGeometry(format!(
            "channel value out of range: {}",
            channel
        )));
    }
    if bank >= probe.n_bank() {
        return Err(NpxError::InvalidGeometry(format!("bank value out of range: {}", bank)));
    }

    let start = bank * n;
    let end = (start + n).min(probe.n_electrode_per_shank());
    Ok((start..end).find(|&e| channel_bank(probe, shank, e).channel == channel))
}

/// Grid positions of every electrode as a `3 x N` array of
/// `{0: shank, 1: column, 2: row}`, in canonical order (shank-major, then
/// electrode index).
pub fn electrode_pos_scr(probe: NpxProbeType) -> Array2<u32> {
    let ne = probe.n_electrode_per_shank();
    let nc = probe.n_column_per_shank();
    let n = probe.n_electrode() as usize;
    Array2::from_shape_fn((3, n), |(k, i)| {
        let i = i as u32;
        match k {
            0 => i / ne,
            1 => (i % ne) % nc,
            _ => (i % ne) / nc,
        }
    })
}

/// Spatial positions of every electrode as a `3 x N` array of
/// `{0: shank, 1: x, 2: y}`, in canonical order.
pub fn electrode_pos_xy(probe: NpxProbeType) -> Array2<u32> {
    let scr = electrode_pos_scr(probe);
    let mut ret = Array2::zeros(scr.raw_dim());
    for (i, column) in scr.columns().into_iter().enumerate() {
        let p = position(probe, column[0], column[1], column[2]);
        ret[[0, i]] = p.shank;
        ret[[1, i]] = p.x;
        ret[[2, i]] = p.y;
    }
    ret
}

/// Channel numbers of every electrode, in canonical order.
pub fn electrode_channels(probe: NpxProbeType) -> Vec<u32> {
    let scr = electrode_pos_scr(probe);
    scr.columns()
        .into_iter()
        .map(|c| channel_bank(probe, c[0], column_row_index(probe, c[1], c[2])).channel)
        .collect()
}
