// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! In-memory blueprint covering every electrode of a probe.

use ahash::AHashMap;
use ndarray::Array2;
use tracing::debug;

use super::{Blueprint, ElectrodeDescription, CATE_UNSET, STATE_DISABLED, STATE_UNUSED, STATE_USED};
use crate::channelmap::ChannelMap;
use crate::electrode::Electrode;
use crate::error::{NpxError, NpxResult};
use crate::probe_type::NpxProbeType;
use crate::transform::{cb2e, channel_bank, check_position, column_row_index, position};

/// Rows of the interchange table: shank, column, row, state, category.
pub const BLUEPRINT_ROWS: usize = 5;

/// Every electrode of `probe` in canonical order (shank-major, then
/// shank-local electrode index), unset and unused.
pub fn all_electrodes(probe: NpxProbeType) -> Vec<ElectrodeDescription> {
    let ne = probe.n_electrode_per_shank();
    let nc = probe.n_column_per_shank();
    (0..probe.n_electrode())
        .map(|i| {
            let shank = i / ne;
            let e = i % ne;
            let (column, row) = (e % nc, e / nc);
            let p = position(probe, shank, column, row);
            ElectrodeDescription {
                electrode: Electrode::new(shank, column, row),
                x: p.x,
                y: p.y,
                channel: channel_bank(probe, shank, e).channel,
                state: STATE_UNUSED,
                category: CATE_UNSET,
            }
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct ProbeBlueprint {
    probe_type: NpxProbeType,
    electrodes: Vec<ElectrodeDescription>,
    /// (shank, x, y) -> index
    position_index: AHashMap<(u32, u32, u32), usize>,
}

impl ProbeBlueprint {
    pub fn new(probe_type: NpxProbeType) -> Self {
        let electrodes = all_electrodes(probe_type);
        let position_index = electrodes
            .iter()
            .enumerate()
            .map(|(i, e)| ((e.shank(), e.x, e.y), i))
            .collect();
        Self {
            probe_type,
            electrodes,
            position_index,
        }
    }

    /// Index of the electrode at a grid position.
    pub fn index_of_electrode(&self, shank: u32, column: u32, row: u32) -> Option<usize> {
        check_position(self.probe_type, shank, column, row).ok()?;
        let ne = self.probe_type.n_electrode_per_shank();
        Some((shank * ne + column_row_index(self.probe_type, column, row)) as usize)
    }

    pub fn set_category_at(&mut self, shank: u32, column: u32, row: u32, category: i32) -> NpxResult<()> {
        check_position(self.probe_type, shank, column, row)?;
        let ne = self.probe_type.n_electrode_per_shank();
        let i = shank * ne + column_row_index(self.probe_type, column, row);
        self.electrodes[i as usize].category = category;
        Ok(())
    }

    /// Assign `category` to every index in `indices`.
    pub fn set_categories<I>(&mut self, indices: I, category: i32)
    where
        I: IntoIterator<Item = usize>,
    {
        for i in indices {
            if let Some(e) = self.electrodes.get_mut(i) {
                e.category = category;
            }
        }
    }

    /// Every electrode back to unset and unused.
    pub fn clear(&mut self) {
        for e in &mut self.electrodes {
            e.state = STATE_UNUSED;
            e.category = CATE_UNSET;
        }
    }

    /// Mark the electrodes of `chmap` as used and all others as unused.
    ///
    /// Disabled electrodes stay disabled.
    pub fn apply_channelmap(&mut self, chmap: &ChannelMap) -> NpxResult<()> {
        if chmap.probe_type() != self.probe_type {
            return Err(NpxError::BadBlueprint(format!(
                "channel map for {} applied to a {} blueprint",
                chmap.probe_type(),
                self.probe_type
            )));
        }
        for e in &mut self.electrodes {
            if e.state != STATE_DISABLED {
                e.state = STATE_UNUSED;
            }
        }
        for e in chmap.electrodes() {
            if let Some(i) = self.index_of_electrode(e.shank, e.column, e.row) {
                if self.electrodes[i].state != STATE_DISABLED {
                    self.electrodes[i].state = STATE_USED;
                }
            }
        }
        Ok(())
    }

    /// 5xN interchange table, one column per electrode in canonical order.
    pub fn to_array(&self) -> Array2<i32> {
        let mut ret = Array2::zeros((BLUEPRINT_ROWS, self.electrodes.len()));
        for (j, e) in self.electrodes.iter().enumerate() {
            ret[[0, j]] = e.electrode.shank as i32;
            ret[[1, j]] = e.electrode.column as i32;
            ret[[2, j]] = e.electrode.row as i32;
            ret[[3, j]] = e.state;
            ret[[4, j]] = e.category;
        }
        ret
    }

    /// Copy state and category from an interchange table.
    ///
    /// Columns are matched by electrode identity; columns naming an electrode
    /// this probe does not have are ignored. Returns the number of columns
    /// applied.
    pub fn apply_array(&mut self, table: &Array2<i32>) -> NpxResult<usize> {
        if table.nrows() != BLUEPRINT_ROWS {
            return Err(NpxError::BadBlueprint(format!(
                "expected {} rows, got {}",
                BLUEPRINT_ROWS,
                table.nrows()
            )));
        }

        let mut applied = 0;
        for column in table.columns() {
            let (s, c, r) = (column[0], column[1], column[2]);
            if s < 0 || c < 0 || r < 0 {
                continue;
            }
            if let Some(i) = self.index_of_electrode(s as u32, c as u32, r as u32) {
                self.electrodes[i].state = column[3];
                self.electrodes[i].category = column[4];
                applied += 1;
            }
        }

        if applied != table.ncols() {
            debug!(
                "[BLUEPRINT] ignored {} unknown electrodes",
                table.ncols() - applied
            );
        }
        Ok(applied)
    }

    /// Build a blueprint from an interchange table, inferring the probe
    /// variant from the number of electrodes.
    pub fn from_array(table: &Array2<i32>) -> NpxResult<Self> {
        let n = table.ncols() as u32;
        let probe_type = NpxProbeType::ALL
            .into_iter()
            .find(|p| p.n_electrode() == n)
            .ok_or_else(|| {
                NpxError::BadBlueprint(format!("no probe type has {} electrodes", n))
            })?;
        let mut ret = ProbeBlueprint::new(probe_type);
        ret.apply_array(table)?;
        Ok(ret)
    }
}

impl Blueprint for ProbeBlueprint {
    fn probe_type(&self) -> NpxProbeType {
        self.probe_type
    }

    fn electrodes(&self) -> &[ElectrodeDescription] {
        &self.electrodes
    }

    fn set_category(&mut self, index: usize, category: i32) {
        self.electrodes[index].category = category;
    }

    fn set_state(&mut self, index: usize, state: i32) {
        self.electrodes[index].state = state;
    }

    fn index_of(&self, shank: u32, x: i64, y: i64) -> Option<usize> {
        let x = u32::try_from(x).ok()?;
        let y = u32::try_from(y).ok()?;
        self.position_index.get(&(shank, x, y)).copied()
    }

    fn invalid_electrodes(&self, index: usize) -> Vec<usize> {
        let channel = self.electrodes[index].channel;
        let ne = self.probe_type.n_electrode_per_shank() as usize;
        // each shank wires at most one electrode per bank to a channel
        let mut ret = Vec::new();
        for shank in 0..self.probe_type.n_shank() {
            for bank in 0..self.probe_type.n_bank() {
                if let Ok(Some(e)) = cb2e(self.probe_type, shank, channel, bank) {
                    ret.push(shank as usize * ne + e as usize);
                }
            }
        }
        ret
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blueprint::{CATE_EXCLUDED, CATE_FULL, CATE_SET};

    #[test]
    fn test_canonical_order() {
        let electrodes = all_electrodes(NpxProbeType::Np24);
        assert_eq!(electrodes.len(), 5120);
        assert_eq!(electrodes[0].electrode.identity(), (0, 0, 0));
        assert_eq!(electrodes[1].electrode.identity(), (0, 1, 0));
        assert_eq!(electrodes[2].electrode.identity(), (0, 0, 1));
        assert_eq!(electrodes[1280].electrode.identity(), (1, 0, 0));
        assert_eq!((electrodes[1281].x, electrodes[1281].y), (282, 0));
    }

    #[test]
    fn test_position_lookup() {
        let bp = ProbeBlueprint::new(NpxProbeType::Np24);
        assert_eq!(bp.index_of(1, 282, 15), Some(1280 + 3));
        assert_eq!(bp.index_of(1, 250 - 32, 0), None);
        assert_eq!(bp.index_of(0, 0, -15), None);
        assert_eq!(bp.index_of_electrode(1, 1, 1), Some(1283));
        assert_eq!(bp.index_of_electrode(4, 0, 0), None);
    }

    #[test]
    fn test_invalid_electrodes_share_channel() {
        let bp = ProbeBlueprint::new(NpxProbeType::Np0);
        // channel 0 is electrode 0, 384 and 768
        assert_eq!(bp.invalid_electrodes(0), vec![0, 384, 768]);

        let bp = ProbeBlueprint::new(NpxProbeType::Np24);
        let invalid = bp.invalid_electrodes(10);
        assert!(invalid.contains(&10));
        assert!(invalid.iter().all(|&j| bp.electrodes()[j].channel == bp.electrodes()[10].channel));
        // every shank carries the channel once per populated bank
        let expected = bp
            .electrodes()
            .iter()
            .filter(|e| e.channel == bp.electrodes()[10].channel)
            .count();
        assert_eq!(invalid.len(), expected);
    }

    #[test]
    fn test_array_interchange() {
        let mut bp = ProbeBlueprint::new(NpxProbeType::Np21);
        bp.set_category_at(0, 1, 20, CATE_FULL).unwrap();
        bp.set_category(7, CATE_EXCLUDED);
        bp.set_state(7, STATE_DISABLED);

        let table = bp.to_array();
        assert_eq!(table.shape(), &[5, 1280]);

        let restored = ProbeBlueprint::from_array(&table).unwrap();
        assert_eq!(restored.probe_type(), NpxProbeType::Np21);
        assert_eq!(restored.electrodes(), bp.electrodes());
    }

    #[test]
    fn test_apply_array_ignores_unknown_electrodes() {
        let mut bp = ProbeBlueprint::new(NpxProbeType::Np0);
        let mut table = Array2::zeros((5, 2));
        // (0, 1, 3) pre-selected
        table[[1, 0]] = 1;
        table[[2, 0]] = 3;
        table[[4, 0]] = CATE_SET;
        // shank 2 does not exist on NP0
        table[[0, 1]] = 2;
        table[[4, 1]] = CATE_SET;

        assert_eq!(bp.apply_array(&table).unwrap(), 1);
        assert_eq!(bp.count_category(CATE_SET), 1);
        assert_eq!(bp.category(7), CATE_SET);
    }

    #[test]
    fn test_bad_tables() {
        let table: Array2<i32> = Array2::zeros((4, 960));
        assert!(matches!(ProbeBlueprint::from_array(&table), Err(NpxError::BadBlueprint(_))));
        let table: Array2<i32> = Array2::zeros((5, 100));
        assert!(matches!(ProbeBlueprint::from_array(&table), Err(NpxError::BadBlueprint(_))));
    }

    #[test]
    fn test_apply_channelmap() {
        let mut bp = ProbeBlueprint::new(NpxProbeType::Np0);
        bp.set_state(2, STATE_DISABLED);
        bp.set_state(5, STATE_USED);

        let mut chmap = ChannelMap::new(NpxProbeType::Np0);
        chmap.add_electrode(0, 0, 0).unwrap();
        chmap.add_electrode(0, 0, 1).unwrap();
        bp.apply_channelmap(&chmap).unwrap();

        assert_eq!(bp.state(0), STATE_USED);
        assert_eq!(bp.state(2), STATE_DISABLED);
        assert_eq!(bp.state(5), STATE_UNUSED);

        let other = ChannelMap::new(NpxProbeType::Np24);
        assert!(bp.apply_channelmap(&other).is_err());
    }
}
