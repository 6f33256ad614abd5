// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Channel map: the assignment of electrodes to the probe's amplifier channels.

A channel map holds one optional electrode per channel. The slot an electrode
lands in is not chosen by the caller; it is the hardware channel computed by
the coordinate translator. Two distinct electrodes wired to the same channel
cannot both be recorded, so adding the second one fails with a
[`ChannelConflict`] that the caller may resolve with [`ChannelConflict::force_add`].

## Invariants

- for every occupied slot `c`, the stored electrode's computed channel is `c`
- an electrode identity appears at most once
- `size() <= capacity()`
*/

use std::fmt;
use std::hash::{Hash, Hasher};

use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::electrode::Electrode;
use crate::error::{NpxError, NpxResult};
use crate::meta::NpxMeta;
use crate::probe_type::NpxProbeType;
use crate::reference::{max_reference_value, ReferenceInfo};
use crate::transform::{channel_bank, check_position, column_row_index, e2cr, position};

/// Raised when an electrode's channel is occupied by a different electrode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelConflict {
    pub channel: u32,
    /// Electrode currently holding the channel.
    pub occupant: Electrode,
    /// Electrode that was rejected, with its attributes.
    pub requested: Electrode,
}

impl ChannelConflict {
    /// Evict the occupant and place the requested electrode in its channel.
    ///
    /// Returns the electrode now stored in the slot.
    pub fn force_add(self, chmap: &mut ChannelMap) -> NpxResult<Electrode> {
        let evicted = chmap.remove_electrode(
            self.occupant.shank,
            self.occupant.column,
            self.occupant.row,
        );
        trace!(
            "[CHMAP] force add {} on channel {} (evicted {:?})",
            self.requested,
            self.channel,
            evicted.map(|e| e.identity())
        );
        let mut placed = chmap.add_electrode_from(&self.requested)?;
        if let Some(slot) = chmap.electrode_mut(placed.shank, placed.column, placed.row) {
            slot.in_used = self.requested.in_used;
            placed = *slot;
        }
        Ok(placed)
    }
}

impl fmt::Display for ChannelConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Channel {} has been used by {}, cannot add {}",
            self.channel, self.occupant, self.requested
        )
    }
}

/// Channel-indexed electrode assignment for one probe.
#[derive(Debug, Clone)]
pub struct ChannelMap {
    probe_type: NpxProbeType,
    electrodes: Vec<Option<Electrode>>,
    reference: u32,
    meta: Option<NpxMeta>,
}

/// Serializable value form of a channel map.
///
/// `channels[c]` is the electrode routed to channel `c`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelMapSnapshot {
    pub probe_type: NpxProbeType,
    #[serde(default)]
    pub reference: u32,
    pub channels: Vec<Option<Electrode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<NpxMeta>,
}

impl ChannelMap {
    /// Create an empty channel map for `probe_type`.
    pub fn new(probe_type: NpxProbeType) -> Self {
        Self {
            probe_type,
            electrodes: vec![None; probe_type.n_channel() as usize],
            reference: 0,
            meta: None,
        }
    }

    pub fn probe_type(&self) -> NpxProbeType {
        self.probe_type
    }

    pub fn meta(&self) -> Option<&NpxMeta> {
        self.meta.as_ref()
    }

    pub fn set_meta(&mut self, meta: Option<NpxMeta>) {
        self.meta = meta;
    }

    pub fn reference(&self) -> u32 {
        self.reference
    }

    pub fn set_reference(&mut self, reference: u32) -> NpxResult<()> {
        let max = max_reference_value(self.probe_type);
        if reference >= max {
            return Err(NpxError::InvalidReference { reference, max });
        }
        self.reference = reference;
        Ok(())
    }

    pub fn reference_info(&self) -> NpxResult<ReferenceInfo> {
        ReferenceInfo::of(self.probe_type, self.reference)
    }

    /// Number of occupied channels.
    pub fn size(&self) -> usize {
        self.electrodes.iter().filter(|e| e.is_some()).count()
    }

    /// Number of channels.
    pub fn capacity(&self) -> usize {
        self.electrodes.len()
    }

    /// Every channel is occupied.
    pub fn is_complete(&self) -> bool {
        self.size() == self.capacity()
    }

    /// Slot contents, indexed by channel.
    pub fn channels(&self) -> &[Option<Electrode>] {
        &self.electrodes
    }

    /// Occupied slots in channel order.
    pub fn electrodes(&self) -> impl Iterator<Item = &Electrode> + '_ {
        self.electrodes.iter().flatten()
    }

    pub fn get_channel(&self, channel: u32) -> Option<&Electrode> {
        self.electrodes.get(channel as usize).and_then(Option::as_ref)
    }

    /// Slot contents for each requested channel; out-of-range channels yield `None`.
    pub fn get_channels(&self, channels: &[u32]) -> Vec<Option<Electrode>> {
        channels.iter().map(|&c| self.get_channel(c).copied()).collect()
    }

    /// Channels with no electrode.
    pub fn disconnected_channels(&self) -> Vec<u32> {
        self.electrodes
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_none())
            .map(|(i, _)| i as u32)
            .collect()
    }

    /// Slot an electrode would occupy, or `None` if out of range.
    fn slot_of(&self, shank: u32, column: u32, row: u32) -> Option<usize> {
        check_position(self.probe_type, shank, column, row).ok()?;
        let e = column_row_index(self.probe_type, column, row);
        Some(channel_bank(self.probe_type, shank, e).channel as usize)
    }

    pub fn get_electrode(&self, shank: u32, column: u32, row: u32) -> Option<&Electrode> {
        let slot = self.slot_of(shank, column, row)?;
        self.electrodes[slot]
            .as_ref()
            .filter(|e| e.is_at(shank, column, row))
    }

    /// Look up by shank-local electrode index.
    pub fn get_electrode_index(&self, shank: u32, electrode: u32) -> Option<&Electrode> {
        let cr = e2cr(self.probe_type, electrode).ok()?;
        self.get_electrode(shank, cr.column, cr.row)
    }

    pub fn electrode_mut(&mut self, shank: u32, column: u32, row: u32) -> Option<&mut Electrode> {
        let slot = self.slot_of(shank, column, row)?;
        self.electrodes[slot]
            .as_mut()
            .filter(|e| e.is_at(shank, column, row))
    }

    pub fn contains(&self, electrode: &Electrode) -> bool {
        self.get_electrode(electrode.shank, electrode.column, electrode.row)
            .is_some()
    }

    /// Occupied electrodes matching `predicate`, in channel order.
    pub fn electrodes_matching<F>(&self, mut predicate: F) -> Vec<Electrode>
    where
        F: FnMut(&Electrode) -> bool,
    {
        self.electrodes().filter(|e| predicate(*e)).copied().collect()
    }

    /// Route the electrode at `(shank, column, row)` to its channel.
    ///
    /// Adding an electrode that is already present returns it unchanged.
    ///
    /// # Errors
    ///
    /// `InvalidGeometry` for out-of-range positions, `ChannelConflict` when a
    /// different electrode already holds the channel.
    pub fn add_electrode(&mut self, shank: u32, column: u32, row: u32) -> NpxResult<Electrode> {
        let mut candidate = Electrode::new(shank, column, row);
        candidate.in_used = true;
        self.insert(candidate, false)
    }

    /// Route `electrode`, copying its front-end attributes onto the stored one.
    pub fn add_electrode_from(&mut self, electrode: &Electrode) -> NpxResult<Electrode> {
        let mut candidate = Electrode::new(electrode.shank, electrode.column, electrode.row);
        candidate.in_used = true;
        candidate.copy_from(electrode);
        self.insert(candidate, true)
    }

    /// Add by shank-local electrode index.
    pub fn add_electrode_index(&mut self, shank: u32, electrode: u32) -> NpxResult<Electrode> {
        let cr = e2cr(self.probe_type, electrode)?;
        self.add_electrode(shank, cr.column, cr.row)
    }

    fn insert(&mut self, candidate: Electrode, copy_attributes: bool) -> NpxResult<Electrode> {
        let (shank, column, row) = candidate.identity();
        check_position(self.probe_type, shank, column, row)?;
        let e = column_row_index(self.probe_type, column, row);
        let channel = channel_bank(self.probe_type, shank, e).channel;

        let slot = &mut self.electrodes[channel as usize];
        match slot.as_mut() {
            None => {}
            Some(existing) if existing.is_at(shank, column, row) => {
                if copy_attributes {
                    existing.copy_from(&candidate);
                }
                return Ok(*existing);
            }
            Some(existing) => {
                return Err(ChannelConflict {
                    channel,
                    occupant: *existing,
                    requested: candidate,
                }
                .into());
            }
        }
        *slot = Some(candidate);
        Ok(candidate)
    }

    /// Clear the slot holding `(shank, column, row)`; returns the removed electrode.
    pub fn remove_electrode(&mut self, shank: u32, column: u32, row: u32) -> Option<Electrode> {
        let slot = self.slot_of(shank, column, row)?;
        match self.electrodes[slot] {
            Some(e) if e.is_at(shank, column, row) => self.electrodes[slot].take(),
            _ => None,
        }
    }

    /// Remove every electrode matching `predicate`; returns them in channel order.
    pub fn remove_electrodes<F>(&mut self, mut predicate: F) -> Vec<Electrode>
    where
        F: FnMut(&Electrode) -> bool,
    {
        let mut ret = Vec::new();
        for slot in self.electrodes.iter_mut() {
            if slot.as_ref().is_some_and(|e| predicate(e)) {
                ret.extend(slot.take());
            }
        }
        ret
    }

    /// Empty every slot; returns the previously held electrodes.
    pub fn clear_electrodes(&mut self) -> Vec<Electrode> {
        self.electrodes.iter_mut().filter_map(Option::take).collect()
    }

    /// Shank of each channel's electrode, or `-1`.
    ///
    /// Electrodes not marked `in_used` count as empty unless `include_unused`.
    pub fn channel_shank(&self, include_unused: bool) -> Vec<i32> {
        self.per_channel(include_unused, |_, e| e.shank as i32)
    }

    /// X position (um) of each channel's electrode, or `-1`.
    pub fn channel_pos_x(&self, include_unused: bool) -> Vec<i32> {
        self.per_channel(include_unused, |probe, e| {
            position(probe, e.shank, e.column, e.row).x as i32
        })
    }

    /// Y position (um) of each channel's electrode, or `-1`.
    pub fn channel_pos_y(&self, include_unused: bool) -> Vec<i32> {
        self.per_channel(include_unused, |probe, e| {
            position(probe, e.shank, e.column, e.row).y as i32
        })
    }

    fn per_channel<F>(&self, include_unused: bool, f: F) -> Vec<i32>
    where
        F: Fn(NpxProbeType, &Electrode) -> i32,
    {
        self.electrodes
            .iter()
            .map(|slot| match slot {
                Some(e) if e.in_used || include_unused => f(self.probe_type, e),
                _ => -1,
            })
            .collect()
    }

    /// Check the slot invariants.
    pub fn validate(&self) -> NpxResult<()> {
        let mut seen = AHashSet::new();
        for (c, e) in self.electrodes.iter().enumerate() {
            let Some(e) = e else { continue };
            check_position(self.probe_type, e.shank, e.column, e.row)?;
            let index = column_row_index(self.probe_type, e.column, e.row);
            let expected = channel_bank(self.probe_type, e.shank, index).channel as usize;
            if expected != c {
                return Err(NpxError::InvalidGeometry(format!(
                    "{} stored in channel {} but wired to channel {}",
                    e, c, expected
                )));
            }
            if !seen.insert(e.identity()) {
                return Err(NpxError::InvalidGeometry(format!("{} appears twice", e)));
            }
        }
        Ok(())
    }

    pub fn snapshot(&self) -> ChannelMapSnapshot {
        ChannelMapSnapshot {
            probe_type: self.probe_type,
            reference: self.reference,
            channels: self.electrodes.clone(),
            meta: self.meta.clone(),
        }
    }

    /// Rebuild a channel map from its value form.
    ///
    /// Electrodes are re-routed through [`ChannelMap::add_electrode_from`], so
    /// a snapshot whose slot order disagrees with the wiring is accepted as
    /// long as no two electrodes share a channel.
    pub fn from_snapshot(snapshot: &ChannelMapSnapshot) -> NpxResult<Self> {
        let mut ret = ChannelMap::new(snapshot.probe_type);
        if snapshot.channels.len() != ret.capacity() {
            return Err(NpxError::InvalidGeometry(format!(
                "snapshot has {} channels, probe {} has {}",
                snapshot.channels.len(),
                snapshot.probe_type,
                ret.capacity()
            )));
        }
        ret.set_reference(snapshot.reference)?;
        for e in snapshot.channels.iter().flatten() {
            ret.add_electrode_from(e)?;
            if let Some(slot) = ret.electrode_mut(e.shank, e.column, e.row) {
                slot.in_used = e.in_used;
            }
        }
        ret.meta = snapshot.meta.clone();
        Ok(ret)
    }
}

impl PartialEq for ChannelMap {
    fn eq(&self, other: &Self) -> bool {
        self.probe_type == other.probe_type
            && self.reference == other.reference
            && self.electrodes == other.electrodes
    }
}

impl Eq for ChannelMap {}

impl Hash for ChannelMap {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.probe_type.hash(state);
        self.electrodes.hash(state);
        self.reference.hash(state);
    }
}

impl fmt::Display for ChannelMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = self.probe_type;
        write!(
            f,
            "ChannelMap[{},{},{},{},{}]",
            p.n_shank(),
            p.n_column_per_shank(),
            p.n_row_per_shank(),
            p.n_channel(),
            self.size()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_is_idempotent() {
        let mut chmap = ChannelMap::new(NpxProbeType::Np24);
        let a = chmap.add_electrode(0, 1, 10).unwrap();
        let b = chmap.add_electrode(0, 1, 10).unwrap();
        assert_eq!(a, b);
        assert_eq!(chmap.size(), 1);
        assert!(a.in_used);
    }

    #[test]
    fn test_slot_is_the_wired_channel() {
        let mut chmap = ChannelMap::new(NpxProbeType::Np0);
        chmap.add_electrode(0, 1, 3).unwrap();
        // electrode index 7 -> channel 7
        assert_eq!(chmap.get_channel(7).map(Electrode::identity), Some((0, 1, 3)));
        assert_eq!(chmap.disconnected_channels().len(), 383);
    }

    #[test]
    fn test_conflict_then_force_add() {
        let mut chmap = ChannelMap::new(NpxProbeType::Np0);
        chmap.add_electrode(0, 0, 0).unwrap();

        // electrode 384 (column 0, row 192) shares channel 0
        let err = chmap.add_electrode(0, 0, 192).unwrap_err();
        let conflict = err.into_conflict().unwrap();
        assert_eq!(conflict.channel, 0);
        assert_eq!(conflict.occupant.identity(), (0, 0, 0));
        assert_eq!(conflict.requested.identity(), (0, 0, 192));

        conflict.force_add(&mut chmap).unwrap();
        assert_eq!(chmap.size(), 1);
        assert!(chmap.get_electrode(0, 0, 0).is_none());
        assert!(chmap.get_electrode(0, 0, 192).is_some());
    }

    #[test]
    fn test_add_from_copies_attributes() {
        let mut chmap = ChannelMap::new(NpxProbeType::Np21);
        let mut source = Electrode::new(0, 1, 1);
        source.ap_band_gain = 500;
        chmap.add_electrode(0, 1, 1).unwrap();
        let stored = chmap.add_electrode_from(&source).unwrap();
        assert_eq!(stored.ap_band_gain, 500);
        assert_eq!(chmap.get_electrode(0, 1, 1).unwrap().ap_band_gain, 500);
    }

    #[test]
    fn test_out_of_range_positions() {
        let mut chmap = ChannelMap::new(NpxProbeType::Np21);
        assert!(matches!(chmap.add_electrode(1, 0, 0), Err(NpxError::InvalidGeometry(_))));
        assert!(matches!(chmap.add_electrode(0, 2, 0), Err(NpxError::InvalidGeometry(_))));
        assert!(matches!(chmap.add_electrode(0, 0, 640), Err(NpxError::InvalidGeometry(_))));
        assert!(chmap.get_electrode(0, 0, 640).is_none());
        assert!(chmap.remove_electrode(3, 0, 0).is_none());
    }

    #[test]
    fn test_remove_and_clear() {
        let mut chmap = ChannelMap::new(NpxProbeType::Np24);
        for row in 0..4 {
            chmap.add_electrode(1, 0, row).unwrap();
        }
        assert_eq!(chmap.remove_electrode(1, 0, 0).map(|e| e.row), Some(0));
        assert!(chmap.remove_electrode(1, 0, 0).is_none());

        let odd = chmap.remove_electrodes(|e| e.row % 2 == 1);
        assert_eq!(odd.len(), 2);
        assert_eq!(chmap.clear_electrodes().len(), 1);
        assert_eq!(chmap.size(), 0);
    }

    #[test]
    fn test_equality_ignores_meta() {
        let mut a = ChannelMap::new(NpxProbeType::Np24);
        let mut b = ChannelMap::new(NpxProbeType::Np24);
        a.add_electrode(2, 1, 5).unwrap();
        b.add_electrode(2, 1, 5).unwrap();
        b.set_meta(Some(NpxMeta::new()));
        assert_eq!(a, b);

        b.set_reference(1).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_reference_range() {
        let mut chmap = ChannelMap::new(NpxProbeType::Np0);
        assert!(chmap.set_reference(4).is_ok());
        assert!(matches!(
            chmap.set_reference(5),
            Err(NpxError::InvalidReference { reference: 5, max: 5 })
        ));
        assert_eq!(chmap.reference(), 4);
    }

    #[test]
    fn test_channel_positions() {
        let mut chmap = ChannelMap::new(NpxProbeType::Np24);
        let e = chmap.add_electrode(1, 1, 2).unwrap();
        let c = crate::transform::cr2cb(NpxProbeType::Np24, 1, 1, 2).unwrap().channel as usize;

        assert_eq!(chmap.channel_shank(false)[c], 1);
        assert_eq!(chmap.channel_pos_x(false)[c], 250 + 32);
        assert_eq!(chmap.channel_pos_y(false)[c], 30);

        chmap.electrode_mut(e.shank, e.column, e.row).unwrap().in_used = false;
        assert_eq!(chmap.channel_shank(false)[c], -1);
        assert_eq!(chmap.channel_shank(true)[c], 1);
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut chmap = ChannelMap::new(NpxProbeType::Np21);
        chmap.add_electrode(0, 0, 0).unwrap();
        chmap.add_electrode(0, 1, 300).unwrap();
        chmap.set_reference(2).unwrap();

        let json = serde_json::to_string(&chmap.snapshot()).unwrap();
        let snapshot: ChannelMapSnapshot = serde_json::from_str(&json).unwrap();
        let restored = ChannelMap::from_snapshot(&snapshot).unwrap();
        assert_eq!(restored, chmap);
        assert!(restored.validate().is_ok());
    }

    #[test]
    fn test_display() {
        let mut chmap = ChannelMap::new(NpxProbeType::Np24);
        chmap.add_electrode(0, 0, 0).unwrap();
        assert_eq!(chmap.to_string(), "ChannelMap[4,2,640,384,1]");
    }
}
