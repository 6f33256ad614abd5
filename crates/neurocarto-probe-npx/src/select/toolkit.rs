// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Working copy of a blueprint's categories used during one selection run.

use rand::seq::SliceRandom;
use rand::RngCore;

use crate::blueprint::Blueprint;
use crate::channelmap::ChannelMap;
use crate::electrode::Electrode;
use crate::error::{NpxError, NpxResult};
use crate::probe_type::NpxProbeType;

/// Sentinel for electrodes that can no longer be selected. Never written
/// back to a blueprint.
pub(crate) const CATE_INVALIDED: i32 = i32::MAX;

pub(crate) struct SelectionToolkit<'a> {
    blueprint: &'a dyn Blueprint,
    probe: NpxProbeType,
    category: Vec<i32>,
    invalided: usize,
}

impl<'a> SelectionToolkit<'a> {
    pub fn new(blueprint: &'a dyn Blueprint) -> Self {
        let category: Vec<i32> = blueprint.electrodes().iter().map(|e| e.category).collect();
        let invalided = category.iter().filter(|&&c| c == CATE_INVALIDED).count();
        Self {
            blueprint,
            probe: blueprint.probe_type(),
            category,
            invalided,
        }
    }

    pub fn probe_type(&self) -> NpxProbeType {
        self.probe
    }

    pub fn len(&self) -> usize {
        self.category.len()
    }

    pub fn category(&self, index: usize) -> i32 {
        self.category[index]
    }

    pub fn electrode(&self, index: usize) -> &Electrode {
        &self.blueprint.electrodes()[index].electrode
    }

    pub fn set(&mut self, index: usize, category: i32) {
        let old = std::mem::replace(&mut self.category[index], category);
        match (old == CATE_INVALIDED, category == CATE_INVALIDED) {
            (false, true) => self.invalided += 1,
            (true, false) => self.invalided -= 1,
            _ => {}
        }
    }

    pub fn invalidate(&mut self, index: usize) {
        self.set(index, CATE_INVALIDED);
    }

    /// Replace every `from` with `to`.
    pub fn replace(&mut self, from: i32, to: i32) {
        for i in 0..self.category.len() {
            if self.category[i] == from {
                self.set(i, to);
            }
        }
    }

    /// Electrodes that can no longer be selected.
    pub fn count_invalided(&self) -> usize {
        self.invalided
    }

    pub fn indices(&self, category: i32) -> Vec<usize> {
        self.indices_where(|c| c == category)
    }

    pub fn indices_where<F>(&self, predicate: F) -> Vec<usize>
    where
        F: Fn(i32) -> bool,
    {
        self.category
            .iter()
            .enumerate()
            .filter(|&(_, &c)| predicate(c))
            .map(|(i, _)| i)
            .collect()
    }

    /// Uniform pick among `candidates`.
    pub fn pick(candidates: &[usize], rng: &mut dyn RngCore) -> Option<usize> {
        candidates.choose(rng).copied()
    }

    /// Electrodes sharing a channel with `index`, `index` included.
    pub fn invalid(&self, index: usize) -> Vec<usize> {
        self.blueprint.invalid_electrodes(index)
    }

    /// Index of the electrode at `(column + dc, row + dr)` on the same shank,
    /// if it exists and its working category is `category`.
    ///
    /// Column offsets wrap forward modulo the column count; offsets that
    /// land before column 0 fall off the probe.
    pub fn neighbor(&self, index: usize, dc: i32, dr: i32, category: i32) -> Option<usize> {
        let e = self.electrode(index);
        let p = self.probe;
        let nc = p.n_column_per_shank() as i64;
        let c = (e.column as i64 + dc as i64) % nc;
        let r = e.row as i64 + dr as i64;

        let x = e.shank as i64 * p.space_per_shank() as i64 + c * p.space_per_column() as i64;
        let y = r * p.space_per_row() as i64;

        let t = self.blueprint.index_of(e.shank, x, y)?;
        (self.category[t] == category).then_some(t)
    }

    /// Try to route electrode `index` into `chmap` without eviction.
    ///
    /// The electrode is invalidated either way; on success every electrode
    /// sharing its channel is invalidated too. Returns whether it was placed.
    pub fn place(&mut self, chmap: &mut ChannelMap, index: usize) -> NpxResult<bool> {
        let electrode = *self.electrode(index);
        let added = match chmap.add_electrode_from(&electrode) {
            Ok(_) => true,
            Err(NpxError::ChannelConflict(_)) => false,
            Err(err) => return Err(err),
        };

        self.invalidate(index);
        if added {
            for j in self.invalid(index) {
                self.invalidate(j);
            }
        }
        Ok(added)
    }
}
