// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Deterministic-greedy selector.

Tiers are visited in the order full, half, quarter, low, unset; the next
electrode is drawn uniformly from the highest non-empty tier. Placing a
density electrode applies its pattern:

- full: place the row partner, sweep along the rows
- half: invalidate the axis neighbors, step along the diagonals
- quarter: invalidate the ten closest neighbors, step to `(+-1, +-2)`

Pattern propagation only follows neighbors that still carry the category
the chosen electrode had when it was picked.
*/

use rand::RngCore;
use tracing::{debug, trace};

use super::pattern::{density_pattern, Role};
use super::toolkit::{SelectionToolkit, CATE_INVALIDED};
use super::{ensure_supported, ElectrodeSelector};
use crate::blueprint::{
    Blueprint, Category, CATE_EXCLUDED, CATE_FULL, CATE_HALF, CATE_LOW, CATE_QUARTER, CATE_SET,
    CATE_UNSET,
};
use crate::channelmap::ChannelMap;
use crate::error::NpxResult;

const TIERS: [i32; 5] = [CATE_FULL, CATE_HALF, CATE_QUARTER, CATE_LOW, CATE_UNSET];

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSelector;

impl DefaultSelector {
    pub const NAME: &'static str = "default";
}

impl ElectrodeSelector for DefaultSelector {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn select(&self, blueprint: &dyn Blueprint, rng: &mut dyn RngCore) -> NpxResult<ChannelMap> {
        ensure_supported(self, blueprint.probe_type())?;

        let mut run = Run {
            tool: SelectionToolkit::new(blueprint),
            chmap: ChannelMap::new(blueprint.probe_type()),
        };

        let preselected = run.tool.indices(CATE_SET);
        for &i in &preselected {
            run.tool.place(&mut run.chmap, i)?;
        }
        run.tool.replace(CATE_EXCLUDED, CATE_INVALIDED);
        debug!(
            "[SELECT-DEFAULT] {} pre-selected, {} placed",
            preselected.len(),
            run.chmap.size()
        );

        while run.tool.count_invalided() < run.tool.len() {
            match run.pick(rng) {
                Some(i) => run.update(i)?,
                None => break,
            }
        }

        debug!(
            "[SELECT-DEFAULT] finished with {}/{} channels",
            run.chmap.size(),
            run.chmap.capacity()
        );
        Ok(run.chmap)
    }
}

struct Run<'a> {
    tool: SelectionToolkit<'a>,
    chmap: ChannelMap,
}

impl Run<'_> {
    fn pick(&self, rng: &mut dyn RngCore) -> Option<usize> {
        TIERS.iter().find_map(|&tier| {
            let candidates = self.tool.indices(tier);
            SelectionToolkit::pick(&candidates, rng)
        })
    }

    fn update(&mut self, i: usize) -> NpxResult<()> {
        let code = self.tool.category(i);
        match Category::from_code(code) {
            Some(category) if category.is_density() => self.propagate(i, category),
            _ => self.tool.place(&mut self.chmap, i).map(|_| ()),
        }
    }

    /// Place `start` and spread its density pattern depth-first.
    fn propagate(&mut self, start: usize, category: Category) -> NpxResult<()> {
        let code = category.code();
        let pattern = density_pattern(category);
        let mut stack = vec![start];
        let mut next = Vec::new();

        while let Some(e) = stack.pop() {
            if self.tool.category(e) != code {
                continue;
            }
            self.tool.place(&mut self.chmap, e)?;
            trace!("[SELECT-DEFAULT] {:?} {}", category, self.tool.electrode(e));

            for n in pattern {
                let Some(t) = self.tool.neighbor(e, n.column, n.row, code) else {
                    continue;
                };
                match n.role {
                    Role::Pair => {
                        self.tool.place(&mut self.chmap, t)?;
                    }
                    Role::Block => self.tool.invalidate(t),
                    Role::Sweep | Role::Step => next.push(t),
                }
            }
            stack.extend(next.drain(..).rev());
        }
        Ok(())
    }
}
