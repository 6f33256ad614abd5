// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Score-based selector.

Every electrode carries a score in `0..=100`, seeded from its category. The
highest-scoring electrodes below 100 are drawn one at a time and promoted to
100; the density pattern of the drawn electrode then raises or lowers the
scores of its neighbors instead of placing or invalidating them.

The final map is built from every electrode scoring 100 in index order.
Electrodes promoted during the loop do not exclude their channel group, so
the build may evict earlier electrodes and leave channels empty. That case is
logged rather than repaired.

The shortfall is large on sparsely annotated blueprints: an all-unset probe
typically ends with only about two thirds of its channels filled. Callers that
need a full map should check [`ChannelMap::is_complete`] or sample with
[`select_best_efficiency`](super::efficiency::select_best_efficiency).
*/

use rand::RngCore;
use tracing::{debug, warn};

use super::pattern::{density_pattern, Role};
use super::toolkit::SelectionToolkit;
use super::{ensure_supported, ElectrodeSelector};
use crate::blueprint::{
    Blueprint, Category, CATE_EXCLUDED, CATE_FULL, CATE_HALF, CATE_LOW, CATE_QUARTER, CATE_SET,
};
use crate::channelmap::ChannelMap;
use crate::error::{NpxError, NpxResult};

pub(crate) const SCORE_SELECTED: i32 = 100;
pub(crate) const SCORE_RAISED: i32 = 95;

/// Initial score of a category code.
pub(crate) const fn initial_score(category: i32) -> i32 {
    match category {
        CATE_SET => 100,
        CATE_FULL => 90,
        CATE_HALF => 80,
        CATE_QUARTER => 70,
        CATE_LOW => 60,
        CATE_EXCLUDED => 0,
        _ => 50,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WeakerSelector;

impl WeakerSelector {
    pub const NAME: &'static str = "weaker";
}

impl ElectrodeSelector for WeakerSelector {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn select(&self, blueprint: &dyn Blueprint, rng: &mut dyn RngCore) -> NpxResult<ChannelMap> {
        ensure_supported(self, blueprint.probe_type())?;

        let tool = SelectionToolkit::new(blueprint);
        let mut scores = Scores {
            score: (0..tool.len()).map(|i| initial_score(tool.category(i))).collect(),
        };

        let preselected = tool.indices(CATE_SET);
        for &i in &preselected {
            for j in tool.invalid(i) {
                scores.score[j] = 0;
            }
            scores.score[i] = SCORE_SELECTED;
        }
        debug!("[SELECT-WEAKER] {} pre-selected", preselected.len());

        let total = blueprint.probe_type().n_channel() as usize;
        while scores.selected() < total {
            let high = scores.high();
            if high <= 0 {
                break;
            }
            let candidates: Vec<usize> = (0..scores.score.len())
                .filter(|&i| (high..SCORE_SELECTED).contains(&scores.score[i]))
                .collect();
            let Some(i) = SelectionToolkit::pick(&candidates, rng) else {
                break;
            };
            scores.update(&tool, i);
        }

        build(&tool, &scores)
    }
}

struct Scores {
    score: Vec<i32>,
}

impl Scores {
    fn selected(&self) -> usize {
        self.score.iter().filter(|&&p| p == SCORE_SELECTED).count()
    }

    /// Highest score below 100.
    fn high(&self) -> i32 {
        self.score
            .iter()
            .copied()
            .filter(|&p| p < SCORE_SELECTED)
            .max()
            .unwrap_or(0)
    }

    fn update(&mut self, tool: &SelectionToolkit<'_>, i: usize) {
        self.score[i] = SCORE_SELECTED;

        let code = tool.category(i);
        let Some(category) = Category::from_code(code) else {
            return;
        };
        for n in density_pattern(category) {
            let Some(t) = tool.neighbor(i, n.column, n.row, code) else {
                continue;
            };
            match n.role {
                Role::Pair | Role::Step => self.raise(t),
                Role::Block => self.lower(t),
                Role::Sweep => {}
            }
        }
    }

    fn raise(&mut self, i: usize) {
        let p = self.score[i];
        if 0 < p && p < SCORE_SELECTED {
            self.score[i] = SCORE_RAISED;
        }
    }

    fn lower(&mut self, i: usize) {
        let p = self.score[i];
        if p < SCORE_SELECTED {
            self.score[i] = p / 2;
        }
    }
}

fn build(tool: &SelectionToolkit<'_>, scores: &Scores) -> NpxResult<ChannelMap> {
    let mut chmap = ChannelMap::new(tool.probe_type());
    let mut evicted = 0usize;
    let mut promoted = 0usize;

    for (i, _) in scores
        .score
        .iter()
        .enumerate()
        .filter(|&(_, &p)| p == SCORE_SELECTED)
    {
        promoted += 1;
        match chmap.add_electrode_from(tool.electrode(i)) {
            Ok(_) => {}
            Err(NpxError::ChannelConflict(conflict)) => {
                conflict.force_add(&mut chmap)?;
                evicted += 1;
            }
            Err(err) => return Err(err),
        }
    }

    if evicted > 0 {
        warn!(
            "[SELECT-WEAKER] {} of {} promoted electrodes evicted by channel conflicts, map holds {}/{}",
            evicted,
            promoted,
            chmap.size(),
            chmap.capacity()
        );
    }
    debug!(
        "[SELECT-WEAKER] finished with {}/{} channels",
        chmap.size(),
        chmap.capacity()
    );
    Ok(chmap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blueprint::ProbeBlueprint;
    use crate::probe_type::NpxProbeType;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn select(bp: &ProbeBlueprint, seed: u64) -> ChannelMap {
        WeakerSelector
            .select(bp, &mut StdRng::seed_from_u64(seed))
            .unwrap()
    }

    #[test]
    fn test_score_table() {
        assert_eq!(initial_score(CATE_SET), 100);
        assert_eq!(initial_score(CATE_FULL), 90);
        assert_eq!(initial_score(CATE_HALF), 80);
        assert_eq!(initial_score(CATE_QUARTER), 70);
        assert_eq!(initial_score(CATE_LOW), 60);
        assert_eq!(initial_score(CATE_EXCLUDED), 0);
        assert_eq!(initial_score(0), 50);
        assert_eq!(initial_score(42), 50);
    }

    #[test]
    fn test_raise_and_lower() {
        let mut scores = Scores {
            score: vec![0, 40, 99, 100, 1],
        };
        for i in 0..5 {
            scores.raise(i);
        }
        assert_eq!(scores.score, vec![0, 95, 95, 100, 95]);

        let mut scores = Scores {
            score: vec![0, 1, 81, 100],
        };
        for i in 0..4 {
            scores.lower(i);
        }
        assert_eq!(scores.score, vec![0, 0, 40, 100]);
    }

    /// Rows 4..16 of shank 0 in `category`, with `overrides` on top; returns
    /// the scores after promoting (0, 0, 10).
    fn scores_around(category: i32, overrides: &[(u32, u32, i32)]) -> (ProbeBlueprint, Vec<i32>) {
        let mut bp = ProbeBlueprint::new(NpxProbeType::Np24);
        for r in 4..16 {
            for c in 0..2 {
                bp.set_category_at(0, c, r, category).unwrap();
            }
        }
        for &(c, r, cate) in overrides {
            bp.set_category_at(0, c, r, cate).unwrap();
        }

        let tool = SelectionToolkit::new(&bp);
        let mut scores = Scores {
            score: (0..tool.len()).map(|i| initial_score(tool.category(i))).collect(),
        };
        scores.update(&tool, bp.index_of_electrode(0, 0, 10).unwrap());
        let score = scores.score;
        (bp, score)
    }

    fn at(bp: &ProbeBlueprint, score: &[i32], column: u32, row: u32) -> i32 {
        score[bp.index_of_electrode(0, column, row).unwrap()]
    }

    #[test]
    fn test_full_density_raises_row_partner() {
        let (bp, score) = scores_around(CATE_FULL, &[]);
        assert_eq!(at(&bp, &score, 0, 10), 100);
        assert_eq!(at(&bp, &score, 1, 10), 95);
        for (c, r) in [(0, 9), (0, 11), (1, 9), (1, 11), (0, 12)] {
            assert_eq!(at(&bp, &score, c, r), 90, "({c},{r})");
        }
    }

    #[test]
    fn test_half_density_lowers_axis_raises_diagonal() {
        let (bp, score) = scores_around(CATE_HALF, &[]);
        assert_eq!(at(&bp, &score, 0, 10), 100);
        for (c, r) in [(1, 10), (0, 9), (0, 11)] {
            assert_eq!(at(&bp, &score, c, r), 40, "({c},{r})");
        }
        for (c, r) in [(1, 9), (1, 11)] {
            assert_eq!(at(&bp, &score, c, r), 95, "({c},{r})");
        }
        for (c, r) in [(0, 8), (0, 12), (1, 8), (1, 12)] {
            assert_eq!(at(&bp, &score, c, r), 80, "({c},{r})");
        }
    }

    #[test]
    fn test_quarter_density_lowers_block_raises_step() {
        let (bp, score) = scores_around(CATE_QUARTER, &[]);
        assert_eq!(at(&bp, &score, 0, 10), 100);
        for (c, r) in [(1, 10), (0, 9), (0, 11), (1, 9), (1, 11), (0, 8), (0, 12)] {
            assert_eq!(at(&bp, &score, c, r), 35, "({c},{r})");
        }
        for (c, r) in [(1, 8), (1, 12)] {
            assert_eq!(at(&bp, &score, c, r), 95, "({c},{r})");
        }
        for (c, r) in [(0, 7), (0, 13), (1, 7), (1, 13)] {
            assert_eq!(at(&bp, &score, c, r), 70, "({c},{r})");
        }
    }

    #[test]
    fn test_score_update_stays_within_category() {
        let (bp, score) = scores_around(
            CATE_QUARTER,
            &[(0, 11, CATE_LOW), (1, 12, CATE_HALF), (0, 12, CATE_FULL)],
        );
        assert_eq!(at(&bp, &score, 0, 11), 60);
        assert_eq!(at(&bp, &score, 1, 12), 80);
        assert_eq!(at(&bp, &score, 0, 12), 90);
        assert_eq!(at(&bp, &score, 0, 9), 35);
        assert_eq!(at(&bp, &score, 1, 8), 95);
    }

    #[test]
    fn test_preselected_kept_and_map_conflict_free() {
        let mut bp = ProbeBlueprint::new(NpxProbeType::Np24);
        bp.set_category_at(0, 0, 0, CATE_SET).unwrap();
        bp.set_category_at(2, 1, 300, CATE_SET).unwrap();
        for r in 0..100 {
            bp.set_category_at(1, 0, r, CATE_FULL).unwrap();
            bp.set_category_at(1, 1, r, CATE_FULL).unwrap();
        }

        let chmap = select(&bp, 9);
        assert!(chmap.get_electrode(0, 0, 0).is_some());
        assert!(chmap.get_electrode(2, 1, 300).is_some());
        assert!(chmap.size() <= chmap.capacity());
        assert!(chmap.validate().is_ok());
    }

    #[test]
    fn test_excluded_scores_zero_never_picked() {
        let mut bp = ProbeBlueprint::new(NpxProbeType::Np0);
        // exclude everything except row 0..10
        bp.set_categories(20..960, CATE_EXCLUDED);
        let chmap = select(&bp, 1);
        assert_eq!(chmap.size(), 20);
        assert!(chmap.electrodes().all(|e| e.row < 10));
    }

    #[test]
    fn test_unset_blueprint_under_fills() {
        let bp = ProbeBlueprint::new(NpxProbeType::Np0);
        let chmap = select(&bp, 0);
        assert!(chmap.size() < chmap.capacity());
        assert!(!chmap.is_complete());
        assert_eq!(chmap.disconnected_channels().len(), chmap.capacity() - chmap.size());
    }

    #[test]
    fn test_seeded_runs_are_identical() {
        let mut bp = ProbeBlueprint::new(NpxProbeType::Np21);
        for r in 0..640 {
            bp.set_category_at(0, 0, r, CATE_HALF).unwrap();
            bp.set_category_at(0, 1, r, CATE_HALF).unwrap();
        }
        assert_eq!(select(&bp, 7), select(&bp, 7));
    }
}
