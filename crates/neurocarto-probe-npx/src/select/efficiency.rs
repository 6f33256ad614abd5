// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Selection quality metrics and repeated sampling.

The *request* of a blueprint is the number of channels its density
annotations ask for: one per pre-selected or full-density electrode, a half
per half-density and a quarter per quarter-density electrode.

Given a channel map, the *area efficiency* is the number of selected
annotated electrodes over the request and the *channel completeness* folds it
into `0..=1` (`min(a, 1/a)`). Channels that are empty or hold an excluded
electrode are wasted; the overall efficiency scales completeness by the
fraction of channels not wasted.

Sampling functions run a selector many times, each run with its own
generator derived from `seed + sample`, so results do not depend on whether
runs execute in parallel.
*/

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ElectrodeSelector;
use crate::blueprint::{Blueprint, CATE_EXCLUDED, CATE_FULL, CATE_HALF, CATE_QUARTER, CATE_SET};
use crate::channelmap::ChannelMap;
use crate::error::NpxResult;
use crate::transform::position;

/// Channels requested by the blueprint's annotations.
pub fn request_electrode(blueprint: &dyn Blueprint) -> f64 {
    let s1 = blueprint.count_category(CATE_SET) + blueprint.count_category(CATE_FULL);
    let s2 = blueprint.count_category(CATE_HALF);
    let s4 = blueprint.count_category(CATE_QUARTER);
    s1 as f64 + s2 as f64 / 2.0 + s4 as f64 / 4.0
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Efficiency {
    /// Selected annotated electrodes over the request.
    pub area: f64,
    /// `min(area, 1 / area)`, zero when nothing was requested.
    pub channel_complete: f64,
    /// Empty channels plus channels holding excluded electrodes.
    pub wasted: usize,
    pub total: usize,
}

impl Efficiency {
    pub fn wasted_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.wasted as f64 / self.total as f64
    }

    pub fn efficiency(&self) -> f64 {
        self.channel_complete * (1.0 - self.wasted_rate())
    }
}

/// Score `chmap` against the annotations in `blueprint`.
pub fn channel_efficiency(blueprint: &dyn Blueprint, chmap: &ChannelMap) -> Efficiency {
    let request = request_electrode(blueprint);
    let total = chmap.capacity();
    let unused = total - chmap.size();

    let probe = chmap.probe_type();
    let mut channel = 0usize;
    let mut excluded = 0usize;
    for e in chmap.electrodes() {
        let p = position(probe, e.shank, e.column, e.row);
        let Some(i) = blueprint.index_of(e.shank, p.x as i64, p.y as i64) else {
            continue;
        };
        match blueprint.category(i) {
            CATE_SET | CATE_FULL | CATE_HALF | CATE_QUARTER => channel += 1,
            CATE_EXCLUDED => excluded += 1,
            _ => {}
        }
    }

    let area = if request == 0.0 {
        0.0
    } else {
        (channel as f64 / request).max(0.0)
    };
    let channel_complete = if area == 0.0 { 0.0 } else { area.min(1.0 / area) };
    Efficiency {
        area,
        channel_complete,
        wasted: excluded + unused,
        total,
    }
}

/// One selector run kept by [`select_best_efficiency`].
#[derive(Debug, Clone)]
pub struct SampledSelection {
    pub sample: usize,
    pub chmap: ChannelMap,
    pub efficiency: Efficiency,
}

/// Per-electrode selection frequency over repeated runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityResult {
    pub samples: usize,
    /// Times each blueprint electrode was selected, by blueprint index.
    pub summation: Vec<u32>,
    /// Runs that filled every channel.
    pub complete: usize,
    /// Efficiency of every run.
    pub efficiency: Vec<f64>,
}

impl ProbabilityResult {
    pub fn probability(&self) -> Vec<f64> {
        self.summation
            .iter()
            .map(|&s| s as f64 / self.samples.max(1) as f64)
            .collect()
    }

    pub fn complete_rate(&self) -> f64 {
        self.complete as f64 / self.samples.max(1) as f64
    }

    pub fn max_efficiency(&self) -> f64 {
        self.efficiency.iter().copied().fold(0.0, f64::max)
    }

    pub fn mean_efficiency(&self) -> f64 {
        self.efficiency.iter().sum::<f64>() / self.samples.max(1) as f64
    }

    pub fn var_efficiency(&self) -> f64 {
        let mean = self.mean_efficiency();
        self.efficiency
            .iter()
            .map(|e| (e - mean).powi(2))
            .sum::<f64>()
            / self.samples.max(1) as f64
    }
}

fn sample_rng(seed: u64, sample: usize) -> StdRng {
    StdRng::seed_from_u64(seed.wrapping_add(sample as u64))
}

/// Run `f` for every sample index, in parallel when enabled.
fn run_samples<T, F>(samples: usize, parallel: bool, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize) -> T + Send + Sync,
{
    #[cfg(feature = "parallel")]
    {
        if parallel {
            use rayon::prelude::*;
            return (0..samples).into_par_iter().map(f).collect();
        }
    }
    #[cfg(not(feature = "parallel"))]
    let _ = parallel;

    (0..samples).map(f).collect()
}

/// Run `selector` `samples` times and keep the complete map with the
/// highest efficiency. Ties go to the lowest sample index.
///
/// Returns `None` when no run filled every channel.
pub fn select_best_efficiency(
    selector: &dyn ElectrodeSelector,
    blueprint: &dyn Blueprint,
    samples: usize,
    seed: u64,
    parallel: bool,
) -> NpxResult<Option<SampledSelection>> {
    let runs = run_samples(samples, parallel, |sample| -> NpxResult<SampledSelection> {
        let chmap = selector.select(blueprint, &mut sample_rng(seed, sample))?;
        let efficiency = channel_efficiency(blueprint, &chmap);
        Ok(SampledSelection {
            sample,
            chmap,
            efficiency,
        })
    });

    let mut best: Option<SampledSelection> = None;
    let mut complete = 0usize;
    for run in runs {
        let run = run?;
        if !run.chmap.is_complete() {
            continue;
        }
        complete += 1;
        let better = best
            .as_ref()
            .map_or(true, |b| run.efficiency.efficiency() > b.efficiency.efficiency());
        if better {
            best = Some(run);
        }
    }

    debug!(
        "[SELECT-SAMPLE] {} runs of '{}', {} complete, best sample {:?}",
        samples,
        selector.name(),
        complete,
        best.as_ref().map(|b| b.sample)
    );
    Ok(best)
}

/// Run `selector` `samples` times and count how often each electrode is chosen.
pub fn electrode_probability(
    selector: &dyn ElectrodeSelector,
    blueprint: &dyn Blueprint,
    samples: usize,
    seed: u64,
    parallel: bool,
) -> NpxResult<ProbabilityResult> {
    let probe = blueprint.probe_type();
    let runs = run_samples(samples, parallel, |sample| -> NpxResult<_> {
        let chmap = selector.select(blueprint, &mut sample_rng(seed, sample))?;
        let index: Vec<usize> = chmap
            .electrodes()
            .filter_map(|e| {
                let p = position(probe, e.shank, e.column, e.row);
                blueprint.index_of(e.shank, p.x as i64, p.y as i64)
            })
            .collect();
        let efficiency = channel_efficiency(blueprint, &chmap).efficiency();
        Ok((index, chmap.is_complete(), efficiency))
    });

    let mut ret = ProbabilityResult {
        samples,
        summation: vec![0; blueprint.len()],
        complete: 0,
        efficiency: Vec::with_capacity(samples),
    };
    for run in runs {
        let (index, complete, efficiency) = run?;
        for i in index {
            ret.summation[i] += 1;
        }
        if complete {
            ret.complete += 1;
        }
        ret.efficiency.push(efficiency);
    }
    Ok(ret)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blueprint::ProbeBlueprint;
    use crate::probe_type::NpxProbeType;
    use crate::select::{DefaultSelector, WeakerSelector};

    #[test]
    fn test_request_electrode() {
        let mut bp = ProbeBlueprint::new(NpxProbeType::Np24);
        bp.set_categories(0..10, CATE_SET);
        bp.set_categories(10..20, CATE_FULL);
        bp.set_categories(20..30, CATE_HALF);
        bp.set_categories(30..42, CATE_QUARTER);
        assert_eq!(request_electrode(&bp), 10.0 + 10.0 + 5.0 + 3.0);
    }

    #[test]
    fn test_efficiency_of_exact_fill() {
        // 384 full-density electrodes on NP0 bank 0, selected exactly
        let mut bp = ProbeBlueprint::new(NpxProbeType::Np0);
        bp.set_categories(0..384, CATE_FULL);
        let mut chmap = ChannelMap::new(NpxProbeType::Np0);
        for i in 0..384 {
            chmap.add_electrode_index(0, i).unwrap();
        }
        let eff = channel_efficiency(&bp, &chmap);
        assert_eq!(eff.area, 1.0);
        assert_eq!(eff.channel_complete, 1.0);
        assert_eq!(eff.wasted, 0);
        assert_eq!(eff.efficiency(), 1.0);
    }

    #[test]
    fn test_efficiency_counts_waste() {
        let mut bp = ProbeBlueprint::new(NpxProbeType::Np0);
        bp.set_categories(0..192, CATE_FULL);
        bp.set_categories(192..202, CATE_EXCLUDED);
        let mut chmap = ChannelMap::new(NpxProbeType::Np0);
        for i in 0..202 {
            chmap.add_electrode_index(0, i).unwrap();
        }
        let eff = channel_efficiency(&bp, &chmap);
        assert_eq!(eff.area, 1.0);
        assert_eq!(eff.wasted, 10 + (384 - 202));
        assert_eq!(eff.total, 384);
    }

    #[test]
    fn test_empty_request() {
        let bp = ProbeBlueprint::new(NpxProbeType::Np21);
        let chmap = ChannelMap::new(NpxProbeType::Np21);
        let eff = channel_efficiency(&bp, &chmap);
        assert_eq!(eff.area, 0.0);
        assert_eq!(eff.efficiency(), 0.0);
    }

    #[test]
    fn test_best_of_samples_is_reproducible() {
        let mut bp = ProbeBlueprint::new(NpxProbeType::Np24);
        bp.set_categories(0..1280, CATE_HALF);

        let a = select_best_efficiency(&DefaultSelector, &bp, 4, 100, true).unwrap();
        let b = select_best_efficiency(&DefaultSelector, &bp, 4, 100, false).unwrap();
        let (a, b) = (a.unwrap(), b.unwrap());
        assert_eq!(a.sample, b.sample);
        assert_eq!(a.chmap, b.chmap);
        assert!(a.chmap.is_complete());
    }

    #[test]
    fn test_electrode_probability() {
        let mut bp = ProbeBlueprint::new(NpxProbeType::Np0);
        bp.set_categories(0..2, CATE_SET);
        let result = electrode_probability(&WeakerSelector, &bp, 5, 0, true).unwrap();
        assert_eq!(result.samples, 5);
        assert_eq!(result.summation[0], 5);
        assert_eq!(result.summation[1], 5);
        assert_eq!(result.efficiency.len(), 5);
        assert_eq!(result.probability()[0], 1.0);
        assert!(result.var_efficiency() >= 0.0);
    }
}
