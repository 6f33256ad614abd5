// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Smoothed electrode density along each shank.

use ndarray::{Array1, Array2};

use crate::channelmap::ChannelMap;
use crate::error::{NpxError, NpxResult};

/// Normalized Gaussian kernel of `2 * floor(3 * std) + 1` taps.
fn smooth_kernel(std: f64) -> Array1<f64> {
    if std == 0.0 {
        return Array1::from(vec![1.0]);
    }
    let n = (3.0 * std).floor() as i64;
    let var = 2.0 * std * std;
    let kernel = Array1::from_iter((-n..=n).map(|i| (-((i * i) as f64) / var).exp()));
    let sum = kernel.sum();
    kernel / sum
}

/// Same-size convolution with a centered, odd-sized kernel.
fn convolve(array: &Array1<f64>, kernel: &Array1<f64>) -> Array1<f64> {
    let m = array.len() as i64;
    let half = (kernel.len() / 2) as i64;
    Array1::from_iter((0..m).map(|i| {
        kernel
            .iter()
            .enumerate()
            .filter_map(|(j, &k)| {
                let p = i + j as i64 - half;
                (0..m).contains(&p).then(|| array[p as usize] * k)
            })
            .sum::<f64>()
    }))
}

/// Electrode density per shank, sampled every `dy` um and smoothed with a
/// Gaussian of standard deviation `smooth` um.
///
/// Returns an `n_shank x (n_row * floor(space_per_row / dy))` array.
pub fn electrode_density(chmap: &ChannelMap, dy: f64, smooth: f64) -> NpxResult<Array2<f64>> {
    if !(dy > 0.0) || !(smooth >= 0.0) {
        return Err(NpxError::InvalidGeometry(format!(
            "bad density sampling: dy={} smooth={}",
            dy, smooth
        )));
    }

    let probe = chmap.probe_type();
    let npr = (probe.space_per_row() as f64 / dy) as usize;
    let nr = npr * probe.n_row_per_shank() as usize;
    let kernel = smooth_kernel(smooth / dy);

    let mut ret = Array2::zeros((probe.n_shank() as usize, nr));
    for shank in 0..probe.n_shank() {
        let mut count = Array1::<f64>::zeros(nr);
        for e in chmap.electrodes().filter(|e| e.shank == shank) {
            let i = e.row as usize * npr;
            if i < nr {
                count[i] += 1.0;
            }
        }
        ret.row_mut(shank as usize).assign(&convolve(&count, &kernel));
    }
    Ok(ret)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets;

    #[test]
    fn test_kernel_is_normalized() {
        let k = smooth_kernel(2.0);
        assert_eq!(k.len(), 13);
        assert!((k.sum() - 1.0).abs() < 1e-12);
        assert_eq!(k[0], k[12]);
        assert!(k[6] > k[5]);
        assert_eq!(smooth_kernel(0.0).to_vec(), vec![1.0]);
    }

    #[test]
    fn test_unsmoothed_density_counts_rows() {
        let chmap = presets::single_shank(1, 0).unwrap();
        let density = electrode_density(&chmap, 15.0, 0.0).unwrap();
        assert_eq!(density.dim(), (4, 640));
        assert_eq!(density[[1, 0]], 2.0);
        assert_eq!(density[[1, 191]], 2.0);
        assert_eq!(density[[1, 192]], 0.0);
        assert_eq!(density.row(0).sum(), 0.0);
    }

    #[test]
    fn test_smoothing_keeps_mass() {
        let chmap = presets::single_shank(0, 200).unwrap();
        let density = electrode_density(&chmap, 5.0, 30.0).unwrap();
        assert_eq!(density.dim(), (4, 1920));
        assert!((density.row(0).sum() - 384.0).abs() < 1e-6);
    }

    #[test]
    fn test_bad_sampling_rejected() {
        let chmap = ChannelMap::new(crate::probe_type::NpxProbeType::Np0);
        assert!(electrode_density(&chmap, 0.0, 1.0).is_err());
        assert!(electrode_density(&chmap, 1.0, -1.0).is_err());
    }
}
