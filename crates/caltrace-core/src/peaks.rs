use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::trace::{PeakRecord, ProcessedSet};

/// Peak-detection thresholds.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct PeakParams {
    /// Minimum absolute ∆F/F height of a transient.
    pub min_height: f64,
    /// Minimum prominence: height above the higher of the two surrounding
    /// valleys, independent of absolute height.
    pub min_prominence: f64,
    /// Relative height at which the width is measured: 0.5 = half-prominence
    /// (the conventional full-width-at-half-maximum), 1.0 = at the bases.
    pub rel_height: f64,
}

impl Default for PeakParams {
    fn default() -> Self {
        Self {
            min_height: 0.1,
            min_prominence: 0.1,
            rel_height: 0.5,
        }
    }
}

/// A detected local maximum and its measured properties.
#[derive(Clone, Debug, PartialEq)]
pub struct Peak {
    /// Frame index of the maximum.
    pub index: usize,
    /// Value at the maximum.
    pub height: f64,
    /// Height above the higher surrounding valley.
    pub prominence: f64,
    /// Width at the evaluation height, in frames (fractional).
    pub width: f64,
    /// Interpolated left crossing of the evaluation height.
    pub left_ips: f64,
    /// Interpolated right crossing of the evaluation height.
    pub right_ips: f64,
}

/// Detect transients in a single processed trace.
///
/// Local maxima (plateaus resolved to their midpoint) are filtered by
/// absolute height and prominence, then measured for width at
/// `rel_height` of their prominence via linear interpolation between the
/// neighboring samples. Non-finite samples never qualify as maxima.
pub fn find_peaks(data: &[f64], params: &PeakParams) -> Vec<Peak> {
    if data.len() < 3 {
        return Vec::new();
    }

    let mut candidates = local_maxima(data);
    candidates.retain(|&i| data[i].is_finite() && data[i] >= params.min_height);

    let mut peaks: Vec<Peak> = candidates
        .into_iter()
        .map(|i| measure_peak(data, i, params.rel_height))
        .collect();
    peaks.retain(|p| p.prominence >= params.min_prominence);
    peaks
}

/// Indices of strict local maxima, with flat tops resolved to the plateau
/// midpoint.
fn local_maxima(data: &[f64]) -> Vec<usize> {
    let mut maxima = Vec::new();
    let mut i = 1;
    while i < data.len() - 1 {
        if data[i] > data[i - 1] {
            // Walk any plateau to its right edge.
            let start = i;
            while i + 1 < data.len() && data[i + 1] == data[i] {
                i += 1;
            }
            if i + 1 < data.len() && data[i + 1] < data[i] {
                maxima.push(start + (i - start) / 2);
            }
        }
        i += 1;
    }
    maxima
}

fn measure_peak(data: &[f64], peak_idx: usize, rel_height: f64) -> Peak {
    let height = data[peak_idx];

    // Left valley: lowest sample before a strictly higher peak or the edge.
    let mut left_min = height;
    for i in (0..peak_idx).rev() {
        if data[i] < left_min {
            left_min = data[i];
        }
        if data[i] > height {
            break;
        }
    }

    // Right valley, symmetrically.
    let mut right_min = height;
    for &val in data.iter().skip(peak_idx + 1) {
        if val < right_min {
            right_min = val;
        }
        if val > height {
            break;
        }
    }

    let prominence = height - left_min.max(right_min);

    let eval_height = height - prominence * rel_height;
    let left_ips = crossing_left(data, peak_idx, eval_height);
    let right_ips = crossing_right(data, peak_idx, eval_height);

    Peak {
        index: peak_idx,
        height,
        prominence,
        width: right_ips - left_ips,
        left_ips,
        right_ips,
    }
}

/// Interpolated position where the signal last rose through `threshold`
/// left of the peak.
fn crossing_left(data: &[f64], peak_idx: usize, threshold: f64) -> f64 {
    for i in (1..=peak_idx).rev() {
        if data[i - 1] <= threshold && data[i] > threshold {
            let frac = (threshold - data[i - 1]) / (data[i] - data[i - 1]);
            return (i - 1) as f64 + frac;
        }
    }
    0.0
}

/// Interpolated position where the signal first falls through `threshold`
/// right of the peak.
fn crossing_right(data: &[f64], peak_idx: usize, threshold: f64) -> f64 {
    for i in peak_idx..data.len().saturating_sub(1) {
        if data[i] > threshold && data[i + 1] <= threshold {
            let frac = (data[i] - threshold) / (data[i] - data[i + 1]);
            return i as f64 + frac;
        }
    }
    (data.len() - 1) as f64
}

/// Empirical distributions of peak properties pooled across cells, for
/// cross-condition comparison (boxplot/violin material).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PeakDistributions {
    /// All peak heights, pooled.
    pub heights: Vec<f64>,
    /// All peak widths, pooled.
    pub widths: Vec<f64>,
    /// Peak count per cell, in cell-id order.
    pub counts: Vec<usize>,
    /// Peak count per cell divided by trace length (peaks per frame).
    pub frequencies: Vec<f64>,
}

/// Detect peaks in every cell of a processed set and pool the results.
///
/// Returns the per-peak records (cell_id, frame, height, prominence, width)
/// alongside the four pooled distributions. Cells with zero peaks still
/// contribute a count and a frequency.
pub fn detect_all(processed: &ProcessedSet, params: &PeakParams) -> (Vec<PeakRecord>, PeakDistributions) {
    let traces = processed.traces();
    debug!(cells = traces.len(), "Detecting peaks");

    let per_cell: Vec<(u32, usize, Vec<Peak>)> = traces
        .par_iter()
        .map(|(cell_id, samples)| (*cell_id, samples.len(), find_peaks(samples, params)))
        .collect();

    let mut records = Vec::new();
    let mut dist = PeakDistributions::default();

    for (cell_id, n_frames, peaks) in per_cell {
        dist.counts.push(peaks.len());
        dist.frequencies.push(if n_frames > 0 {
            peaks.len() as f64 / n_frames as f64
        } else {
            0.0
        });
        for p in peaks {
            dist.heights.push(p.height);
            dist.widths.push(p.width);
            records.push(PeakRecord {
                cell_id,
                frame: p.index,
                height: p.height,
                prominence: p.prominence,
                width: p.width,
            });
        }
    }

    (records, dist)
}
