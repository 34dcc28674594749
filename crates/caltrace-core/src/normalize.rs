use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::baseline::lower_rolling_mean;
use crate::error::{CaltraceError, Result};
use crate::smooth::smooth;
use crate::trace::{BackgroundTrace, ProcessedRecord, ProcessedSet, Quantity, TraceSet};

/// Parameters of the ∆F/F normalization.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct NormalizeParams {
    /// Which per-frame aggregate to normalize.
    pub quantity: Quantity,
    /// Subtract the frame-aligned background trace before baselining.
    pub subtract_background: bool,
    /// Rolling window of the baseline estimator. Odd, >= 1.
    pub window_size: usize,
    /// Fraction of lowest window values averaged into the baseline.
    pub k_percent: f64,
    /// Moving-average window applied after normalization.
    pub smoothing: usize,
}

impl Default for NormalizeParams {
    fn default() -> Self {
        Self {
            quantity: Quantity::Top10,
            subtract_background: true,
            window_size: 11,
            k_percent: 0.5,
            smoothing: 3,
        }
    }
}

/// Normalize a single trace: optional background subtraction, rolling
/// lower-k baseline, `(raw - baseline) / baseline` clamped at zero from
/// below, then moving-average smoothing.
///
/// A zero baseline sample propagates a non-finite ratio rather than failing;
/// downstream consumers (peak detection, heatmap rendering) treat non-finite
/// samples as no-signal.
pub fn normalize_trace(
    values: &[f64],
    background: Option<&[f64]>,
    params: &NormalizeParams,
) -> Result<Vec<f64>> {
    let mut data = values.to_vec();

    if let Some(bg) = background {
        if bg.len() != data.len() {
            return Err(CaltraceError::LengthMismatch {
                trace_len: data.len(),
                background_len: bg.len(),
            });
        }
        for (v, b) in data.iter_mut().zip(bg) {
            *v -= b;
        }
    }

    let baseline = lower_rolling_mean(&data, params.window_size, params.k_percent)?;

    // Ratio can dip below zero where the baseline overshoots near the
    // boundaries; clamp from below only.
    let normed: Vec<f64> = data
        .iter()
        .zip(&baseline)
        .map(|(v, b)| ((v - b) / b).max(0.0))
        .collect();

    smooth(&normed, params.smoothing)
}

/// Normalize every cell of a trace set.
///
/// Cells are independent, so they are processed in parallel; the output is
/// re-sorted into (cell_id, frame) order regardless of completion order.
pub fn process_traces(
    traces: &TraceSet,
    background: Option<&BackgroundTrace>,
    params: &NormalizeParams,
) -> Result<ProcessedSet> {
    if params.subtract_background && background.is_none() {
        return Err(CaltraceError::InvalidParam(
            "background subtraction requested but no background trace given".into(),
        ));
    }

    let bg = if params.subtract_background {
        background.map(|b| b.values())
    } else {
        None
    };

    let cell_ids = traces.cell_ids();
    debug!(cells = cell_ids.len(), quantity = %params.quantity, "Normalizing traces");

    let records: Vec<Vec<ProcessedRecord>> = cell_ids
        .par_iter()
        .map(|&cell_id| {
            let values = traces.cell_values(cell_id, params.quantity);
            let processed = normalize_trace(&values, bg, params)?;
            let rows = traces
                .cell_records(cell_id)
                .into_iter()
                .zip(processed)
                .map(|(r, p)| ProcessedRecord {
                    cell_id: r.cell_id,
                    frame: r.frame,
                    mean: r.mean,
                    max: r.max,
                    top10: r.top10,
                    processed: p,
                })
                .collect();
            Ok(rows)
        })
        .collect::<Result<_>>()?;

    ProcessedSet::from_records(records.into_iter().flatten().collect())
}
