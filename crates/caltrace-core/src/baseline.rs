use crate::error::{CaltraceError, Result};

/// Rolling lower-k baseline estimator.
///
/// For each sample, takes the window of `window_size` samples centered on it
/// (truncated, not wrapped, at the sequence boundaries) and averages the
/// `k = floor(window_size * k_percent)` smallest values in that window.
///
/// Averaging the lowest k instead of taking the window minimum or the full
/// mean keeps the baseline robust to upward transients while still tracking
/// slow drift, without the noise sensitivity of a single minimum. Used as
/// the denominator of the ∆F/F normalization.
///
/// Near the boundaries the truncated window can hold fewer than `k` samples;
/// `k` is clamped to the window's actual length (and to a minimum of 1) so
/// the estimator stays total.
///
/// `window_size` must be odd and >= 1; `k_percent` must lie in (0, 1].
pub fn lower_rolling_mean(data: &[f64], window_size: usize, k_percent: f64) -> Result<Vec<f64>> {
    if window_size < 1 || window_size % 2 == 0 {
        return Err(CaltraceError::InvalidWindow(window_size));
    }
    if !(k_percent > 0.0 && k_percent <= 1.0) {
        return Err(CaltraceError::InvalidParam(format!(
            "k_percent must be in (0, 1], got {k_percent}"
        )));
    }

    let n = data.len();
    let nominal_k = ((window_size as f64) * k_percent).floor() as usize;
    let half = (window_size - 1) / 2;

    let mut baseline = vec![0.0f64; n];
    let mut window = Vec::with_capacity(window_size);

    for (i, out) in baseline.iter_mut().enumerate() {
        let lower = i.saturating_sub(half);
        let upper = (i + half + 1).min(n);

        window.clear();
        window.extend_from_slice(&data[lower..upper]);

        let k = nominal_k.clamp(1, window.len());
        // Selection, not a full sort: only the k-th boundary is ordered.
        window.select_nth_unstable_by(k - 1, |a, b| a.total_cmp(b));

        *out = window[..k].iter().sum::<f64>() / k as f64;
    }

    Ok(baseline)
}
