use crate::error::{CaltraceError, Result};

/// Moving-average smoothing with edge padding.
///
/// The input is padded by repeating the first and last samples `window_size
/// / 2` times on each side, then convolved with an unweighted kernel, so the
/// output length always equals the input length. `window_size = 1` is the
/// identity.
pub fn smooth(data: &[f64], window_size: usize) -> Result<Vec<f64>> {
    if window_size < 1 {
        return Err(CaltraceError::InvalidParam(
            "smoothing window must be >= 1".into(),
        ));
    }
    if data.is_empty() || window_size == 1 {
        return Ok(data.to_vec());
    }

    let pad = window_size / 2;
    let mut padded = Vec::with_capacity(data.len() + 2 * pad);
    padded.extend(std::iter::repeat(data[0]).take(pad));
    padded.extend_from_slice(data);
    padded.extend(std::iter::repeat(data[data.len() - 1]).take(pad));

    // Even windows pad one short of a full kernel span; keep the output
    // aligned with the input by emitting exactly data.len() samples.
    let scale = 1.0 / window_size as f64;
    let out = padded
        .windows(window_size)
        .take(data.len())
        .map(|w| w.iter().sum::<f64>() * scale)
        .collect();

    Ok(out)
}
