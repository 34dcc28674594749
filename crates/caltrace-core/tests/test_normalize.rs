mod common;

use approx::assert_relative_eq;

use caltrace_core::error::CaltraceError;
use caltrace_core::normalize::{normalize_trace, process_traces, NormalizeParams};
use caltrace_core::trace::{BackgroundTrace, Quantity};
use common::make_traces;

fn params(window_size: usize, smoothing: usize) -> NormalizeParams {
    NormalizeParams {
        quantity: Quantity::Mean,
        subtract_background: false,
        window_size,
        k_percent: 0.5,
        smoothing,
    }
}

#[test]
fn test_trace_equal_to_baseline_yields_zero() {
    // A constant trace is its own lower-rolling baseline, so the clamped
    // ratio is zero everywhere.
    let data = vec![7.0; 30];
    let out = normalize_trace(&data, None, &params(11, 3)).unwrap();
    for v in out {
        assert_relative_eq!(v, 0.0);
    }
}

#[test]
fn test_spike_ratio() {
    // Baseline at the spike is the window minimum 10, so the unsmoothed
    // ratio there is (50 - 10) / 10 = 4.
    let data = vec![10.0, 10.0, 10.0, 50.0, 10.0, 10.0, 10.0];
    let out = normalize_trace(&data, None, &params(3, 1)).unwrap();
    assert_relative_eq!(out[3], 4.0);
    assert_relative_eq!(out[0], 0.0);
    assert_relative_eq!(out[6], 0.0);
}

#[test]
fn test_smoothing_spreads_spike() {
    let data = vec![10.0, 10.0, 10.0, 50.0, 10.0, 10.0, 10.0];
    let out = normalize_trace(&data, None, &params(3, 3)).unwrap();
    // Spike energy spreads over the 3-frame kernel.
    assert_relative_eq!(out[2], 4.0 / 3.0);
    assert_relative_eq!(out[3], 4.0 / 3.0);
    assert_relative_eq!(out[4], 4.0 / 3.0);
    assert_relative_eq!(out[0], 0.0);
}

#[test]
fn test_background_subtraction() {
    // (raw - bg) is constant, so it equals its own baseline: all zero.
    let data = vec![12.0, 13.0, 14.0];
    let bg = vec![2.0, 3.0, 4.0];
    let out = normalize_trace(&data, Some(&bg), &params(3, 1)).unwrap();
    for v in out {
        assert_relative_eq!(v, 0.0);
    }
}

#[test]
fn test_background_length_mismatch() {
    let err = normalize_trace(&[1.0, 2.0], Some(&[1.0]), &params(3, 1)).unwrap_err();
    assert!(matches!(
        err,
        CaltraceError::LengthMismatch {
            trace_len: 2,
            background_len: 1
        }
    ));
}

#[test]
fn test_negative_ratio_clamped() {
    // A dip below the baseline would go negative; it clamps to zero.
    let data = vec![10.0, 10.0, 2.0, 10.0, 10.0];
    let out = normalize_trace(&data, None, &params(3, 1)).unwrap();
    for v in out {
        assert!(v >= 0.0);
    }
}

#[test]
fn test_zero_baseline_propagates_nonfinite() {
    // An all-zero window makes the baseline zero; the ratio is not guarded
    // and propagates as non-finite rather than failing.
    let data = vec![0.0, 0.0, 5.0, 0.0, 0.0];
    let out = normalize_trace(&data, None, &params(3, 1)).unwrap();
    assert!(!out[2].is_finite());
}

#[test]
fn test_process_traces_per_cell_independence() {
    let traces = make_traces(&[
        (0, vec![10.0, 10.0, 10.0, 50.0, 10.0, 10.0, 10.0]),
        (1, vec![7.0; 7]),
    ]);
    let p = params(3, 1);
    let processed = process_traces(&traces, None, &p).unwrap();

    let cell0 = processed.cell_trace(0);
    assert_relative_eq!(cell0[3], 4.0);
    for v in processed.cell_trace(1) {
        assert_relative_eq!(v, 0.0);
    }
}

#[test]
fn test_process_traces_requires_background_when_subtracting() {
    let traces = make_traces(&[(0, vec![1.0, 2.0, 3.0])]);
    let p = NormalizeParams {
        subtract_background: true,
        ..params(3, 1)
    };
    assert!(process_traces(&traces, None, &p).is_err());

    let bg = BackgroundTrace::from_values(vec![0.5, 0.5, 0.5]);
    assert!(process_traces(&traces, Some(&bg), &p).is_ok());
}

#[test]
fn test_default_params_match_original_tooling() {
    let p = NormalizeParams::default();
    assert_eq!(p.window_size, 11);
    assert_relative_eq!(p.k_percent, 0.5);
    assert_eq!(p.smoothing, 3);
    assert_eq!(p.quantity, Quantity::Top10);
    assert!(p.subtract_background);
}
