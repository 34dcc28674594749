mod common;

use std::io::Write;

use approx::assert_relative_eq;
use ndarray::array;
use tempfile::NamedTempFile;

use caltrace_core::error::CaltraceError;
use caltrace_core::extract::{default_mask_path, extract_traces, validate_paths};
use caltrace_core::io::mask::CellMask;
use caltrace_core::io::ser::SerReader;
use caltrace_core::trace::Quantity;
use common::build_synthetic_ser;

/// 3x3 recording: cell 1 covers (0,0) and (0,1), cell 2 covers (2,2),
/// everything else is background.
fn test_mask() -> CellMask {
    let labels = array![[1u32, 1, 0], [0, 0, 0], [0, 0, 2]];
    CellMask::from_labels(labels).unwrap()
}

fn open_reader(frames: &[Vec<u8>]) -> (NamedTempFile, SerReader) {
    let ser_data = build_synthetic_ser(3, 3, 8, frames);
    let mut tmpfile = NamedTempFile::new().unwrap();
    tmpfile.write_all(&ser_data).unwrap();
    let reader = SerReader::open(tmpfile.path()).unwrap();
    (tmpfile, reader)
}

#[test]
fn test_aggregates_per_cell_per_frame() {
    // Frame 0: cell 1 pixels 10 and 20, cell 2 pixel 40, background 0.
    // Frame 1: everything doubled.
    let frame0 = vec![10u8, 20, 0, 0, 0, 0, 0, 0, 40];
    let frame1: Vec<u8> = frame0.iter().map(|v| v * 2).collect();
    let (_tmp, reader) = open_reader(&[frame0, frame1]);

    let out = extract_traces(&reader, &test_mask(), None).unwrap();

    let mean0 = out.traces.cell_values(0, Quantity::Mean);
    assert_relative_eq!(mean0[0], 15.0 / 255.0, epsilon = 1e-6);
    assert_relative_eq!(mean0[1], 30.0 / 255.0, epsilon = 1e-6);

    let max0 = out.traces.cell_values(0, Quantity::Max);
    assert_relative_eq!(max0[0], 20.0 / 255.0, epsilon = 1e-6);

    // Two pixels: top-10% count clamps to 1, the brightest pixel.
    let top0 = out.traces.cell_values(0, Quantity::Top10);
    assert_relative_eq!(top0[0], 20.0 / 255.0, epsilon = 1e-6);

    // Single-pixel cell: all three aggregates coincide.
    let mean1 = out.traces.cell_values(1, Quantity::Mean);
    assert_relative_eq!(mean1[0], 40.0 / 255.0, epsilon = 1e-6);
    assert_relative_eq!(mean1[1], 80.0 / 255.0, epsilon = 1e-6);
}

#[test]
fn test_background_trace() {
    // Background pixels all 6 -> mean 6/255 in frame 0, 12/255 in frame 1.
    let frame0 = vec![10u8, 20, 6, 6, 6, 6, 6, 6, 40];
    let frame1: Vec<u8> = frame0.iter().map(|v| v * 2).collect();
    let (_tmp, reader) = open_reader(&[frame0, frame1]);

    let out = extract_traces(&reader, &test_mask(), None).unwrap();
    assert_eq!(out.background.len(), 2);
    assert_relative_eq!(out.background.values()[0], 6.0 / 255.0, epsilon = 1e-6);
    assert_relative_eq!(out.background.values()[1], 12.0 / 255.0, epsilon = 1e-6);
}

#[test]
fn test_positions_are_mask_centroids() {
    let (_tmp, reader) = open_reader(&[vec![0u8; 9]]);
    let out = extract_traces(&reader, &test_mask(), None).unwrap();

    assert_eq!(out.positions.len(), 2);
    assert_relative_eq!(out.positions[0].x, 0.5);
    assert_relative_eq!(out.positions[0].y, 0.0);
    assert_relative_eq!(out.positions[1].x, 2.0);
    assert_relative_eq!(out.positions[1].y, 2.0);
}

#[test]
fn test_dimension_mismatch_rejected() {
    let (_tmp, reader) = open_reader(&[vec![0u8; 9]]);
    let mask = CellMask::from_labels(array![[1u32, 0], [0, 0]]).unwrap();
    assert!(matches!(
        extract_traces(&reader, &mask, None),
        Err(CaltraceError::DimensionMismatch { .. })
    ));
}

#[test]
fn test_progress_reports_all_frames() {
    let frames: Vec<Vec<u8>> = (0..7).map(|_| vec![0u8; 9]).collect();
    let (_tmp, reader) = open_reader(&frames);

    let last = std::sync::atomic::AtomicUsize::new(0);
    extract_traces(
        &reader,
        &test_mask(),
        Some(&|done| last.store(done, std::sync::atomic::Ordering::SeqCst)),
    )
    .unwrap();
    assert_eq!(last.load(std::sync::atomic::Ordering::SeqCst), 7);
}

#[test]
fn test_validate_paths() {
    let dir = tempfile::tempdir().unwrap();
    let video = dir.path().join("rec.ser");
    let mask = dir.path().join("rec_cp_masks.png");
    let out = dir.path().join("rec.csv");

    // Video missing.
    assert!(matches!(
        validate_paths(&video, &mask, &out, false),
        Err(CaltraceError::MissingFile(_))
    ));
    std::fs::write(&video, b"x").unwrap();

    // Mask missing.
    assert!(matches!(
        validate_paths(&video, &mask, &out, false),
        Err(CaltraceError::MissingFile(_))
    ));
    std::fs::write(&mask, b"x").unwrap();

    assert!(validate_paths(&video, &mask, &out, false).is_ok());

    // Wrong extensions.
    assert!(matches!(
        validate_paths(&dir.path().join("rec.avi"), &mask, &out, false),
        Err(CaltraceError::WrongExtension { .. })
    ));
    assert!(matches!(
        validate_paths(&video, &mask, &dir.path().join("out.txt"), false),
        Err(CaltraceError::WrongExtension { .. })
    ));

    // Existing output requires overwrite.
    std::fs::write(&out, b"x").unwrap();
    assert!(matches!(
        validate_paths(&video, &mask, &out, false),
        Err(CaltraceError::OutputExists(_))
    ));
    assert!(validate_paths(&video, &mask, &out, true).is_ok());
}

#[test]
fn test_default_mask_path() {
    let video = std::path::Path::new("/data/exp1/GPN1_001.ser");
    assert_eq!(
        default_mask_path(video),
        std::path::Path::new("/data/exp1/GPN1_001_cp_masks.png")
    );
}
