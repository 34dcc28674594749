mod common;

use caltrace_core::render::{heatmap, save_heatmap};
use common::make_processed;

#[test]
fn test_heatmap_dimensions() {
    let processed = make_processed(&[(0, vec![0.0, 1.0, 0.5]), (1, vec![0.2, 0.0, 0.0])]);
    let img = heatmap(&processed, 4).unwrap();
    assert_eq!(img.width(), 3);
    assert_eq!(img.height(), 8);
}

#[test]
fn test_intensity_scaled_to_global_max() {
    let processed = make_processed(&[(0, vec![0.0, 2.0]), (1, vec![1.0, 0.0])]);
    let img = heatmap(&processed, 1).unwrap();
    assert_eq!(img.get_pixel(1, 0).0[0], 255); // global max
    assert_eq!(img.get_pixel(0, 1).0[0], 127); // half of max, floor
    assert_eq!(img.get_pixel(0, 0).0[0], 0);
}

#[test]
fn test_nonfinite_renders_black() {
    let processed = make_processed(&[(0, vec![f64::INFINITY, 1.0, f64::NAN])]);
    let img = heatmap(&processed, 1).unwrap();
    assert_eq!(img.get_pixel(0, 0).0[0], 0);
    assert_eq!(img.get_pixel(1, 0).0[0], 255);
    assert_eq!(img.get_pixel(2, 0).0[0], 0);
}

#[test]
fn test_all_zero_set_renders_black() {
    let processed = make_processed(&[(0, vec![0.0, 0.0])]);
    let img = heatmap(&processed, 1).unwrap();
    assert!(img.pixels().all(|p| p.0[0] == 0));
}

#[test]
fn test_empty_set_rejected() {
    let processed = make_processed(&[]);
    assert!(heatmap(&processed, 1).is_err());
}

#[test]
fn test_save_writes_png() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("heatmap.png");
    let processed = make_processed(&[(0, vec![0.0, 1.0])]);
    save_heatmap(&processed, 2, &path).unwrap();

    let img = image::open(&path).unwrap();
    assert_eq!(img.width(), 2);
    assert_eq!(img.height(), 2);
}
