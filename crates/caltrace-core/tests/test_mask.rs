use approx::assert_relative_eq;

use caltrace_core::error::CaltraceError;
use caltrace_core::io::mask::CellMask;
use ndarray::array;

#[test]
fn test_from_labels_counts_cells() {
    let labels = array![[1u32, 1, 0], [0, 2, 0], [0, 2, 0]];
    let mask = CellMask::from_labels(labels).unwrap();
    assert_eq!(mask.cell_count(), 2);
    assert_eq!(mask.width(), 3);
    assert_eq!(mask.height(), 3);
    assert_eq!(mask.cell_pixels(0), &[(0, 0), (0, 1)]);
    assert_eq!(mask.cell_pixels(1), &[(1, 1), (2, 1)]);
}

#[test]
fn test_background_pixels_complement_cells() {
    let labels = array![[1u32, 0], [0, 1]];
    let mask = CellMask::from_labels(labels).unwrap();
    assert_eq!(mask.background_pixels(), vec![(0, 1), (1, 0)]);
}

#[test]
fn test_gap_in_labels_rejected() {
    // Label 2 missing: labels must be contiguous 1..N.
    let labels = array![[1u32, 0], [0, 3]];
    assert!(matches!(
        CellMask::from_labels(labels),
        Err(CaltraceError::InvalidMask(_))
    ));
}

#[test]
fn test_all_background_mask() {
    let labels = array![[0u32, 0], [0, 0]];
    let mask = CellMask::from_labels(labels).unwrap();
    assert_eq!(mask.cell_count(), 0);
    assert!(mask.centroids().is_empty());
}

#[test]
fn test_centroids() {
    // Cell 1 spans (0,0) and (0,1): centroid at x=0.5, y=0.
    let labels = array![[1u32, 1, 0], [0, 0, 0], [0, 0, 2]];
    let mask = CellMask::from_labels(labels).unwrap();
    let centroids = mask.centroids();
    assert_eq!(centroids.len(), 2);

    assert_eq!(centroids[0].cell_id, 0);
    assert_relative_eq!(centroids[0].x, 0.5);
    assert_relative_eq!(centroids[0].y, 0.0);

    assert_eq!(centroids[1].cell_id, 1);
    assert_relative_eq!(centroids[1].x, 2.0);
    assert_relative_eq!(centroids[1].y, 2.0);
}

#[test]
fn test_load_8bit_png() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mask.png");

    let mut img = image::GrayImage::new(3, 2);
    img.put_pixel(0, 0, image::Luma([1u8]));
    img.put_pixel(1, 0, image::Luma([1u8]));
    img.put_pixel(2, 1, image::Luma([2u8]));
    img.save(&path).unwrap();

    let mask = CellMask::load(&path).unwrap();
    assert_eq!(mask.cell_count(), 2);
    assert_eq!(mask.cell_pixels(0), &[(0, 0), (0, 1)]);
    assert_eq!(mask.cell_pixels(1), &[(1, 2)]);
}

#[test]
fn test_load_16bit_png() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mask16.png");

    let mut img = image::ImageBuffer::<image::Luma<u16>, Vec<u16>>::new(2, 2);
    img.put_pixel(0, 0, image::Luma([1u16]));
    img.put_pixel(1, 1, image::Luma([2u16]));
    img.save(&path).unwrap();

    let mask = CellMask::load(&path).unwrap();
    assert_eq!(mask.cell_count(), 2);
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        CellMask::load(&dir.path().join("absent.png")),
        Err(CaltraceError::MissingFile(_))
    ));
}

#[test]
fn test_rgb_mask_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rgb.png");
    image::RgbImage::new(2, 2).save(&path).unwrap();
    assert!(matches!(
        CellMask::load(&path),
        Err(CaltraceError::InvalidMask(_))
    ));
}
