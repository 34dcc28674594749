//! Labeled cell-mask ingestion.
//!
//! A mask is an integer-labeled grayscale image (Cellpose convention):
//! pixel value 0 is background, values 1..N identify the N cell regions.

use std::path::Path;

use image::DynamicImage;
use ndarray::Array2;

use crate::error::{CaltraceError, Result};
use crate::trace::PositionRecord;

/// Labeled segmentation mask for one recording.
#[derive(Clone, Debug)]
pub struct CellMask {
    /// Label per pixel, shape = (height, width).
    pub labels: Array2<u32>,
    /// Highest label = number of cells.
    cell_count: u32,
    /// Per-cell pixel coordinates, indexed by label - 1.
    pixels: Vec<Vec<(usize, usize)>>,
}

impl CellMask {
    /// Load a mask from an 8- or 16-bit grayscale PNG/TIFF.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CaltraceError::MissingFile(path.to_path_buf()));
        }
        let img = image::open(path)?;
        let labels = match img {
            DynamicImage::ImageLuma8(buf) => {
                let (w, h) = buf.dimensions();
                Array2::from_shape_fn((h as usize, w as usize), |(r, c)| {
                    buf.get_pixel(c as u32, r as u32).0[0] as u32
                })
            }
            DynamicImage::ImageLuma16(buf) => {
                let (w, h) = buf.dimensions();
                Array2::from_shape_fn((h as usize, w as usize), |(r, c)| {
                    buf.get_pixel(c as u32, r as u32).0[0] as u32
                })
            }
            other => {
                // Anything else (palettized, RGB exports of label images)
                // loses label identity in a luma conversion; reject it.
                return Err(CaltraceError::InvalidMask(format!(
                    "unsupported pixel format {:?}; expected 8- or 16-bit grayscale",
                    other.color()
                )));
            }
        };
        Self::from_labels(labels)
    }

    /// Build from a label array, validating that every label 1..=N has at
    /// least one pixel.
    pub fn from_labels(labels: Array2<u32>) -> Result<Self> {
        let cell_count = labels.iter().copied().max().unwrap_or(0);
        let mut pixels: Vec<Vec<(usize, usize)>> = vec![Vec::new(); cell_count as usize];

        for ((row, col), &label) in labels.indexed_iter() {
            if label > 0 {
                pixels[(label - 1) as usize].push((row, col));
            }
        }

        for (i, px) in pixels.iter().enumerate() {
            if px.is_empty() {
                return Err(CaltraceError::InvalidMask(format!(
                    "label {} has no pixels (labels must be contiguous 1..{})",
                    i + 1,
                    cell_count
                )));
            }
        }

        Ok(Self {
            labels,
            cell_count,
            pixels,
        })
    }

    pub fn width(&self) -> usize {
        self.labels.ncols()
    }

    pub fn height(&self) -> usize {
        self.labels.nrows()
    }

    /// Number of labeled cell regions.
    pub fn cell_count(&self) -> u32 {
        self.cell_count
    }

    /// Pixel coordinates of one cell, by 0-based cell id (label - 1).
    pub fn cell_pixels(&self, cell_id: u32) -> &[(usize, usize)] {
        &self.pixels[cell_id as usize]
    }

    /// Pixel coordinates outside every cell region.
    pub fn background_pixels(&self) -> Vec<(usize, usize)> {
        self.labels
            .indexed_iter()
            .filter(|(_, &label)| label == 0)
            .map(|((row, col), _)| (row, col))
            .collect()
    }

    /// Mask-region centroids in pixel coordinates (x = column, y = row),
    /// tagged by 0-based cell id.
    pub fn centroids(&self) -> Vec<PositionRecord> {
        self.pixels
            .iter()
            .enumerate()
            .map(|(i, px)| {
                let n = px.len() as f64;
                let (row_sum, col_sum) = px
                    .iter()
                    .fold((0.0, 0.0), |(rs, cs), &(r, c)| (rs + r as f64, cs + c as f64));
                PositionRecord {
                    cell_id: i as u32,
                    x: col_sum / n,
                    y: row_sum / n,
                }
            })
            .collect()
    }
}
