//! Heatmap rendering of processed traces.
//!
//! One row band per cell, one column per frame, intensity proportional to
//! the ∆F/F value. Gives a quick whole-recording activity overview without
//! an interactive plot.

use std::path::Path;

use image::GrayImage;

use crate::error::{CaltraceError, Result};
use crate::trace::ProcessedSet;

/// Render the processed set as a cells-by-frames grayscale heatmap.
///
/// Intensity is scaled to the global maximum of the set; non-finite samples
/// (zero-baseline artifacts) render as black. Each cell occupies a band of
/// `row_height` pixel rows, so short recordings with few cells still
/// produce a legible image.
pub fn heatmap(processed: &ProcessedSet, row_height: usize) -> Result<GrayImage> {
    let traces = processed.traces();
    if traces.is_empty() {
        return Err(CaltraceError::EmptySequence);
    }
    let row_height = row_height.max(1);
    let n_frames = traces.iter().map(|(_, t)| t.len()).max().unwrap_or(0);
    if n_frames == 0 {
        return Err(CaltraceError::EmptySequence);
    }

    let global_max = traces
        .iter()
        .flat_map(|(_, t)| t.iter())
        .filter(|v| v.is_finite())
        .fold(0.0f64, |acc, &v| acc.max(v));
    // All-zero set: render black rather than dividing by zero.
    let scale = if global_max > 0.0 {
        255.0 / global_max
    } else {
        0.0
    };

    let mut img = GrayImage::new(n_frames as u32, (traces.len() * row_height) as u32);
    for (band, (_, trace)) in traces.iter().enumerate() {
        for (col, &v) in trace.iter().enumerate() {
            let level = if v.is_finite() {
                (v * scale).clamp(0.0, 255.0) as u8
            } else {
                0
            };
            for dy in 0..row_height {
                img.put_pixel(col as u32, (band * row_height + dy) as u32, image::Luma([level]));
            }
        }
    }

    Ok(img)
}

/// Render and save a heatmap PNG.
pub fn save_heatmap(processed: &ProcessedSet, row_height: usize, path: &Path) -> Result<()> {
    let img = heatmap(processed, row_height)?;
    img.save_with_format(path, image::ImageFormat::Png)?;
    Ok(())
}
