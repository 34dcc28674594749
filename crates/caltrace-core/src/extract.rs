//! Per-cell trace extraction from a recording and its label mask.
//!
//! For every frame, aggregates the pixel intensities under each cell's mask
//! (mean, max, mean of the brightest 10%) and the mean of all unmasked
//! pixels (background), producing the tabular schemas consumed by the
//! normalization stage.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::info;

use crate::error::{CaltraceError, Result};
use crate::io::mask::CellMask;
use crate::io::ser::SerReader;
use crate::trace::{BackgroundTrace, PositionRecord, RawRecord, TraceSet};

/// Frames decoded simultaneously during extraction. Bounds memory while
/// keeping Rayon busy across the batch.
pub const FRAME_BATCH_SIZE: usize = 64;

/// Everything the ingestion stage produces for one recording.
#[derive(Clone, Debug)]
pub struct ExtractOutput {
    pub traces: TraceSet,
    pub background: BackgroundTrace,
    pub positions: Vec<PositionRecord>,
}

/// Default Cellpose mask path for a video: `<stem>_cp_masks.png` next to it.
pub fn default_mask_path(video: &Path) -> PathBuf {
    let stem = video.file_stem().unwrap_or_default().to_string_lossy();
    video.with_file_name(format!("{stem}_cp_masks.png"))
}

/// Validate all file arguments before any decoding starts: video must be a
/// `.ser` file that exists, the mask must exist, the output must be a `.csv`
/// path and must not already exist unless `overwrite` is set.
pub fn validate_paths(video: &Path, mask: &Path, out: &Path, overwrite: bool) -> Result<()> {
    if video.extension().and_then(|e| e.to_str()) != Some("ser") {
        return Err(CaltraceError::WrongExtension {
            expected: ".ser",
            path: video.to_path_buf(),
        });
    }
    if !video.exists() {
        return Err(CaltraceError::MissingFile(video.to_path_buf()));
    }
    if !mask.exists() {
        return Err(CaltraceError::MissingFile(mask.to_path_buf()));
    }
    if out.extension().and_then(|e| e.to_str()) != Some("csv") {
        return Err(CaltraceError::WrongExtension {
            expected: ".csv",
            path: out.to_path_buf(),
        });
    }
    if !overwrite && out.exists() {
        return Err(CaltraceError::OutputExists(out.to_path_buf()));
    }
    Ok(())
}

/// Extract per-cell and background traces from every frame.
///
/// Frames are decoded in batches of [`FRAME_BATCH_SIZE`] and aggregated in
/// parallel within each batch; cells have no cross-frame dependency, so the
/// result is identical to a sequential pass. `on_progress` is called with
/// the total frames processed after each batch.
pub fn extract_traces(
    reader: &SerReader,
    mask: &CellMask,
    on_progress: Option<&(dyn Fn(usize) + Sync)>,
) -> Result<ExtractOutput> {
    let vw = reader.header.width as usize;
    let vh = reader.header.height as usize;
    if mask.width() != vw || mask.height() != vh {
        return Err(CaltraceError::DimensionMismatch {
            mask_width: mask.width(),
            mask_height: mask.height(),
            video_width: vw,
            video_height: vh,
        });
    }

    let total = reader.frame_count();
    if total == 0 {
        return Err(CaltraceError::EmptySequence);
    }
    let n_cells = mask.cell_count();
    info!(frames = total, cells = n_cells, "Extracting traces");

    let background_pixels = mask.background_pixels();

    // Per frame: background mean plus (mean, max, top10) per cell.
    let mut frame_rows: Vec<(f64, Vec<(f64, f64, f64)>)> = Vec::with_capacity(total);

    for batch_start in (0..total).step_by(FRAME_BATCH_SIZE) {
        let batch_end = (batch_start + FRAME_BATCH_SIZE).min(total);
        let batch: Vec<(usize, Vec<(f64, f64, f64)>, f64)> = (batch_start..batch_end)
            .into_par_iter()
            .map(|i| {
                let frame = reader.read_frame(i)?;
                let cells: Vec<(f64, f64, f64)> = (0..n_cells)
                    .map(|cell_id| aggregate_cell(&frame.data, mask.cell_pixels(cell_id)))
                    .collect();
                let bg = mean_at(&frame.data, &background_pixels);
                Ok((i, cells, bg))
            })
            .collect::<Result<_>>()?;

        for (_, cells, bg) in batch {
            frame_rows.push((bg, cells));
        }
        if let Some(progress) = on_progress {
            progress(frame_rows.len());
        }
    }

    let mut records = Vec::with_capacity(total * n_cells as usize);
    for (frame, (_, cells)) in frame_rows.iter().enumerate() {
        for (cell_id, &(mean, max, top10)) in cells.iter().enumerate() {
            records.push(RawRecord {
                cell_id: cell_id as u32,
                frame,
                mean,
                max,
                top10,
            });
        }
    }

    Ok(ExtractOutput {
        traces: TraceSet::from_records(records)?,
        background: BackgroundTrace::from_values(
            frame_rows.iter().map(|(bg, _)| *bg).collect(),
        ),
        positions: mask.centroids(),
    })
}

/// Mean, max, and top-10% mean of one cell's pixels in one frame.
///
/// The top-10% count is `max(area / 10, 1)` and is picked by selection, not
/// a full sort.
fn aggregate_cell(data: &ndarray::Array2<f32>, pixels: &[(usize, usize)]) -> (f64, f64, f64) {
    let mut values: Vec<f64> = pixels.iter().map(|&(r, c)| data[[r, c]] as f64).collect();

    let sum: f64 = values.iter().sum();
    let mean = sum / values.len() as f64;
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let k = (values.len() / 10).max(1);
    let pivot = values.len() - k;
    values.select_nth_unstable_by(pivot, |a, b| a.total_cmp(b));
    let top10 = values[values.len() - k..].iter().sum::<f64>() / k as f64;

    (mean, max, top10)
}

/// Mean intensity over an arbitrary pixel set; 0.0 if the set is empty
/// (a mask that covers the full field has no background).
fn mean_at(data: &ndarray::Array2<f32>, pixels: &[(usize, usize)]) -> f64 {
    if pixels.is_empty() {
        return 0.0;
    }
    let sum: f64 = pixels.iter().map(|&(r, c)| data[[r, c]] as f64).sum();
    sum / pixels.len() as f64
}
