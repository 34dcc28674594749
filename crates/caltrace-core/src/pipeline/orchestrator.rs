use std::sync::Arc;

use tracing::info;

use crate::error::Result;
use crate::extract::{extract_traces, validate_paths};
use crate::io::csv_io;
use crate::io::mask::CellMask;
use crate::io::ser::SerReader;
use crate::normalize::process_traces;
use crate::peaks::{detect_all, PeakDistributions};
use crate::render::save_heatmap;
use crate::trace::ProcessedSet;

use super::config::PipelineConfig;
use super::types::{NoOpReporter, PipelineStage, ProgressReporter};

/// Heatmap band height in pixel rows per cell.
const HEATMAP_ROW_HEIGHT: usize = 4;

/// What a full pipeline run produced, for summary display.
#[derive(Clone, Debug)]
pub struct PipelineOutput {
    pub cells: usize,
    pub frames: usize,
    pub processed: ProcessedSet,
    pub peak_count: usize,
    pub distributions: PeakDistributions,
}

/// Run the full pipeline with a thread-safe progress reporter:
/// extract -> normalize -> detect peaks -> write CSVs (+ optional heatmap).
pub fn run_pipeline_reported(
    config: &PipelineConfig,
    reporter: Arc<dyn ProgressReporter>,
) -> Result<PipelineOutput> {
    let mask_path = config.mask_path();
    validate_paths(&config.input, &mask_path, &config.output, config.overwrite)?;

    let reader = SerReader::open(&config.input)?;
    let mask = CellMask::load(&mask_path)?;
    let total = reader.frame_count();
    info!(
        input = %config.input.display(),
        frames = total,
        cells = mask.cell_count(),
        "Opened recording"
    );

    reporter.begin_stage(PipelineStage::Extracting, Some(total));
    let extracted = extract_traces(&reader, &mask, Some(&|done| reporter.advance(done)))?;
    reporter.finish_stage();

    reporter.begin_stage(PipelineStage::Normalizing, None);
    let processed = process_traces(
        &extracted.traces,
        Some(&extracted.background),
        &config.normalize,
    )?;
    reporter.finish_stage();

    reporter.begin_stage(PipelineStage::DetectingPeaks, None);
    let (peak_records, distributions) = detect_all(&processed, &config.peaks);
    reporter.finish_stage();

    reporter.begin_stage(PipelineStage::Writing, None);
    csv_io::write_processed(&config.output, &processed)?;
    csv_io::write_background(&config.background_path(), &extracted.background)?;
    csv_io::write_positions(&config.positions_path(), &extracted.positions)?;
    csv_io::write_peaks(&config.peaks_path(), &peak_records)?;
    reporter.finish_stage();

    if let Some(ref heatmap_path) = config.heatmap {
        reporter.begin_stage(PipelineStage::Rendering, None);
        save_heatmap(&processed, HEATMAP_ROW_HEIGHT, heatmap_path)?;
        reporter.finish_stage();
    }

    info!(peaks = peak_records.len(), "Pipeline complete");

    Ok(PipelineOutput {
        cells: mask.cell_count() as usize,
        frames: total,
        processed,
        peak_count: peak_records.len(),
        distributions,
    })
}

/// Run the full pipeline without progress feedback.
pub fn run_pipeline(config: &PipelineConfig) -> Result<PipelineOutput> {
    run_pipeline_reported(config, Arc::new(NoOpReporter))
}
