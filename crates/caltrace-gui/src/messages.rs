use std::path::PathBuf;
use std::time::Duration;

use caltrace_core::normalize::NormalizeParams;
use caltrace_core::peaks::{PeakDistributions, PeakParams};
use caltrace_core::trace::PeakRecord;

/// Commands sent from UI thread to worker thread.
pub enum WorkerCommand {
    /// Read a raw trace CSV and cache it for processing.
    LoadRaw { path: PathBuf },

    /// Read a background trace CSV to pair with the cached raw traces.
    LoadBackground { path: PathBuf },

    /// Read an already-processed trace CSV straight into the plot.
    LoadProcessed { path: PathBuf },

    /// Normalize the cached raw traces to smoothed ∆F/F.
    Process { params: NormalizeParams },

    /// Detect transients in the cached processed traces.
    DetectPeaks { params: PeakParams },

    /// Write the cached processed traces to disk.
    SaveProcessed { path: PathBuf },
}

/// Results sent from worker thread back to UI thread.
pub enum WorkerResult {
    RawLoaded {
        path: PathBuf,
        cells: usize,
        frames: usize,
    },
    BackgroundLoaded {
        path: PathBuf,
        frames: usize,
    },

    /// Processed traces ready for plotting, one `(cell_id, samples)` per cell.
    Processed {
        traces: Vec<(u32, Vec<f64>)>,
        elapsed: Duration,
    },
    ProcessedLoaded {
        path: PathBuf,
        traces: Vec<(u32, Vec<f64>)>,
    },

    PeaksDetected {
        peaks: Vec<PeakRecord>,
        distributions: PeakDistributions,
        elapsed: Duration,
    },

    Saved {
        path: PathBuf,
    },
    Error {
        message: String,
    },
    Log {
        message: String,
    },
}
