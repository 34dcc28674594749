use std::path::PathBuf;

use caltrace_core::normalize::NormalizeParams;
use caltrace_core::peaks::{PeakDistributions, PeakParams};
use caltrace_core::trace::{PeakRecord, Quantity};

/// Transient UI state: logs, busy indicator, loaded-file bookkeeping.
#[derive(Default)]
pub struct UIState {
    pub raw_path: Option<PathBuf>,
    pub background_path: Option<PathBuf>,
    pub raw_cells: Option<usize>,
    pub raw_frames: Option<usize>,

    /// Label of the operation currently running on the worker, if any.
    pub running: Option<&'static str>,

    pub log_messages: Vec<String>,
}

impl UIState {
    pub fn is_busy(&self) -> bool {
        self.running.is_some()
    }

    pub fn add_log(&mut self, msg: String) {
        self.log_messages.push(msg);
        if self.log_messages.len() > 200 {
            self.log_messages.remove(0);
        }
    }
}

/// Editable analysis parameters, mirrored into core param structs on demand.
pub struct ConfigState {
    pub quantity: Quantity,
    pub subtract_background: bool,
    pub window_size: usize,
    pub k_percent: f64,
    pub smoothing: usize,

    pub min_height: f64,
    pub min_prominence: f64,
    pub rel_height: f64,
}

impl Default for ConfigState {
    fn default() -> Self {
        let n = NormalizeParams::default();
        let p = PeakParams::default();
        Self {
            quantity: n.quantity,
            subtract_background: n.subtract_background,
            window_size: n.window_size,
            k_percent: n.k_percent,
            smoothing: n.smoothing,
            min_height: p.min_height,
            min_prominence: p.min_prominence,
            rel_height: p.rel_height,
        }
    }
}

impl ConfigState {
    pub fn normalize_params(&self) -> NormalizeParams {
        NormalizeParams {
            quantity: self.quantity,
            subtract_background: self.subtract_background,
            window_size: self.window_size,
            k_percent: self.k_percent,
            smoothing: self.smoothing,
        }
    }

    pub fn peak_params(&self) -> PeakParams {
        PeakParams {
            min_height: self.min_height,
            min_prominence: self.min_prominence,
            rel_height: self.rel_height,
        }
    }
}

/// What the central plot is currently showing.
#[derive(Default)]
pub struct PlotState {
    /// Processed traces, one `(cell_id, samples)` per cell.
    pub traces: Vec<(u32, Vec<f64>)>,
    /// Per-cell visibility, parallel to `traces`.
    pub visible: Vec<bool>,
    pub peaks: Vec<PeakRecord>,
    pub distributions: Option<PeakDistributions>,
    pub show_peaks: bool,
}

impl PlotState {
    /// Replace traces, resetting visibility and stale peaks.
    pub fn set_traces(&mut self, traces: Vec<(u32, Vec<f64>)>) {
        self.visible = vec![true; traces.len()];
        self.traces = traces;
        self.peaks.clear();
        self.distributions = None;
    }

    pub fn has_traces(&self) -> bool {
        !self.traces.is_empty()
    }
}
