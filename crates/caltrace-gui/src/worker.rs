use std::path::Path;
use std::sync::mpsc;
use std::time::Instant;

use caltrace_core::io::csv_io;
use caltrace_core::normalize::{process_traces, NormalizeParams};
use caltrace_core::peaks::{detect_all, PeakParams};
use caltrace_core::trace::{BackgroundTrace, ProcessedSet, TraceSet};

use crate::messages::{WorkerCommand, WorkerResult};

/// Cached datasets living on the worker thread.
struct TraceCache {
    raw: Option<TraceSet>,
    background: Option<BackgroundTrace>,
    processed: Option<ProcessedSet>,
}

impl TraceCache {
    fn new() -> Self {
        Self {
            raw: None,
            background: None,
            processed: None,
        }
    }
}

/// Spawn the worker thread. Returns the command sender.
pub fn spawn_worker(
    result_tx: mpsc::Sender<WorkerResult>,
    ctx: egui::Context,
) -> mpsc::Sender<WorkerCommand> {
    let (cmd_tx, cmd_rx) = mpsc::channel::<WorkerCommand>();

    std::thread::Builder::new()
        .name("caltrace-worker".into())
        .spawn(move || {
            worker_loop(cmd_rx, result_tx, ctx);
        })
        .expect("Failed to spawn worker thread");

    cmd_tx
}

fn send(tx: &mpsc::Sender<WorkerResult>, ctx: &egui::Context, result: WorkerResult) {
    let _ = tx.send(result);
    ctx.request_repaint();
}

fn send_error(tx: &mpsc::Sender<WorkerResult>, ctx: &egui::Context, msg: impl Into<String>) {
    send(tx, ctx, WorkerResult::Error { message: msg.into() });
}

fn worker_loop(
    cmd_rx: mpsc::Receiver<WorkerCommand>,
    tx: mpsc::Sender<WorkerResult>,
    ctx: egui::Context,
) {
    let mut cache = TraceCache::new();

    while let Ok(cmd) = cmd_rx.recv() {
        match cmd {
            WorkerCommand::LoadRaw { path } => {
                handle_load_raw(&path, &mut cache, &tx, &ctx);
            }
            WorkerCommand::LoadBackground { path } => {
                handle_load_background(&path, &mut cache, &tx, &ctx);
            }
            WorkerCommand::LoadProcessed { path } => {
                handle_load_processed(&path, &mut cache, &tx, &ctx);
            }
            WorkerCommand::Process { params } => {
                handle_process(&params, &mut cache, &tx, &ctx);
            }
            WorkerCommand::DetectPeaks { params } => {
                handle_detect_peaks(&params, &cache, &tx, &ctx);
            }
            WorkerCommand::SaveProcessed { path } => {
                handle_save_processed(&path, &cache, &tx, &ctx);
            }
        }
    }
}

fn handle_load_raw(
    path: &Path,
    cache: &mut TraceCache,
    tx: &mpsc::Sender<WorkerResult>,
    ctx: &egui::Context,
) {
    match csv_io::read_raw(path) {
        Ok(traces) => {
            let cells = traces.cell_ids().len();
            let frames = traces
                .cell_ids()
                .first()
                .map(|&id| traces.cell_records(id).len())
                .unwrap_or(0);
            cache.raw = Some(traces);
            cache.processed = None;
            send(tx, ctx, WorkerResult::RawLoaded {
                path: path.to_path_buf(),
                cells,
                frames,
            });
        }
        Err(e) => send_error(tx, ctx, format!("Failed to read traces: {e}")),
    }
}

fn handle_load_background(
    path: &Path,
    cache: &mut TraceCache,
    tx: &mpsc::Sender<WorkerResult>,
    ctx: &egui::Context,
) {
    match csv_io::read_background(path) {
        Ok(background) => {
            let frames = background.len();
            cache.background = Some(background);
            send(tx, ctx, WorkerResult::BackgroundLoaded {
                path: path.to_path_buf(),
                frames,
            });
        }
        Err(e) => send_error(tx, ctx, format!("Failed to read background: {e}")),
    }
}

fn handle_load_processed(
    path: &Path,
    cache: &mut TraceCache,
    tx: &mpsc::Sender<WorkerResult>,
    ctx: &egui::Context,
) {
    match csv_io::read_processed(path) {
        Ok(processed) => {
            let traces = processed.traces();
            cache.processed = Some(processed);
            send(tx, ctx, WorkerResult::ProcessedLoaded {
                path: path.to_path_buf(),
                traces,
            });
        }
        Err(e) => send_error(tx, ctx, format!("Failed to read processed traces: {e}")),
    }
}

fn handle_process(
    params: &NormalizeParams,
    cache: &mut TraceCache,
    tx: &mpsc::Sender<WorkerResult>,
    ctx: &egui::Context,
) {
    let Some(ref raw) = cache.raw else {
        send_error(tx, ctx, "No raw traces loaded");
        return;
    };

    let start = Instant::now();
    match process_traces(raw, cache.background.as_ref(), params) {
        Ok(processed) => {
            let traces = processed.traces();
            cache.processed = Some(processed);
            send(tx, ctx, WorkerResult::Processed {
                traces,
                elapsed: start.elapsed(),
            });
        }
        Err(e) => send_error(tx, ctx, format!("Processing failed: {e}")),
    }
}

fn handle_detect_peaks(
    params: &PeakParams,
    cache: &TraceCache,
    tx: &mpsc::Sender<WorkerResult>,
    ctx: &egui::Context,
) {
    let Some(ref processed) = cache.processed else {
        send_error(tx, ctx, "No processed traces to analyze");
        return;
    };

    let start = Instant::now();
    let (peaks, distributions) = detect_all(processed, params);
    send(tx, ctx, WorkerResult::PeaksDetected {
        peaks,
        distributions,
        elapsed: start.elapsed(),
    });
}

fn handle_save_processed(
    path: &Path,
    cache: &TraceCache,
    tx: &mpsc::Sender<WorkerResult>,
    ctx: &egui::Context,
) {
    let Some(ref processed) = cache.processed else {
        send_error(tx, ctx, "Nothing to save");
        return;
    };

    match csv_io::write_processed(path, processed) {
        Ok(()) => send(tx, ctx, WorkerResult::Saved {
            path: path.to_path_buf(),
        }),
        Err(e) => send_error(tx, ctx, format!("Save failed: {e}")),
    }
}
