use std::sync::mpsc;

use crate::messages::{WorkerCommand, WorkerResult};
use crate::panels;
use crate::state::{ConfigState, PlotState, UIState};
use crate::worker;

pub struct CaltraceApp {
    pub cmd_tx: mpsc::Sender<WorkerCommand>,
    pub result_rx: mpsc::Receiver<WorkerResult>,
    pub ui_state: UIState,
    pub config: ConfigState,
    pub plot: PlotState,
    pub show_about: bool,
}

impl CaltraceApp {
    pub fn new(ctx: &egui::Context) -> Self {
        let (result_tx, result_rx) = mpsc::channel();
        let cmd_tx = worker::spawn_worker(result_tx, ctx.clone());

        Self {
            cmd_tx,
            result_rx,
            ui_state: UIState::default(),
            config: ConfigState::default(),
            plot: PlotState::default(),
            show_about: false,
        }
    }

    /// Drain all pending results from the worker.
    fn poll_results(&mut self) {
        while let Ok(result) = self.result_rx.try_recv() {
            match result {
                WorkerResult::RawLoaded { path, cells, frames } => {
                    self.ui_state.running = None;
                    self.ui_state.add_log(format!(
                        "Loaded: {} ({cells} cells, {frames} frames)",
                        path.display()
                    ));
                    self.ui_state.raw_path = Some(path);
                    self.ui_state.raw_cells = Some(cells);
                    self.ui_state.raw_frames = Some(frames);
                }
                WorkerResult::BackgroundLoaded { path, frames } => {
                    self.ui_state.running = None;
                    self.ui_state.add_log(format!(
                        "Background: {} ({frames} frames)",
                        path.display()
                    ));
                    self.ui_state.background_path = Some(path);
                }
                WorkerResult::Processed { traces, elapsed } => {
                    self.ui_state.running = None;
                    self.ui_state.add_log(format!(
                        "Processed {} cells in {}",
                        traces.len(),
                        format_duration(elapsed)
                    ));
                    self.plot.set_traces(traces);
                }
                WorkerResult::ProcessedLoaded { path, traces } => {
                    self.ui_state.running = None;
                    self.ui_state.add_log(format!(
                        "Loaded processed: {} ({} cells)",
                        path.display(),
                        traces.len()
                    ));
                    self.plot.set_traces(traces);
                }
                WorkerResult::PeaksDetected {
                    peaks,
                    distributions,
                    elapsed,
                } => {
                    self.ui_state.running = None;
                    self.ui_state.add_log(format!(
                        "{} peaks detected in {}",
                        peaks.len(),
                        format_duration(elapsed)
                    ));
                    self.plot.peaks = peaks;
                    self.plot.distributions = Some(distributions);
                    self.plot.show_peaks = true;
                }
                WorkerResult::Saved { path } => {
                    self.ui_state.running = None;
                    self.ui_state.add_log(format!("Saved: {}", path.display()));
                }
                WorkerResult::Error { message } => {
                    self.ui_state.running = None;
                    self.ui_state.add_log(format!("ERROR: {message}"));
                }
                WorkerResult::Log { message } => {
                    self.ui_state.add_log(message);
                }
            }
        }
    }

    pub fn send_command(&self, cmd: WorkerCommand) {
        let _ = self.cmd_tx.send(cmd);
    }
}

impl eframe::App for CaltraceApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_results();

        panels::menu_bar::show(ctx, self);
        panels::status::show(ctx, self);
        panels::controls::show(ctx, self);
        panels::plot::show(ctx, self);

        // About dialog
        if self.show_about {
            egui::Window::new("About Caltrace")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.heading("Caltrace");
                        ui.label("Calcium-Imaging Trace Analysis");
                        ui.add_space(8.0);
                        ui.label(format!("Version {}", env!("CARGO_PKG_VERSION")));
                        ui.add_space(8.0);
                        if ui.button("Close").clicked() {
                            self.show_about = false;
                        }
                    });
                });
        }
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs_f32();
    if secs < 1.0 {
        format!("{:.0}ms", d.as_millis())
    } else {
        format!("{secs:.1}s")
    }
}
