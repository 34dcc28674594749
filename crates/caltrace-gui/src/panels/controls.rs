use caltrace_core::trace::Quantity;

use crate::app::CaltraceApp;
use crate::messages::WorkerCommand;

pub fn show(ctx: &egui::Context, app: &mut CaltraceApp) {
    egui::SidePanel::left("controls")
        .resizable(true)
        .default_width(260.0)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.add_space(4.0);
                file_section(ui, app);
                ui.separator();
                normalize_section(ui, app);
                ui.separator();
                peaks_section(ui, app);
                ui.separator();
                cells_section(ui, app);
            });
        });
}

fn file_section(ui: &mut egui::Ui, app: &mut CaltraceApp) {
    crate::panels::section_header(ui, "Input", None);
    ui.add_space(4.0);

    match (&app.ui_state.raw_path, app.ui_state.raw_cells) {
        (Some(path), Some(cells)) => {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            ui.label(name);
            ui.small(format!(
                "{cells} cells, {} frames",
                app.ui_state.raw_frames.unwrap_or(0)
            ));
        }
        _ => {
            ui.small("No raw traces loaded (File > Open Traces...)");
        }
    }
    if let Some(ref bg) = app.ui_state.background_path {
        let name = bg
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        ui.small(format!("Background: {name}"));
    }
}

fn normalize_section(ui: &mut egui::Ui, app: &mut CaltraceApp) {
    crate::panels::section_header(ui, "Normalization", None);
    ui.add_space(4.0);

    crate::panels::enum_combo(
        ui,
        "Quantity",
        &mut app.config.quantity,
        &[Quantity::Mean, Quantity::Max, Quantity::Top10],
    );

    ui.add(
        egui::Slider::new(&mut app.config.window_size, 3..=101)
            .step_by(2.0)
            .text("Baseline window"),
    );
    ui.add(
        egui::Slider::new(&mut app.config.k_percent, 0.05..=1.0).text("K percent"),
    );
    ui.add(egui::Slider::new(&mut app.config.smoothing, 1..=25).text("Smoothing"));
    ui.checkbox(
        &mut app.config.subtract_background,
        "Subtract background",
    );

    let can_process = app.ui_state.raw_path.is_some()
        && !app.ui_state.is_busy()
        && (!app.config.subtract_background || app.ui_state.background_path.is_some());
    if ui
        .add_enabled(can_process, egui::Button::new("Process"))
        .clicked()
    {
        app.ui_state.running = Some("Normalizing");
        app.send_command(WorkerCommand::Process {
            params: app.config.normalize_params(),
        });
    }
    if app.config.subtract_background && app.ui_state.background_path.is_none() {
        ui.small("Background subtraction needs a background CSV");
    }
}

fn peaks_section(ui: &mut egui::Ui, app: &mut CaltraceApp) {
    crate::panels::section_header(ui, "Peak Detection", None);
    ui.add_space(4.0);

    ui.add(
        egui::Slider::new(&mut app.config.min_height, 0.0..=2.0).text("Min height"),
    );
    ui.add(
        egui::Slider::new(&mut app.config.min_prominence, 0.0..=2.0)
            .text("Min prominence"),
    );
    ui.add(
        egui::Slider::new(&mut app.config.rel_height, 0.1..=1.0).text("Rel height"),
    );

    let can_detect = app.plot.has_traces() && !app.ui_state.is_busy();
    if ui
        .add_enabled(can_detect, egui::Button::new("Detect Peaks"))
        .clicked()
    {
        app.ui_state.running = Some("Detecting peaks");
        app.send_command(WorkerCommand::DetectPeaks {
            params: app.config.peak_params(),
        });
    }

    if let Some(ref dist) = app.plot.distributions {
        ui.add_space(4.0);
        let total: usize = dist.counts.iter().sum();
        let active = dist.counts.iter().filter(|&&c| c > 0).count();
        ui.small(format!("{total} peaks, {active}/{} active cells", dist.counts.len()));
    }
    ui.checkbox(&mut app.plot.show_peaks, "Show peak markers");
}

fn cells_section(ui: &mut egui::Ui, app: &mut CaltraceApp) {
    crate::panels::section_header(ui, "Cells", None);
    ui.add_space(4.0);

    if !app.plot.has_traces() {
        ui.small("Process traces to select cells");
        return;
    }

    ui.horizontal(|ui| {
        if ui.button("All").clicked() {
            app.plot.visible.iter_mut().for_each(|v| *v = true);
        }
        if ui.button("None").clicked() {
            app.plot.visible.iter_mut().for_each(|v| *v = false);
        }
    });

    egui::ScrollArea::vertical()
        .id_salt("cell_list")
        .max_height(220.0)
        .show(ui, |ui| {
            for (i, (cell_id, _)) in app.plot.traces.iter().enumerate() {
                ui.checkbox(&mut app.plot.visible[i], format!("Cell {cell_id}"));
            }
        });
}
