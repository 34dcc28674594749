use egui_plot::{Legend, Line, Plot, PlotPoints, Points};

use crate::app::CaltraceApp;

/// Radius of the peak markers in pixels.
const PEAK_MARKER_RADIUS: f32 = 4.0;

pub fn show(ctx: &egui::Context, app: &mut CaltraceApp) {
    egui::CentralPanel::default().show(ctx, |ui| {
        if !app.plot.has_traces() {
            ui.centered_and_justified(|ui| {
                ui.label("Open a raw trace CSV and process it, or open a processed CSV");
            });
            return;
        }

        Plot::new("trace_plot")
            .legend(Legend::default())
            .x_axis_label("frame")
            .y_axis_label("\u{2206}F/F")
            .show(ui, |plot_ui| {
                for (i, (cell_id, samples)) in app.plot.traces.iter().enumerate() {
                    if !app.plot.visible[i] {
                        continue;
                    }
                    let points: PlotPoints = samples
                        .iter()
                        .enumerate()
                        .filter(|(_, v)| v.is_finite())
                        .map(|(frame, v)| [frame as f64, *v])
                        .collect();
                    plot_ui.line(Line::new(format!("Cell {cell_id}"), points));
                }

                if app.plot.show_peaks && !app.plot.peaks.is_empty() {
                    let visible_cells: Vec<u32> = app
                        .plot
                        .traces
                        .iter()
                        .enumerate()
                        .filter(|(i, _)| app.plot.visible[*i])
                        .map(|(_, (id, _))| *id)
                        .collect();

                    let markers: PlotPoints = app
                        .plot
                        .peaks
                        .iter()
                        .filter(|p| visible_cells.contains(&p.cell_id))
                        .map(|p| [p.frame as f64, p.height])
                        .collect();

                    plot_ui.points(
                        Points::new("peaks", markers)
                            .radius(PEAK_MARKER_RADIUS)
                            .shape(egui_plot::MarkerShape::Diamond)
                            .color(egui::Color32::from_rgb(255, 100, 80)),
                    );
                }
            });
    });
}
