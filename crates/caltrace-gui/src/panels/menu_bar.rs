use crate::app::CaltraceApp;
use crate::messages::WorkerCommand;
use crate::state::ConfigState;

pub fn show(ctx: &egui::Context, app: &mut CaltraceApp) {
    egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
        egui::MenuBar::new().ui(ui, |ui| {
            ui.menu_button("File", |ui| {
                let open_shortcut =
                    egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::O);
                if ui
                    .add(egui::Button::new("Open Traces...")
                        .shortcut_text(ctx.format_shortcut(&open_shortcut)))
                    .clicked()
                {
                    ui.close();
                    open_raw(app);
                }

                if ui.button("Open Background...").clicked() {
                    ui.close();
                    open_background(app);
                }

                if ui.button("Open Processed...").clicked() {
                    ui.close();
                    open_processed(app);
                }

                ui.separator();

                let save_shortcut =
                    egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::S);
                if ui
                    .add(egui::Button::new("Save Processed As...")
                        .shortcut_text(ctx.format_shortcut(&save_shortcut)))
                    .clicked()
                {
                    ui.close();
                    save_processed(app);
                }

                ui.separator();

                let quit_shortcut =
                    egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::Q);
                if ui
                    .add(egui::Button::new("Quit")
                        .shortcut_text(ctx.format_shortcut(&quit_shortcut)))
                    .clicked()
                {
                    ui.close();
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });

            ui.menu_button("Edit", |ui| {
                if ui.button("Reset Defaults").clicked() {
                    ui.close();
                    app.config = ConfigState::default();
                    app.ui_state.add_log("Parameters reset to defaults".into());
                }
            });

            ui.menu_button("Help", |ui| {
                if ui.button("About").clicked() {
                    ui.close();
                    app.show_about = true;
                }
            });
        });

        // Keyboard shortcuts (consumed outside menus)
        if ctx.input_mut(|i| {
            i.consume_shortcut(&egui::KeyboardShortcut::new(
                egui::Modifiers::COMMAND,
                egui::Key::O,
            ))
        }) {
            open_raw(app);
        }
        if ctx.input_mut(|i| {
            i.consume_shortcut(&egui::KeyboardShortcut::new(
                egui::Modifiers::COMMAND,
                egui::Key::S,
            ))
        }) {
            save_processed(app);
        }
        if ctx.input_mut(|i| {
            i.consume_shortcut(&egui::KeyboardShortcut::new(
                egui::Modifiers::COMMAND,
                egui::Key::Q,
            ))
        }) {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
    });
}

fn open_raw(app: &mut CaltraceApp) {
    let cmd_tx = app.cmd_tx.clone();
    std::thread::spawn(move || {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV files", &["csv"])
            .add_filter("All files", &["*"])
            .pick_file()
        {
            let _ = cmd_tx.send(WorkerCommand::LoadRaw { path });
        }
    });
}

fn open_background(app: &mut CaltraceApp) {
    let cmd_tx = app.cmd_tx.clone();
    std::thread::spawn(move || {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV files", &["csv"])
            .pick_file()
        {
            let _ = cmd_tx.send(WorkerCommand::LoadBackground { path });
        }
    });
}

fn open_processed(app: &mut CaltraceApp) {
    let cmd_tx = app.cmd_tx.clone();
    std::thread::spawn(move || {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV files", &["csv"])
            .pick_file()
        {
            let _ = cmd_tx.send(WorkerCommand::LoadProcessed { path });
        }
    });
}

fn save_processed(app: &mut CaltraceApp) {
    if !app.plot.has_traces() {
        app.ui_state.add_log("Nothing to save".into());
        return;
    }
    let cmd_tx = app.cmd_tx.clone();
    std::thread::spawn(move || {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV files", &["csv"])
            .set_file_name("traces_processed.csv")
            .save_file()
        {
            let _ = cmd_tx.send(WorkerCommand::SaveProcessed { path });
        }
    });
}
