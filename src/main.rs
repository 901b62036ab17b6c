use desktop_helper::gui::HelperApp;
use desktop_helper::settings::{Settings, SETTINGS_FILE};
use desktop_helper::state::HelperState;
use desktop_helper::{logging, overlay, tasks};

use eframe::egui;
use std::path::PathBuf;
use std::sync::Arc;

fn main() -> anyhow::Result<()> {
    let settings = Settings::load(SETTINGS_FILE)?;
    logging::init(settings.debug_logging, settings.log_file.as_ref().map(PathBuf::from));

    let task_list = tasks::load_tasks(&settings.tasks_path).unwrap_or_else(|err| {
        tracing::error!(error = %format!("{err:#}"), "failed to load tasks; starting empty");
        Vec::new()
    });
    let state = Arc::new(HelperState::new(settings.helper_enabled, task_list));

    // The overlay thread is never joined; it ends with the process.
    let _overlay = overlay::spawn_overlay(Arc::clone(&state), settings.overlay.clone())?;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("DesktopHelper")
            .with_inner_size([360.0, 420.0])
            .with_min_inner_size([280.0, 200.0]),
        ..Default::default()
    };
    let tasks_path = PathBuf::from(&settings.tasks_path);
    eframe::run_native(
        "DesktopHelper",
        native_options,
        Box::new(move |_cc| Box::new(HelperApp::new(state, tasks_path))),
    )
    .map_err(|err| anyhow::anyhow!("host window failed: {err}"))?;
    Ok(())
}
