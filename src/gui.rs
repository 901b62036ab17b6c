use crate::state::HelperState;
use crate::tasks::{self, TaskItem};
use eframe::egui;
use std::path::PathBuf;
use std::sync::Arc;

/// Main window: toggles the on-screen helper and edits the task list it
/// reads its label from.
pub struct HelperApp {
    state: Arc<HelperState>,
    tasks_path: PathBuf,
    new_task: String,
    error: Option<String>,
}

impl HelperApp {
    pub fn new(state: Arc<HelperState>, tasks_path: PathBuf) -> Self {
        Self {
            state,
            tasks_path,
            new_task: String::new(),
            error: None,
        }
    }

    /// Persist a new task and publish it to the overlay. Blank names are
    /// ignored.
    pub fn add_task(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        let task = TaskItem::named(name);
        match tasks::add_task(&self.tasks_path, task.clone()) {
            Ok(()) => {
                tracing::info!(task = %name, "task added");
                self.state.push_task(task);
                self.error = None;
                true
            }
            Err(err) => {
                tracing::error!(error = %format!("{err:#}"), "failed to add task");
                self.error = Some(format!("Could not save task: {err}"));
                false
            }
        }
    }

    pub fn delete_task(&mut self, name: &str) -> bool {
        let removed = tasks::delete_task(&self.tasks_path, name)
            .and_then(|removed| Ok((removed, tasks::load_tasks(&self.tasks_path)?)));
        match removed {
            Ok((removed, list)) => {
                if removed {
                    tracing::info!(task = %name, "task deleted");
                }
                self.state.replace_tasks(list);
                self.error = None;
                removed
            }
            Err(err) => {
                tracing::error!(error = %format!("{err:#}"), "failed to delete task");
                self.error = Some(format!("Could not delete task: {err}"));
                false
            }
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

impl eframe::App for HelperApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let mut enabled = self.state.is_enabled();
            if ui.checkbox(&mut enabled, "Show helper").changed() {
                self.state.set_enabled(enabled);
            }
            ui.separator();

            ui.horizontal(|ui| {
                let resp = ui.text_edit_singleline(&mut self.new_task);
                let submitted = resp.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                if ui.button("Add").clicked() || submitted {
                    let name = std::mem::take(&mut self.new_task);
                    if !self.add_task(&name) {
                        self.new_task = name;
                    }
                }
            });

            let mut delete = None;
            egui::ScrollArea::vertical().show(ui, |ui| {
                for task in self.state.tasks() {
                    ui.horizontal(|ui| {
                        ui.label(task.task_name.as_str());
                        if let Some(due) = task.due_date {
                            ui.weak(due.format("%Y-%m-%d %H:%M").to_string());
                        }
                        if ui.small_button("Delete").clicked() {
                            delete = Some(task.task_name.clone());
                        }
                    });
                }
            });
            if let Some(name) = delete {
                self.delete_task(&name);
            }

            if let Some(err) = &self.error {
                ui.colored_label(egui::Color32::RED, err.as_str());
            }
        });
    }
}
