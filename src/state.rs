use crate::tasks::TaskItem;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// State shared between the host window and the overlay thread.
///
/// The overlay only ever reads it, once per frame. Reads are allowed to
/// observe a value that is one frame stale: a toggle or a freshly added task
/// shows up on the next repaint, which is at most one scheduler interval
/// away. Nothing here needs to be read atomically as a group.
#[derive(Debug)]
pub struct HelperState {
    enabled: AtomicBool,
    tasks: Mutex<Vec<TaskItem>>,
}

impl Default for HelperState {
    fn default() -> Self {
        Self::new(true, Vec::new())
    }
}

impl HelperState {
    pub fn new(enabled: bool, tasks: Vec<TaskItem>) -> Self {
        Self {
            enabled: AtomicBool::new(enabled),
            tasks: Mutex::new(tasks),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn set_enabled(&self, enabled: bool) {
        let old = self.enabled.swap(enabled, Ordering::Relaxed);
        if old != enabled {
            tracing::debug!(from = old, to = enabled, "helper enabled flag updated");
        }
    }

    /// Name of the most recently added task, if any.
    pub fn latest_task_name(&self) -> Option<String> {
        // A poisoned lock still holds a usable list; the writer only ever
        // replaces or pushes whole entries.
        let tasks = match self.tasks.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        tasks.last().map(|t| t.task_name.clone())
    }

    pub fn tasks(&self) -> Vec<TaskItem> {
        match self.tasks.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn replace_tasks(&self, tasks: Vec<TaskItem>) {
        match self.tasks.lock() {
            Ok(mut guard) => *guard = tasks,
            Err(poisoned) => *poisoned.into_inner() = tasks,
        }
    }

    pub fn push_task(&self, task: TaskItem) {
        match self.tasks.lock() {
            Ok(mut guard) => guard.push(task),
            Err(poisoned) => poisoned.into_inner().push(task),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_task_follows_insertion_order() {
        let state = HelperState::default();
        assert_eq!(state.latest_task_name(), None);
        state.push_task(TaskItem::named("first"));
        state.push_task(TaskItem::named("second"));
        assert_eq!(state.latest_task_name().as_deref(), Some("second"));
    }

    #[test]
    fn enabled_flag_is_visible_across_threads() {
        let state = std::sync::Arc::new(HelperState::new(true, Vec::new()));
        let writer = std::sync::Arc::clone(&state);
        std::thread::spawn(move || writer.set_enabled(false))
            .join()
            .unwrap();
        assert!(!state.is_enabled());
    }
}
