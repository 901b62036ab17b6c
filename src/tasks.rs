use anyhow::Context;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const TASKS_FILE: &str = "tasks.json";

/// A single entry of the task list. Field names follow the on-disk format
/// shared with older `tasks.json` files.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaskItem {
    pub task_name: String,
    #[serde(default, with = "due_date_format")]
    pub due_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub has_reminder: bool,
}

impl TaskItem {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            task_name: name.into(),
            ..Default::default()
        }
    }
}

mod due_date_format {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

    pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(date) => serializer.serialize_str(&date.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    /// Unparseable dates are read as `None` instead of failing the whole list.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw.and_then(|s| NaiveDateTime::parse_from_str(&s, FORMAT).ok()))
    }
}

pub fn load_tasks(path: impl AsRef<Path>) -> anyhow::Result<Vec<TaskItem>> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    let list: Vec<TaskItem> = serde_json::from_str(&content)
        .with_context(|| format!("parsing {}", path.display()))?;
    tracing::debug!(count = list.len(), path = %path.display(), "loaded tasks");
    Ok(list)
}

pub fn save_tasks(path: impl AsRef<Path>, tasks: &[TaskItem]) -> anyhow::Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(tasks)?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    tracing::debug!(count = tasks.len(), path = %path.display(), "saved tasks");
    Ok(())
}

pub fn add_task(path: impl AsRef<Path>, task: TaskItem) -> anyhow::Result<()> {
    let path = path.as_ref();
    let mut list = load_tasks(path)?;
    list.push(task);
    save_tasks(path, &list)
}

/// Replace the first task with the same name. Returns `false` when no task
/// matched, in which case the file is left untouched.
pub fn edit_task(path: impl AsRef<Path>, updated: TaskItem) -> anyhow::Result<bool> {
    let path = path.as_ref();
    let mut list = load_tasks(path)?;
    match list.iter().position(|t| t.task_name == updated.task_name) {
        Some(idx) => {
            list[idx] = updated;
            save_tasks(path, &list)?;
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Remove the first task named `name`. Returns `false` when nothing matched.
pub fn delete_task(path: impl AsRef<Path>, name: &str) -> anyhow::Result<bool> {
    let path = path.as_ref();
    let mut list = load_tasks(path)?;
    match list.iter().position(|t| t.task_name == name) {
        Some(idx) => {
            list.remove(idx);
            save_tasks(path, &list)?;
            Ok(true)
        }
        None => Ok(false),
    }
}

pub fn get_task(path: impl AsRef<Path>, name: &str) -> anyhow::Result<Option<TaskItem>> {
    Ok(load_tasks(path)?.into_iter().find(|t| t.task_name == name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn due_date_uses_millisecond_utc_format() {
        let task = TaskItem {
            task_name: "Dentist".into(),
            due_date: NaiveDate::from_ymd_opt(2024, 3, 9)
                .and_then(|d| d.and_hms_milli_opt(14, 5, 0, 250)),
            has_reminder: true,
        };
        let json = serde_json::to_string(&task).unwrap();
        assert_eq!(
            json,
            r#"{"TaskName":"Dentist","DueDate":"2024-03-09T14:05:00.250Z","HasReminder":true}"#
        );
        let back: TaskItem = serde_json::from_str(&json).unwrap();
        assert_eq!(back, task);
    }

    #[test]
    fn malformed_due_date_reads_as_none() {
        let task: TaskItem =
            serde_json::from_str(r#"{"TaskName":"x","DueDate":"next tuesday"}"#).unwrap();
        assert_eq!(task.due_date, None);
        assert!(!task.has_reminder);
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let tasks = load_tasks(dir.path().join("absent.json")).unwrap();
        assert!(tasks.is_empty());
    }
}
