//! CSV-backed task storage.
//!
//! The whole task list lives in one CSV file with a header row. Every
//! mutation rewrites the file in full through [`write_atomic`], so the file
//! on disk is always either the previous or the new task list.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::fields::{self, non_empty};
use super::write_atomic;
use crate::error::{CoreError, Result, StorageError, ValidationError};
use crate::task::{Task, TaskKey};

/// Header of the task file, in write order.
pub const TASK_COLUMNS: [&str; 10] = [
    "Task Name",
    "Frequency",
    "Date",
    "Completed",
    "Cook Name",
    "Prep Time (min)",
    "Target Time (min)",
    "Efficiency (%)",
    "Performance Tag",
    "Last Validated Date",
];

/// Columns a task file cannot be loaded without.
const REQUIRED_COLUMNS: [&str; 5] = [
    "Task Name",
    "Frequency",
    "Date",
    "Completed",
    "Target Time (min)",
];

/// One row of the task file as text cells.
#[derive(Debug, Serialize, Deserialize)]
struct TaskRow {
    #[serde(rename = "Task Name")]
    name: String,
    #[serde(rename = "Frequency")]
    frequency: String,
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Completed")]
    completed: String,
    #[serde(rename = "Cook Name", default)]
    cook_name: Option<String>,
    #[serde(rename = "Prep Time (min)", default)]
    prep_minutes: Option<String>,
    #[serde(rename = "Target Time (min)")]
    target_minutes: String,
    #[serde(rename = "Efficiency (%)", default)]
    efficiency: Option<String>,
    #[serde(rename = "Performance Tag", default)]
    tag: Option<String>,
    #[serde(rename = "Last Validated Date", default)]
    last_validated: Option<String>,
}

impl TryFrom<TaskRow> for Task {
    type Error = String;

    fn try_from(row: TaskRow) -> std::result::Result<Self, Self::Error> {
        let name = row.name.trim().to_string();
        if name.is_empty() {
            return Err("empty task name".into());
        }
        let frequency = row.frequency.parse().map_err(|e: CoreError| e.to_string())?;

        let task = Task {
            name,
            frequency,
            date: fields::parse_date(&row.date)?,
            completed: fields::parse_bool(&row.completed)?,
            cook_name: non_empty(row.cook_name.as_deref()).map(str::to_string),
            prep_minutes: fields::parse_opt_minutes(row.prep_minutes.as_deref())?,
            target_minutes: fields::parse_minutes(&row.target_minutes)?,
            efficiency: fields::parse_opt_efficiency(row.efficiency.as_deref())?,
            tag: fields::parse_opt_tag(row.tag.as_deref())?,
            last_validated: fields::parse_opt_date(row.last_validated.as_deref())?,
        };
        task.check_invariant()?;
        Ok(task)
    }
}

impl From<&Task> for TaskRow {
    fn from(task: &Task) -> Self {
        Self {
            name: task.name.clone(),
            frequency: task.frequency.to_string(),
            date: fields::format_date(task.date),
            completed: fields::format_bool(task.completed).to_string(),
            cook_name: task.cook_name.clone(),
            prep_minutes: task.prep_minutes.map(|m| m.to_string()),
            target_minutes: task.target_minutes.to_string(),
            efficiency: task.efficiency.map(|e| e.to_string()),
            tag: task.tag.map(|t| t.to_string()),
            last_validated: task.last_validated.map(fields::format_date),
        }
    }
}

/// Durable task list backed by a CSV file.
#[derive(Debug, Clone)]
pub struct TaskStore {
    path: PathBuf,
}

impl TaskStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the task file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create an empty task file (header only) if none exists.
    ///
    /// Returns whether a file was created.
    pub fn init(&self) -> Result<bool, StorageError> {
        if self.path.exists() {
            return Ok(false);
        }
        self.save(&[])?;
        tracing::info!(path = %self.path.display(), "created empty task file");
        Ok(true)
    }

    /// Load all tasks in file order.
    ///
    /// # Errors
    /// Fails if the file is absent, lacks a required column, or any row is
    /// malformed. Unlike the validation log, the task file is never read
    /// leniently: dropping a row here would delete it on the next save.
    pub fn load(&self) -> Result<Vec<Task>, StorageError> {
        if !self.path.exists() {
            return Err(StorageError::Missing {
                path: self.path.clone(),
            });
        }

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .from_path(&self.path)
            .map_err(|e| StorageError::csv(&self.path, e))?;

        let headers = reader
            .headers()
            .map_err(|e| StorageError::csv(&self.path, e))?
            .clone();
        for column in REQUIRED_COLUMNS {
            if !headers.iter().any(|h| h == column) {
                return Err(StorageError::MissingColumn {
                    path: self.path.clone(),
                    column,
                });
            }
        }

        let mut tasks = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| self.malformed(e.position().map_or(0, |p| p.line()), e.to_string()))?;
            let line = record.position().map_or(0, |p| p.line());
            let row: TaskRow = record
                .deserialize(Some(&headers))
                .map_err(|e| self.malformed(line, e.to_string()))?;
            let task = Task::try_from(row).map_err(|message| self.malformed(line, message))?;
            tasks.push(task);
        }

        tracing::debug!(path = %self.path.display(), count = tasks.len(), "loaded tasks");
        Ok(tasks)
    }

    /// Rewrite the whole file with `tasks`.
    pub fn save(&self, tasks: &[Task]) -> Result<(), StorageError> {
        write_atomic(&self.path, |file| {
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(file);
            writer
                .write_record(TASK_COLUMNS)
                .map_err(|e| StorageError::csv(&self.path, e))?;
            for task in tasks {
                writer
                    .serialize(TaskRow::from(task))
                    .map_err(|e| StorageError::csv(&self.path, e))?;
            }
            writer
                .flush()
                .map_err(|e| StorageError::io(&self.path, e))
        })?;
        tracing::debug!(path = %self.path.display(), count = tasks.len(), "saved tasks");
        Ok(())
    }

    /// Add one task and persist.
    pub fn append(&self, task: Task) -> Result<(), StorageError> {
        let mut tasks = self.load()?;
        tasks.push(task);
        self.save(&tasks)
    }

    /// Find the first task matching `key`.
    pub fn find(&self, key: &TaskKey) -> Result<Option<Task>, StorageError> {
        Ok(self.load()?.into_iter().find(|t| key.matches(t)))
    }

    /// Mutate the first task matching `key` and persist the whole list.
    ///
    /// # Errors
    /// `NotFound` if no task matches; a validation error if the mutation
    /// breaks the task invariant (nothing is written in that case).
    pub fn update<F>(&self, key: &TaskKey, mutate: F) -> Result<Task>
    where
        F: FnOnce(&mut Task),
    {
        let mut tasks = self.load()?;
        let task = tasks
            .iter_mut()
            .find(|t| key.matches(t))
            .ok_or_else(|| CoreError::NotFound(key.to_string()))?;

        mutate(task);
        task.check_invariant()
            .map_err(|message| ValidationError::InvalidValue {
                field: "task".into(),
                message,
            })?;
        let updated = task.clone();

        self.save(&tasks)?;
        Ok(updated)
    }

    fn malformed(&self, line: u64, message: String) -> StorageError {
        StorageError::MalformedRow {
            path: self.path.clone(),
            line,
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::PerformanceTag;
    use crate::task::Frequency;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn store(dir: &TempDir) -> TaskStore {
        TaskStore::new(dir.path().join("tasks.csv"))
    }

    #[test]
    fn load_missing_file_is_storage_error() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(store(&dir).load(), Err(StorageError::Missing { .. })));
    }

    #[test]
    fn init_writes_header_only() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        assert!(store.init().unwrap());
        assert!(!store.init().unwrap());

        let content = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(content.trim_end(), TASK_COLUMNS.join(","));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn save_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        let mut done = Task::new("Clean grill, degrease", Frequency::Weekly, 45, day("2026-10-10"));
        done.completed = true;
        done.cook_name = Some("Rosa".into());
        done.prep_minutes = Some(50);
        done.efficiency = Some(90);
        done.tag = Some(PerformanceTag::Green);
        done.last_validated = Some(day("2026-10-10"));
        let tasks = vec![
            Task::new("Chop onions", Frequency::Daily, 15, day("2026-10-16")),
            done,
        ];

        store.save(&tasks).unwrap();
        assert_eq!(store.load().unwrap(), tasks);
    }

    #[test]
    fn missing_required_column_is_rejected() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        std::fs::write(store.path(), "Task Name,Frequency,Date,Completed\nSalsa,daily,2026-10-16,False\n").unwrap();

        match store.load() {
            Err(StorageError::MissingColumn { column, .. }) => assert_eq!(column, "Target Time (min)"),
            other => panic!("expected missing column, got {other:?}"),
        }
    }

    #[test]
    fn reads_spreadsheet_output() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        std::fs::write(
            store.path(),
            "Task Name,Frequency,Date,Completed,Cook Name,Prep Time (min),Target Time (min),Efficiency (%),Performance Tag,Last Validated Date,Is Due\n\
             Masa,daily,2026-10-15,True,,20.0,15.0,75.0,🟡,2026-10-15,True\n\
             Curtido,weekly,2026-10-16,False,,,30,,,,True\n",
        )
        .unwrap();

        let tasks = store.load().unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].prep_minutes, Some(20));
        assert_eq!(tasks[0].target_minutes, 15);
        assert_eq!(tasks[0].tag, Some(PerformanceTag::Yellow));
        assert!(tasks[0].cook_name.is_none());
        assert!(!tasks[1].completed);
        assert!(tasks[1].last_validated.is_none());
    }

    #[test]
    fn malformed_row_reports_line() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        std::fs::write(
            store.path(),
            "Task Name,Frequency,Date,Completed,Target Time (min)\n\
             Salsa,daily,2026-10-16,False,10\n\
             Beans,monthly,2026-10-16,False,10\n",
        )
        .unwrap();

        match store.load() {
            Err(StorageError::MalformedRow { line, message, .. }) => {
                assert_eq!(line, 3);
                assert!(message.contains("monthly"));
            }
            other => panic!("expected malformed row, got {other:?}"),
        }
    }

    #[test]
    fn update_mutates_first_match_and_persists() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store
            .save(&[
                Task::new("Salsa", Frequency::Daily, 10, day("2026-10-15")),
                Task::new("Salsa", Frequency::Daily, 10, day("2026-10-16")),
            ])
            .unwrap();

        let key = TaskKey::new("Salsa").on(day("2026-10-16"));
        let updated = store.update(&key, |t| t.cook_name = Some("Ana".into())).unwrap();
        assert_eq!(updated.cook_name.as_deref(), Some("Ana"));

        let tasks = store.load().unwrap();
        assert!(tasks[0].cook_name.is_none());
        assert_eq!(tasks[1].cook_name.as_deref(), Some("Ana"));
    }

    #[test]
    fn update_unknown_key_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.init().unwrap();
        let err = store.update(&TaskKey::new("Nope"), |_| {}).unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[test]
    fn update_refuses_to_break_invariant() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store
            .append(Task::new("Salsa", Frequency::Daily, 10, day("2026-10-16")))
            .unwrap();

        let err = store.update(&TaskKey::new("Salsa"), |t| t.completed = true).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(!store.load().unwrap()[0].completed);
    }
}
