//! Add-task and validate-task orchestration.
//!
//! [`TaskLifecycleController`] is the only writer of both backing files.
//! Each mutating call holds the process-wide locks for the task file and
//! the validation log for its whole read-modify-write cycle.

use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::{Local, NaiveDate, NaiveDateTime, Timelike};

use crate::error::{CoreError, Result, ValidationError};
use crate::ledger::{ValidationLedger, ValidationRecord};
use crate::scoring;
use crate::storage::fields::non_empty;
use crate::storage::{hold, locks_for, Config, TaskStore};
use crate::task::{due, Frequency, Task, TaskKey};

/// Coordinates the task store, the validation ledger and scoring.
#[derive(Debug, Clone)]
pub struct TaskLifecycleController {
    store: TaskStore,
    ledger: ValidationLedger,
}

impl TaskLifecycleController {
    pub fn new(store: TaskStore, ledger: ValidationLedger) -> Self {
        Self { store, ledger }
    }

    /// Build from config, resolving relative file paths against `base`.
    pub fn from_config(config: &Config, base: &Path) -> Self {
        Self::new(
            TaskStore::new(config.task_file_in(base)),
            ValidationLedger::new(
                config.validation_log_in(base),
                config.validation.duplicate_policy,
            ),
        )
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn ledger(&self) -> &ValidationLedger {
        &self.ledger
    }

    fn write_locks(&self) -> Vec<Arc<Mutex<()>>> {
        locks_for(&[self.store.path(), self.ledger.path()])
    }

    /// Create an empty task file if none exists.
    ///
    /// Returns `true` if the file was created.
    pub fn init_store(&self) -> Result<bool> {
        let locks = self.write_locks();
        let _guards = hold(&locks);
        Ok(self.store.init()?)
    }

    /// Add a task scheduled for today.
    pub fn add_task(&self, name: &str, frequency: Frequency, target_minutes: i64) -> Result<Task> {
        self.add_task_on(name, frequency, target_minutes, Local::now().date_naive())
    }

    /// Add a task scheduled for `today`.
    ///
    /// # Errors
    /// `Validation` if the name is blank or the target is under one minute.
    pub fn add_task_on(
        &self,
        name: &str,
        frequency: Frequency,
        target_minutes: i64,
        today: NaiveDate,
    ) -> Result<Task> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        let target_minutes = u32::try_from(target_minutes)
            .ok()
            .filter(|m| *m >= 1)
            .ok_or_else(|| ValidationError::InvalidValue {
                field: "target_minutes".into(),
                message: format!("{target_minutes} min (must be a whole number of at least 1)"),
            })?;

        let locks = self.write_locks();
        let _guards = hold(&locks);

        let task = Task::new(name, frequency, target_minutes, today);
        self.store.init()?;
        self.store.append(task.clone())?;

        tracing::info!(task = %task.name, %frequency, target_minutes, "task added");
        Ok(task)
    }

    /// Validate a task now.
    pub fn validate_task(
        &self,
        key: &TaskKey,
        actual_minutes: i64,
        cook_name: Option<&str>,
    ) -> Result<(Task, ValidationRecord)> {
        self.validate_task_at(key, actual_minutes, cook_name, Local::now().naive_local())
    }

    /// Validate a task at `now`.
    ///
    /// The ledger row is written before the task row. If the task write then
    /// fails, the ledger still holds the validation and a retry is rejected
    /// as a duplicate instead of scoring the same work twice.
    ///
    /// # Errors
    /// `NotFound`, `InvalidDuration`, `AlreadyValidated`, or a storage error.
    pub fn validate_task_at(
        &self,
        key: &TaskKey,
        actual_minutes: i64,
        cook_name: Option<&str>,
        now: NaiveDateTime,
    ) -> Result<(Task, ValidationRecord)> {
        let locks = self.write_locks();
        let _guards = hold(&locks);

        let task = self
            .store
            .find(key)?
            .ok_or_else(|| CoreError::NotFound(key.to_string()))?;

        if actual_minutes < 1 {
            return Err(CoreError::InvalidDuration {
                field: "actual_minutes",
                minutes: actual_minutes,
            });
        }

        let today = now.date();
        let cook_name = non_empty(cook_name).map(str::to_string);
        if self
            .ledger
            .has_duplicate(&task.name, today, cook_name.as_deref())?
        {
            return Err(CoreError::AlreadyValidated {
                task: task.name.clone(),
                date: today,
            });
        }

        let score = scoring::score(i64::from(task.target_minutes), actual_minutes)?;
        let prep_minutes = u32::try_from(actual_minutes).map_err(|_| CoreError::InvalidDuration {
            field: "actual_minutes",
            minutes: actual_minutes,
        })?;

        let record = ValidationRecord {
            task_name: task.name.clone(),
            date: today,
            cook_name,
            prep_minutes,
            target_minutes: task.target_minutes,
            efficiency: score.efficiency,
            tag: score.tag,
            validated_at: now.with_nanosecond(0).unwrap_or(now),
        };
        self.ledger.append(&record)?;

        let updated = self
            .store
            .update(&task.key(), |t| t.apply_validation(&record))
            .inspect_err(|e| {
                tracing::error!(
                    task = %record.task_name,
                    error = %e,
                    "validation logged but task file was not updated"
                );
            })?;

        tracing::info!(
            task = %updated.name,
            cook = record.cook_name.as_deref().unwrap_or(""),
            efficiency = record.efficiency,
            tag = %record.tag,
            "task validated"
        );
        Ok((updated, record))
    }

    /// Tasks still open today.
    pub fn due_today(&self) -> Result<Vec<Task>> {
        self.due_on(Local::now().date_naive())
    }

    /// Tasks still open on `today`.
    pub fn due_on(&self, today: NaiveDate) -> Result<Vec<Task>> {
        Ok(due::due_today(&self.store.load()?, today))
    }

    /// Every readable validation record, oldest first.
    pub fn validation_log(&self) -> Result<Vec<ValidationRecord>> {
        Ok(self.ledger.records()?)
    }
}
