//! Kitchen task records.
//!
//! A task is a recurring (or one-off) prep or cleaning job with a target
//! time. Validating it records who did it, how long it took and the
//! resulting efficiency score.

pub mod due;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::ledger::ValidationRecord;
use crate::scoring::PerformanceTag;

/// How often a task repeats.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    /// One-off task
    Once,
    /// Every day
    Daily,
    /// Once every seven days
    Weekly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Once => "once",
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "once" => Ok(Frequency::Once),
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            _ => Err(CoreError::InvalidFrequency(s.to_string())),
        }
    }
}

/// A kitchen task.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub name: String,
    pub frequency: Frequency,
    /// Scheduled date; moved to the validation day on each validation
    pub date: NaiveDate,
    pub completed: bool,
    pub cook_name: Option<String>,
    /// Recorded prep time in minutes
    pub prep_minutes: Option<u32>,
    /// Target time in minutes (at least 1)
    pub target_minutes: u32,
    /// Efficiency percentage (0-100)
    pub efficiency: Option<u8>,
    pub tag: Option<PerformanceTag>,
    pub last_validated: Option<NaiveDate>,
}

impl Task {
    /// Create an open task scheduled for `date`.
    pub fn new(name: impl Into<String>, frequency: Frequency, target_minutes: u32, date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            frequency,
            date,
            completed: false,
            cook_name: None,
            prep_minutes: None,
            target_minutes,
            efficiency: None,
            tag: None,
            last_validated: None,
        }
    }

    /// Key identifying this exact row.
    pub fn key(&self) -> TaskKey {
        TaskKey::new(self.name.clone()).on(self.date)
    }

    /// Whether the due rule for this task's frequency fires on `today`.
    pub fn is_due_on(&self, today: NaiveDate) -> bool {
        due::is_due(self.frequency, self.last_validated, today)
    }

    /// Efficiency and tag must be present exactly when the task is completed.
    pub fn check_invariant(&self) -> Result<(), String> {
        if self.target_minutes == 0 {
            return Err("target time must be at least 1 minute".into());
        }
        let scored = self.efficiency.is_some() && self.tag.is_some();
        let unscored = self.efficiency.is_none() && self.tag.is_none();
        match (self.completed, scored, unscored) {
            (true, true, _) | (false, _, true) => Ok(()),
            (true, _, _) => Err("completed task is missing efficiency or performance tag".into()),
            (false, _, _) => Err("open task carries an efficiency or performance tag".into()),
        }
    }

    /// Record a validation on this task.
    pub fn apply_validation(&mut self, record: &ValidationRecord) {
        self.completed = true;
        self.cook_name = record.cook_name.clone();
        self.prep_minutes = Some(record.prep_minutes);
        self.efficiency = Some(record.efficiency);
        self.tag = Some(record.tag);
        self.date = record.date;
        self.last_validated = Some(record.date);
    }
}

/// Logical key of a task: its name, optionally narrowed to a scheduled date.
///
/// Without a date the first task with that name matches.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaskKey {
    pub name: String,
    pub date: Option<NaiveDate>,
}

impl TaskKey {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            date: None,
        }
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn matches(&self, task: &Task) -> bool {
        task.name == self.name && self.date.map_or(true, |d| d == task.date)
    }
}

impl fmt::Display for TaskKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.date {
            Some(date) => write!(f, "{} ({})", self.name, date),
            None => f.write_str(&self.name),
        }
    }
}
