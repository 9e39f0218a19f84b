//! Append-only validation log.
//!
//! Each successful validation adds one row. Rows are never rewritten, so
//! append order is chronological order. Reading is lenient: a row that
//! cannot be parsed is skipped with a warning instead of failing the read,
//! which keeps a partly damaged log usable for duplicate checks and display.

use std::fs::OpenOptions;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::scoring::PerformanceTag;
use crate::storage::fields::{self, non_empty};
use crate::storage::DuplicatePolicy;

/// Header of the validation log, in write order.
pub const LOG_COLUMNS: [&str; 8] = [
    "Task Name",
    "Date",
    "Cook Name",
    "Prep Time (min)",
    "Target Time (min)",
    "Efficiency (%)",
    "Performance Tag",
    "Validation Time",
];

/// One completed validation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationRecord {
    pub task_name: String,
    pub date: NaiveDate,
    pub cook_name: Option<String>,
    pub prep_minutes: u32,
    pub target_minutes: u32,
    pub efficiency: u8,
    pub tag: PerformanceTag,
    /// Wall-clock time of the validation, second precision
    pub validated_at: NaiveDateTime,
}

impl ValidationRecord {
    /// Whether this record collides with a validation of `task_name` on
    /// `date` by `cook_name` under `policy`.
    pub fn collides_with(
        &self,
        policy: DuplicatePolicy,
        task_name: &str,
        date: NaiveDate,
        cook_name: Option<&str>,
    ) -> bool {
        if self.task_name != task_name || self.date != date {
            return false;
        }
        match policy {
            DuplicatePolicy::TaskDate => true,
            DuplicatePolicy::TaskDateCook => {
                self.cook_name.as_deref().unwrap_or("") == non_empty(cook_name).unwrap_or("")
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct LogRow {
    #[serde(rename = "Task Name")]
    task_name: String,
    #[serde(rename = "Date")]
    date: String,
    // Older logs were written without a cook column.
    #[serde(rename = "Cook Name", default)]
    cook_name: Option<String>,
    #[serde(rename = "Prep Time (min)")]
    prep_minutes: String,
    #[serde(rename = "Target Time (min)")]
    target_minutes: String,
    #[serde(rename = "Efficiency (%)")]
    efficiency: String,
    #[serde(rename = "Performance Tag")]
    tag: String,
    #[serde(rename = "Validation Time")]
    validated_at: String,
}

impl LogRow {
    /// Cell for `column`; unknown columns are left blank.
    fn cell(&self, column: &str) -> &str {
        match column {
            "Task Name" => &self.task_name,
            "Date" => &self.date,
            "Cook Name" => self.cook_name.as_deref().unwrap_or(""),
            "Prep Time (min)" => &self.prep_minutes,
            "Target Time (min)" => &self.target_minutes,
            "Efficiency (%)" => &self.efficiency,
            "Performance Tag" => &self.tag,
            "Validation Time" => &self.validated_at,
            _ => "",
        }
    }
}

impl TryFrom<LogRow> for ValidationRecord {
    type Error = String;

    fn try_from(row: LogRow) -> Result<Self, Self::Error> {
        let task_name = row.task_name.trim().to_string();
        if task_name.is_empty() {
            return Err("empty task name".into());
        }
        Ok(Self {
            task_name,
            date: fields::parse_date(&row.date)?,
            cook_name: non_empty(row.cook_name.as_deref()).map(str::to_string),
            prep_minutes: fields::parse_minutes(&row.prep_minutes)?,
            target_minutes: fields::parse_minutes(&row.target_minutes)?,
            efficiency: fields::parse_efficiency(&row.efficiency)?,
            tag: fields::parse_tag(&row.tag)?,
            validated_at: fields::parse_timestamp(&row.validated_at)?,
        })
    }
}

impl From<&ValidationRecord> for LogRow {
    fn from(record: &ValidationRecord) -> Self {
        Self {
            task_name: record.task_name.clone(),
            date: fields::format_date(record.date),
            cook_name: record.cook_name.clone(),
            prep_minutes: record.prep_minutes.to_string(),
            target_minutes: record.target_minutes.to_string(),
            efficiency: record.efficiency.to_string(),
            tag: record.tag.to_string(),
            validated_at: fields::format_timestamp(record.validated_at),
        }
    }
}

/// CSV-backed append-only validation log.
#[derive(Debug, Clone)]
pub struct ValidationLedger {
    path: PathBuf,
    policy: DuplicatePolicy,
}

impl ValidationLedger {
    pub fn new(path: impl Into<PathBuf>, policy: DuplicatePolicy) -> Self {
        Self {
            path: path.into(),
            policy,
        }
    }

    /// Get the log file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    /// All readable records in append order.
    ///
    /// A missing file is an empty log. Rows that fail to parse are skipped
    /// and reported with `tracing::warn!`.
    ///
    /// # Errors
    /// Only when the file exists but cannot be opened or its header read.
    pub fn records(&self) -> Result<Vec<ValidationRecord>, StorageError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .flexible(true)
            .from_path(&self.path)
            .map_err(|e| StorageError::csv(&self.path, e))?;
        let headers = reader
            .headers()
            .map_err(|e| StorageError::csv(&self.path, e))?
            .clone();

        let mut records = Vec::new();
        let mut skipped = 0usize;
        for (index, result) in reader.records().enumerate() {
            let parsed = result
                .map_err(|e| e.to_string())
                .and_then(|record| {
                    if record.iter().all(|cell| cell.trim().is_empty()) {
                        return Ok(None);
                    }
                    let row: LogRow = record.deserialize(Some(&headers)).map_err(|e| e.to_string())?;
                    ValidationRecord::try_from(row).map(Some)
                });
            match parsed {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {}
                Err(error) => {
                    skipped += 1;
                    tracing::warn!(
                        path = %self.path.display(),
                        row = index + 1,
                        %error,
                        "skipping malformed validation log row"
                    );
                }
            }
        }

        if skipped > 0 {
            tracing::warn!(path = %self.path.display(), skipped, "validation log has unreadable rows");
        }
        Ok(records)
    }

    /// Whether a validation of `task_name` on `date` is already recorded.
    ///
    /// The cook name only takes part when the policy is
    /// [`DuplicatePolicy::TaskDateCook`] and the log has a cook column. A
    /// log without one cannot tell cooks apart, so it is checked per task
    /// and date.
    pub fn has_duplicate(
        &self,
        task_name: &str,
        date: NaiveDate,
        cook_name: Option<&str>,
    ) -> Result<bool, StorageError> {
        let policy = self.effective_policy()?;
        Ok(self
            .records()?
            .iter()
            .any(|r| r.collides_with(policy, task_name, date, cook_name)))
    }

    /// Policy the current file can enforce.
    pub fn effective_policy(&self) -> Result<DuplicatePolicy, StorageError> {
        if self.policy == DuplicatePolicy::TaskDate || self.records_cooks()? {
            return Ok(self.policy);
        }
        tracing::warn!(
            path = %self.path.display(),
            "validation log has no Cook Name column; checking duplicates per task and date"
        );
        Ok(DuplicatePolicy::TaskDate)
    }

    /// Whether rows in this log carry a cook name. A missing or empty file
    /// gets the full header on first append, so it does.
    fn records_cooks(&self) -> Result<bool, StorageError> {
        Ok(self
            .existing_header()?
            .map_or(true, |columns| columns.iter().any(|c| c == "Cook Name")))
    }

    /// Append one record, creating the file with a header if needed.
    ///
    /// Existing rows are never rewritten. The row follows the column order
    /// of the existing header, so logs written without a cook column stay
    /// consistent (the cook name is dropped for those, and duplicates are
    /// then checked per task and date).
    pub fn append(&self, record: &ValidationRecord) -> Result<(), StorageError> {
        let header = self.existing_header()?;
        let columns: Vec<String> = match &header {
            Some(columns) => columns.clone(),
            None => LOG_COLUMNS.iter().map(|c| c.to_string()).collect(),
        };
        if record.cook_name.is_some() && !columns.iter().any(|c| c == "Cook Name") {
            tracing::warn!(
                path = %self.path.display(),
                "validation log has no Cook Name column; cook not recorded"
            );
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| StorageError::io(&self.path, e))?;
        if header.is_some() && !self.ends_with_newline()? {
            file.write_all(b"\n").map_err(|e| StorageError::io(&self.path, e))?;
        }

        let row = LogRow::from(record);
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if header.is_none() {
            writer
                .write_record(&columns)
                .map_err(|e| StorageError::csv(&self.path, e))?;
        }
        writer
            .write_record(columns.iter().map(|c| row.cell(c)))
            .map_err(|e| StorageError::csv(&self.path, e))?;
        writer.flush().map_err(|e| StorageError::io(&self.path, e))?;

        let file = writer
            .into_inner()
            .map_err(|e| StorageError::io(&self.path, e.into_error()))?;
        file.sync_all().map_err(|e| StorageError::io(&self.path, e))?;

        tracing::debug!(
            path = %self.path.display(),
            task = %record.task_name,
            date = %record.date,
            "appended validation record"
        );
        Ok(())
    }

    /// Header of the current file, or `None` if it is missing or empty.
    fn existing_header(&self) -> Result<Option<Vec<String>>, StorageError> {
        let empty = match std::fs::metadata(&self.path) {
            Ok(meta) => meta.len() == 0,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
            Err(e) => return Err(StorageError::io(&self.path, e)),
        };
        if empty {
            return Ok(None);
        }

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .from_path(&self.path)
            .map_err(|e| StorageError::csv(&self.path, e))?;
        let headers = reader
            .headers()
            .map_err(|e| StorageError::csv(&self.path, e))?;
        Ok(Some(headers.iter().map(str::to_string).collect()))
    }

    fn ends_with_newline(&self) -> Result<bool, StorageError> {
        let mut file = std::fs::File::open(&self.path).map_err(|e| StorageError::io(&self.path, e))?;
        let mut last = [0u8; 1];
        file.seek(SeekFrom::End(-1))
            .and_then(|_| file.read_exact(&mut last))
            .map_err(|e| StorageError::io(&self.path, e))?;
        Ok(last[0] == b'\n')
    }
}
