//! Cell codecs shared by the task file and the validation log.
//!
//! Files may have been written by a spreadsheet tool, so parsing is
//! forgiving about case, surrounding blanks and `.0` suffixes on integers.

use chrono::{NaiveDate, NaiveDateTime};

use crate::scoring::PerformanceTag;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Treat blank cells as absent.
pub fn non_empty(cell: Option<&str>) -> Option<&str> {
    cell.map(str::trim).filter(|s| !s.is_empty())
}

pub fn parse_bool(cell: &str) -> Result<bool, String> {
    match cell.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" | "" => Ok(false),
        other => Err(format!("expected True or False, got '{other}'")),
    }
}

pub fn format_bool(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

/// Parse a whole number of minutes; `15.0` is accepted, `15.5` is not.
pub fn parse_minutes(cell: &str) -> Result<u32, String> {
    let cell = cell.trim();
    let digits = cell.strip_suffix(".0").unwrap_or(cell);
    digits
        .parse::<u32>()
        .map_err(|_| format!("expected whole minutes, got '{cell}'"))
}

pub fn parse_opt_minutes(cell: Option<&str>) -> Result<Option<u32>, String> {
    non_empty(cell).map(parse_minutes).transpose()
}

pub fn parse_efficiency(cell: &str) -> Result<u8, String> {
    let value = parse_minutes(cell).map_err(|_| format!("expected a percentage, got '{}'", cell.trim()))?;
    if value > 100 {
        return Err(format!("efficiency {value} exceeds 100"));
    }
    Ok(value as u8)
}

pub fn parse_opt_efficiency(cell: Option<&str>) -> Result<Option<u8>, String> {
    non_empty(cell).map(parse_efficiency).transpose()
}

pub fn parse_date(cell: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(cell.trim(), DATE_FORMAT)
        .map_err(|e| format!("bad date '{}': {e}", cell.trim()))
}

pub fn parse_opt_date(cell: Option<&str>) -> Result<Option<NaiveDate>, String> {
    non_empty(cell).map(parse_date).transpose()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_timestamp(cell: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(cell.trim(), TIMESTAMP_FORMAT)
        .map_err(|e| format!("bad timestamp '{}': {e}", cell.trim()))
}

pub fn format_timestamp(at: NaiveDateTime) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

pub fn parse_tag(cell: &str) -> Result<PerformanceTag, String> {
    cell.parse()
}

pub fn parse_opt_tag(cell: Option<&str>) -> Result<Option<PerformanceTag>, String> {
    non_empty(cell).map(parse_tag).transpose()
}
