//! Efficiency scoring for validated tasks.
//!
//! Efficiency compares the target time against the time actually spent:
//! finishing on or under target scores 100, taking twice as long scores 50.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, Result};

/// Lowest efficiency tagged green.
pub const GREEN_THRESHOLD: u8 = 90;
/// Lowest efficiency tagged yellow.
pub const YELLOW_THRESHOLD: u8 = 70;

/// Performance band of a validation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceTag {
    /// On target or better (>= 90%)
    Green,
    /// Acceptable (70-89%)
    Yellow,
    /// Slow (< 70%)
    Red,
}

impl PerformanceTag {
    pub fn from_efficiency(efficiency: u8) -> Self {
        if efficiency >= GREEN_THRESHOLD {
            PerformanceTag::Green
        } else if efficiency >= YELLOW_THRESHOLD {
            PerformanceTag::Yellow
        } else {
            PerformanceTag::Red
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PerformanceTag::Green => "green",
            PerformanceTag::Yellow => "yellow",
            PerformanceTag::Red => "red",
        }
    }
}

impl fmt::Display for PerformanceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PerformanceTag {
    type Err = String;

    /// Accepts the names and the emoji markers older files were written with.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "green" | "Green" | "🟢" => Ok(PerformanceTag::Green),
            "yellow" | "Yellow" | "🟡" => Ok(PerformanceTag::Yellow),
            "red" | "Red" | "🔴" => Ok(PerformanceTag::Red),
            other => Err(format!("unknown performance tag '{other}'")),
        }
    }
}

/// Result of scoring one validation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Score {
    /// Efficiency percentage, capped at 100
    pub efficiency: u8,
    pub tag: PerformanceTag,
}

/// Score a validation from target and actual minutes.
///
/// `efficiency = min(100, floor(target / actual * 100))`. Both durations
/// must be at least one minute.
pub fn score(target_minutes: i64, actual_minutes: i64) -> Result<Score> {
    if target_minutes < 1 {
        return Err(CoreError::InvalidDuration {
            field: "target_minutes",
            minutes: target_minutes,
        });
    }
    if actual_minutes < 1 {
        return Err(CoreError::InvalidDuration {
            field: "actual_minutes",
            minutes: actual_minutes,
        });
    }

    // Integer division floors for positive operands.
    let ratio = (target_minutes.saturating_mul(100) / actual_minutes).min(100);
    let efficiency = ratio as u8;

    Ok(Score {
        efficiency,
        tag: PerformanceTag::from_efficiency(efficiency),
    })
}
