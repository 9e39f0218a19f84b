//! Per-cook validation summary.
//!
//! Groups the validation log by cook and reports how many tasks each cook
//! validated, their mean efficiency and how their results spread across
//! the green/yellow/red bands.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ledger::ValidationRecord;
use crate::scoring::PerformanceTag;

/// Group label for validations recorded without a cook.
pub const UNASSIGNED: &str = "unassigned";

/// Summary for one cook.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CookSummary {
    pub cook: String,
    pub validations: u64,
    /// Mean efficiency, rounded to one decimal
    pub mean_efficiency: f64,
    pub green: u64,
    pub yellow: u64,
    pub red: u64,
}

/// Summarize records per cook, sorted by cook name.
pub fn summarize(records: &[ValidationRecord]) -> Vec<CookSummary> {
    let mut groups: BTreeMap<&str, Vec<&ValidationRecord>> = BTreeMap::new();
    for record in records {
        let cook = record.cook_name.as_deref().unwrap_or(UNASSIGNED);
        groups.entry(cook).or_default().push(record);
    }

    groups
        .into_iter()
        .map(|(cook, group)| {
            let count = group.len() as u64;
            let total: u64 = group.iter().map(|r| u64::from(r.efficiency)).sum();
            let mean = total as f64 / count as f64;
            let band = |tag: PerformanceTag| group.iter().filter(|r| r.tag == tag).count() as u64;

            CookSummary {
                cook: cook.to_string(),
                validations: count,
                mean_efficiency: (mean * 10.0).round() / 10.0,
                green: band(PerformanceTag::Green),
                yellow: band(PerformanceTag::Yellow),
                red: band(PerformanceTag::Red),
            }
        })
        .collect()
}
