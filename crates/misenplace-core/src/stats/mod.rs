//! Statistics module for Mise en Place
//!
//! Read-only analytics over the validation log.

mod cook_summary;

pub use cook_summary::{summarize, CookSummary, UNASSIGNED};
