//! # Mise en Place Core Library
//!
//! Business logic for a kitchen task tracker: which prep and cleaning tasks
//! are due today, who validated them, how long they took and how that
//! compares with the target time. All state lives in two CSV files. The
//! CLI is a thin layer over this crate.
//!
//! ## Key Components
//!
//! - [`TaskStore`]: task list persisted with atomic full rewrites
//! - [`task::due`]: due-date rules per [`Frequency`]
//! - [`ValidationLedger`]: append-only validation log with duplicate checks
//! - [`scoring`]: efficiency percentage and performance tag
//! - [`TaskLifecycleController`]: add-task and validate-task
//! - [`Authenticator`]: pluggable staff sign-in
//! - [`Config`]: TOML configuration

pub mod auth;
pub mod error;
pub mod ledger;
pub mod lifecycle;
pub mod scoring;
pub mod stats;
pub mod storage;
pub mod task;

pub use auth::{hash_secret, Authenticator, Principal, StaticAuthenticator};
pub use error::{AuthError, ConfigError, CoreError, StorageError, ValidationError};
pub use ledger::{ValidationLedger, ValidationRecord};
pub use lifecycle::TaskLifecycleController;
pub use scoring::{score, PerformanceTag, Score};
pub use stats::{summarize, CookSummary};
pub use storage::{Config, DuplicatePolicy, TaskStore};
pub use task::due::{due_today, is_due, partition_due};
pub use task::{Frequency, Task, TaskKey};
