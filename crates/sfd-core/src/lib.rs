//! Core of `sfd`: downloads a list of URLs concurrently, at most N at a time,
//! with a progress bar per file.
//!
//! links → tasks → coordinator (slot pool) → workers (curl GET → file) →
//! batch report.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod links;
pub mod logging;
pub mod plan;
pub mod progress;
pub mod slots;
pub mod task;
pub mod worker;

pub use coordinator::{BatchReport, Coordinator, DownloadOutcome};
pub use error::ConfigError;
pub use plan::{RunPlan, RunRequest};
pub use progress::ProgressBoard;
pub use task::DownloadTask;
