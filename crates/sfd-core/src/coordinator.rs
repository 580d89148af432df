//! Download coordinator: runs every task of a batch with at most N in flight.
//!
//! The dispatch loop takes a slot from the `SlotPool` before spawning each
//! task, so it blocks while the pool is full. Each task holds its slot until
//! its worker returns. Outcomes come back through the `JoinSet` and are
//! aggregated here; workers never touch a shared failure list.

use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;

use tokio::task::{Id, JoinError};

use crate::progress::ProgressBoard;
use crate::slots::SlotPool;
use crate::task::DownloadTask;
use crate::worker::{self, FetchError, FetchOptions};

/// Result of one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Succeeded { url: String, bytes: u64 },
    /// `message` is `"<url>: <cause>"`.
    Failed { url: String, message: String },
}

impl DownloadOutcome {
    fn from_result(url: String, result: Result<u64, FetchError>) -> Self {
        match result {
            Ok(bytes) => DownloadOutcome::Succeeded { url, bytes },
            Err(e) => {
                let message = format!("{}: {}", url, e);
                DownloadOutcome::Failed { url, message }
            }
        }
    }

    fn panicked(url: String) -> Self {
        let message = format!("{}: download worker panicked", url);
        DownloadOutcome::Failed { url, message }
    }

    /// The task never produced an outcome (cancelled or died outside the
    /// worker's own panic guard).
    fn lost(url: String, err: &JoinError) -> Self {
        let message = format!("{}: download task join: {}", url, err);
        DownloadOutcome::Failed { url, message }
    }
}

/// Maps a joined task back to its outcome. `in_flight` holds the URL of every
/// task not yet joined, keyed by task id.
fn settle(
    in_flight: &mut HashMap<Id, String>,
    joined: Result<(Id, DownloadOutcome), JoinError>,
) -> DownloadOutcome {
    match joined {
        Ok((id, outcome)) => {
            in_flight.remove(&id);
            outcome
        }
        Err(err) => {
            let url = in_flight
                .remove(&err.id())
                .unwrap_or_else(|| "<unknown url>".to_string());
            DownloadOutcome::lost(url, &err)
        }
    }
}

/// Aggregated result of a batch. `Display` renders the summary block:
/// the result line, then one line per failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub total: usize,
    pub succeeded: usize,
    /// Failure messages in completion order (unordered with respect to input).
    pub failures: Vec<String>,
}

impl BatchReport {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    fn record(&mut self, outcome: DownloadOutcome) {
        match outcome {
            DownloadOutcome::Succeeded { url, bytes } => {
                tracing::debug!(%url, bytes, "download succeeded");
                self.succeeded += 1;
            }
            DownloadOutcome::Failed { url, message } => {
                tracing::warn!(%url, "{}", message);
                self.failures.push(message);
            }
        }
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "download result, success: {}, error: {}",
            self.succeeded,
            self.failed()
        )?;
        for line in &self.failures {
            write!(f, "\n{}", line)?;
        }
        Ok(())
    }
}

/// Owns the slot pool and progress board of one batch.
pub struct Coordinator {
    slots: SlotPool,
    dest_dir: PathBuf,
    progress: Arc<ProgressBoard>,
    options: FetchOptions,
}

impl Coordinator {
    /// `parallelism` below 1 is treated as 1; callers validate it up front.
    pub fn new(
        parallelism: usize,
        dest_dir: impl Into<PathBuf>,
        progress: Arc<ProgressBoard>,
        options: FetchOptions,
    ) -> Self {
        Self {
            slots: SlotPool::new(parallelism),
            dest_dir: dest_dir.into(),
            progress,
            options,
        }
    }

    pub fn slots(&self) -> &SlotPool {
        &self.slots
    }

    pub fn progress(&self) -> &ProgressBoard {
        &self.progress
    }

    /// Downloads every task into the destination directory.
    pub async fn run_all(&self, tasks: Vec<DownloadTask>) -> BatchReport {
        let dest_dir = self.dest_dir.clone();
        let progress = Arc::clone(&self.progress);
        let options = self.options;
        self.run_with(tasks, move |task| {
            worker::fetch(task, &dest_dir, &progress, &options)
        })
        .await
    }

    /// Runs `fetch` once per task on the blocking pool, at most
    /// `parallelism` at a time, and waits for all of them.
    pub async fn run_with<F>(&self, tasks: Vec<DownloadTask>, fetch: F) -> BatchReport
    where
        F: Fn(&DownloadTask) -> Result<u64, FetchError> + Send + Sync + 'static,
    {
        let mut report = BatchReport {
            total: tasks.len(),
            ..BatchReport::default()
        };
        if tasks.is_empty() {
            return report;
        }
        tracing::info!(
            total = report.total,
            parallelism = self.slots.capacity(),
            dest = %self.dest_dir.display(),
            "batch started"
        );

        let fetch = Arc::new(fetch);
        let mut join_set = tokio::task::JoinSet::new();
        let mut in_flight: HashMap<Id, String> = HashMap::new();

        for task in tasks {
            let slot = match self.slots.acquire().await {
                Ok(slot) => slot,
                Err(e) => {
                    report.record(DownloadOutcome::Failed {
                        message: format!("{}: no download slot: {}", task.url, e),
                        url: task.url,
                    });
                    continue;
                }
            };
            tracing::debug!(url = %task.url, in_use = self.slots.in_use(), "dispatch");
            let fetch = Arc::clone(&fetch);
            let url = task.url.clone();
            let handle = join_set.spawn_blocking(move || {
                let _slot = slot;
                match panic::catch_unwind(AssertUnwindSafe(|| (*fetch)(&task))) {
                    Ok(result) => DownloadOutcome::from_result(task.url, result),
                    Err(_) => DownloadOutcome::panicked(task.url),
                }
            });
            in_flight.insert(handle.id(), url);
        }

        while let Some(joined) = join_set.join_next_with_id().await {
            report.record(settle(&mut in_flight, joined));
        }

        self.progress.wait();
        tracing::info!(
            total = report.total,
            succeeded = report.succeeded,
            failed = report.failed(),
            peak_in_flight = self.slots.peak(),
            "batch finished"
        );
        report
    }
}
