//! One download batch: resolve inputs, run the coordinator, print the summary.

use anyhow::Result;
use sfd_core::config::SfdConfig;
use sfd_core::{BatchReport, Coordinator, ProgressBoard, RunPlan, RunRequest};
use std::sync::Arc;

pub async fn run_download(request: RunRequest, cfg: &SfdConfig) -> Result<BatchReport> {
    let plan = RunPlan::resolve(request, cfg)?;

    println!("total download files: {}", plan.tasks.len());

    let progress = Arc::new(ProgressBoard::stderr(cfg.progress_width));
    let coordinator = Coordinator::new(
        plan.parallelism,
        &plan.output_dir,
        progress,
        cfg.fetch_options(),
    );
    let report = coordinator.run_all(plan.tasks).await;

    println!("{}", report);
    Ok(report)
}
