//! CLI for sfd.

mod run;

use anyhow::Result;
use clap::Parser;
use sfd_core::config::{self, SfdConfig};
use sfd_core::{BatchReport, RunRequest};
use std::path::PathBuf;

pub use run::run_download;

/// Download remote files in parallel, one progress bar per file.
#[derive(Debug, Parser)]
#[command(name = "sfd")]
#[command(about = "sfd: simple parallel file downloader", long_about = None)]
pub struct Cli {
    /// Number of parallel downloads (default: number of CPUs).
    #[arg(short = 'n', long = "parallel", value_name = "N", allow_negative_numbers = true)]
    pub parallel: Option<i64>,

    /// Output path for downloaded files (default: current directory).
    #[arg(short = 'o', long = "output", value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Individual remote file to download.
    #[arg(short = 'f', long = "file", value_name = "URL")]
    pub file: Option<String>,

    /// File listing remote files to download, one URL per line.
    #[arg(short = 'l', long = "list", value_name = "PATH")]
    pub list: Option<PathBuf>,
}

impl Cli {
    pub fn into_request(self) -> RunRequest {
        RunRequest {
            parallelism: self.parallel,
            output_dir: self.output,
            url: self.file,
            list_file: self.list,
        }
    }
}

pub async fn run_from_args() -> Result<BatchReport> {
    let cli = Cli::parse();
    let cfg = match config::load_or_init() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::warn!("config unavailable, using defaults: {:#}", e);
            SfdConfig::default()
        }
    };
    tracing::debug!("loaded config: {:?}", cfg);

    run_download(cli.into_request(), &cfg).await
}
