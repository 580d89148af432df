//! Configuration errors raised before any download starts.

use std::path::PathBuf;

use thiserror::Error;

/// Invalid flags or inputs. Fatal: the batch never starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid remote file address: {0}")]
    InvalidUrl(String),

    #[error("list of remote files not exist: {}", path.display())]
    ListFileMissing { path: PathBuf },

    #[error("read list file {} failed: {source}", path.display())]
    ListFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("create output path dir err: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parallel downloads must be at least 1, got {0}")]
    Parallelism(i64),
}
