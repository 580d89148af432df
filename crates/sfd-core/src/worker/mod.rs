//! Download worker: one URL streamed to one local file with a plain GET.
//!
//! Blocking (libcurl easy handle); the coordinator runs it on tokio's
//! blocking pool. The destination file is only created once a `200` status
//! has been seen, so a failed request never leaves a file behind. A copy
//! interrupted mid-body leaves the partial file in place.

mod headers;

use std::cell::RefCell;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str;
use std::time::Duration;

use thiserror::Error;

use crate::progress::{ProgressBoard, ProgressEntry, ProgressWriter};
use crate::task::DownloadTask;

use headers::ResponseHead;

/// Transfer settings shared by every worker of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    pub connect_timeout: Duration,
    pub max_redirects: u32,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            max_redirects: 10,
        }
    }
}

/// Why a single download failed. The `Display` text is what ends up in the
/// batch summary after the URL.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("cannot derive a file name from the url")]
    EmptyFileName,

    #[error("http get failed: {0}")]
    Network(#[source] curl::Error),

    #[error("http get failed, httpcode: {0}")]
    Status(u32),

    #[error("create [{}] failed: {source}", path.display())]
    CreateFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("save file failed: {0}")]
    Write(#[source] io::Error),

    #[error("save file failed: {0}")]
    Interrupted(#[source] curl::Error),
}

type FileSink = ProgressWriter<File, ProgressEntry>;

/// Downloads `task.url` into `dest_dir/task.file_name`, reporting progress to
/// a new entry on `progress`. Returns the number of bytes written.
///
/// No length check against `Content-Length`: a stream that ends early without
/// a transport error counts as success.
pub fn fetch(
    task: &DownloadTask,
    dest_dir: &Path,
    progress: &ProgressBoard,
    opts: &FetchOptions,
) -> Result<u64, FetchError> {
    if task.file_name.is_empty() {
        return Err(FetchError::EmptyFileName);
    }
    let dest = task.destination(dest_dir);
    tracing::debug!(url = %task.url, path = %dest.display(), "GET");

    let mut easy = curl::easy::Easy::new();
    easy.url(&task.url).map_err(FetchError::Network)?;
    easy.get(true).map_err(FetchError::Network)?;
    easy.follow_location(true).map_err(FetchError::Network)?;
    easy.max_redirections(opts.max_redirects)
        .map_err(FetchError::Network)?;
    easy.connect_timeout(opts.connect_timeout)
        .map_err(FetchError::Network)?;

    let head = RefCell::new(ResponseHead::default());
    let mut sink: Option<FileSink> = None;
    let mut failure: Option<FetchError> = None;

    let performed = {
        let mut transfer = easy.transfer();
        transfer
            .header_function(|line| {
                if let Ok(s) = str::from_utf8(line) {
                    head.borrow_mut().feed_line(s);
                }
                true
            })
            .map_err(FetchError::Network)?;
        transfer
            .write_function(|data| {
                if sink.is_none() {
                    match open_sink(&head.borrow(), &dest, &task.file_name, progress) {
                        Ok(w) => sink = Some(w),
                        Err(e) => {
                            failure = Some(e);
                            return Ok(0); // abort transfer
                        }
                    }
                }
                let Some(w) = sink.as_mut() else {
                    return Ok(0);
                };
                match w.write_all(data) {
                    Ok(()) => Ok(data.len()),
                    Err(e) => {
                        failure = Some(FetchError::Write(e));
                        Ok(0)
                    }
                }
            })
            .map_err(FetchError::Network)?;
        transfer.perform()
    };

    if let Some(err) = failure {
        return Err(err);
    }
    if let Err(e) = performed {
        return Err(match sink {
            Some(_) => FetchError::Interrupted(e),
            None => FetchError::Network(e),
        });
    }

    let code = easy.response_code().map_err(FetchError::Network)?;
    if code != 200 {
        return Err(FetchError::Status(code));
    }

    // A 200 with an empty body never reaches the write callback.
    let mut writer = match sink {
        Some(w) => w,
        None => open_sink(&head.borrow(), &dest, &task.file_name, progress)?,
    };
    writer.flush().map_err(FetchError::Write)?;
    let bytes = writer.written();
    let (_file, entry) = writer.into_parts();
    entry.finish();

    tracing::info!(url = %task.url, path = %dest.display(), bytes, "download complete");
    Ok(bytes)
}

/// Checks the status, creates the destination file and registers its bar.
fn open_sink(
    head: &ResponseHead,
    dest: &Path,
    label: &str,
    progress: &ProgressBoard,
) -> Result<FileSink, FetchError> {
    match head.status {
        Some(200) => {}
        other => return Err(FetchError::Status(other.unwrap_or(0))),
    }
    let file = File::create(dest).map_err(|source| FetchError::CreateFile {
        path: dest.to_path_buf(),
        source,
    })?;
    let entry = progress.add_entry(label, head.content_length);
    Ok(ProgressWriter::new(file, entry))
}
