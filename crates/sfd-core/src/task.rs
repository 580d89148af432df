//! Download task: one URL and the local file name derived from it.

use std::path::{Path, PathBuf};

/// Text after the last `/` in `url`, or the whole URL when there is no `/`.
///
/// Query strings are kept as-is (`file.zip?token=abc`); a trailing `/`
/// yields an empty name.
pub fn file_name_from_url(url: &str) -> &str {
    match url.rfind('/') {
        Some(idx) => &url[idx + 1..],
        None => url,
    }
}

/// One unit of work for the coordinator. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    pub url: String,
    pub file_name: String,
}

impl DownloadTask {
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        let file_name = file_name_from_url(&url).to_string();
        Self { url, file_name }
    }

    pub fn destination(&self, dest_dir: &Path) -> PathBuf {
        dest_dir.join(&self.file_name)
    }
}

pub fn tasks_from_links<I, S>(links: I) -> Vec<DownloadTask>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    links.into_iter().map(DownloadTask::new).collect()
}
