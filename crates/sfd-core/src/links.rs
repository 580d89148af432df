//! Link source: the ordered list of URLs for one run.

use std::fs;
use std::path::Path;

use crate::error::ConfigError;

/// Accepts anything starting with `http` (covers `http://` and `https://`).
pub fn validate_remote_url(url: &str) -> Result<(), ConfigError> {
    if url.starts_with("http") {
        Ok(())
    } else {
        Err(ConfigError::InvalidUrl(url.to_string()))
    }
}

/// Splits list-file contents into URLs in file order, skipping blank lines.
/// Accepts both `\n` and `\r\n` line endings.
pub fn parse_link_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// Single URL first, then list-file entries. No deduplication.
pub fn collect_links(
    single: Option<&str>,
    list_file: Option<&Path>,
) -> Result<Vec<String>, ConfigError> {
    let mut links = Vec::new();
    if let Some(url) = single.filter(|u| !u.is_empty()) {
        validate_remote_url(url)?;
        links.push(url.to_string());
    }
    if let Some(path) = list_file {
        if !path.exists() {
            return Err(ConfigError::ListFileMissing {
                path: path.to_path_buf(),
            });
        }
        let raw = fs::read(path).map_err(|source| ConfigError::ListFile {
            path: path.to_path_buf(),
            source,
        })?;
        // Stray non-UTF-8 bytes only spoil their own line.
        let from_file = parse_link_list(&String::from_utf8_lossy(&raw));
        tracing::debug!(path = %path.display(), count = from_file.len(), "read link list");
        links.extend(from_file);
    }
    Ok(links)
}
