use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::worker::FetchOptions;

/// Global configuration loaded from `~/.config/sfd/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SfdConfig {
    /// Default number of parallel downloads when `-n` is not given.
    /// None = number of available CPUs.
    #[serde(default)]
    pub parallelism: Option<usize>,
    /// Default output directory when `-o` is not given. None = current directory.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    /// TCP/TLS connect timeout per request, in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Maximum number of redirects followed per GET.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: u32,
    /// Width of each progress bar in columns.
    #[serde(default = "default_progress_width")]
    pub progress_width: u16,
}

fn default_connect_timeout_secs() -> u64 {
    30
}

fn default_max_redirects() -> u32 {
    10
}

fn default_progress_width() -> u16 {
    80
}

impl Default for SfdConfig {
    fn default() -> Self {
        Self {
            parallelism: None,
            output_dir: None,
            connect_timeout_secs: default_connect_timeout_secs(),
            max_redirects: default_max_redirects(),
            progress_width: default_progress_width(),
        }
    }
}

impl SfdConfig {
    /// Transfer settings handed to every worker.
    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            max_redirects: self.max_redirects,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("sfd")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<SfdConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = SfdConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: SfdConfig = toml::from_str(&data)?;
    Ok(cfg)
}
