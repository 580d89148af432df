//! Resolve command-line inputs and config defaults into a validated run.

use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use crate::config::SfdConfig;
use crate::error::ConfigError;
use crate::links::collect_links;
use crate::task::{tasks_from_links, DownloadTask};

/// What the user asked for. `None` falls back to config, then built-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunRequest {
    /// Signed as typed on the command line; checked in `RunPlan::resolve`.
    pub parallelism: Option<i64>,
    pub output_dir: Option<PathBuf>,
    pub url: Option<String>,
    pub list_file: Option<PathBuf>,
}

/// A validated batch, ready for the coordinator.
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub parallelism: usize,
    /// Absolute and existing.
    pub output_dir: PathBuf,
    pub tasks: Vec<DownloadTask>,
}

/// Number of available processing units, or 1 if unknown.
pub fn default_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

impl RunPlan {
    pub fn resolve(request: RunRequest, cfg: &SfdConfig) -> Result<Self, ConfigError> {
        let parallelism = match request.parallelism {
            Some(n) => checked_parallelism(n)?,
            None => cfg.parallelism.unwrap_or_else(default_parallelism),
        };
        if parallelism == 0 {
            return Err(ConfigError::Parallelism(0));
        }

        let output_dir = prepare_output_dir(
            request
                .output_dir
                .as_deref()
                .or(cfg.output_dir.as_deref()),
        )?;

        let links = collect_links(request.url.as_deref(), request.list_file.as_deref())?;
        tracing::debug!(
            parallelism,
            output = %output_dir.display(),
            links = links.len(),
            "run plan resolved"
        );

        Ok(Self {
            parallelism,
            output_dir,
            tasks: tasks_from_links(links),
        })
    }
}

fn checked_parallelism(n: i64) -> Result<usize, ConfigError> {
    match usize::try_from(n) {
        Ok(p) if p >= 1 => Ok(p),
        _ => Err(ConfigError::Parallelism(n)),
    }
}

/// Makes `dir` absolute (relative to the working directory) and creates it
/// recursively if missing. `None` means the working directory.
pub fn prepare_output_dir(dir: Option<&Path>) -> Result<PathBuf, ConfigError> {
    let cwd = std::env::current_dir().map_err(|source| ConfigError::OutputDir {
        path: PathBuf::from("."),
        source,
    })?;
    let abs = match dir {
        Some(d) if d.is_absolute() => d.to_path_buf(),
        Some(d) => cwd.join(d),
        None => return Ok(cwd),
    };
    if !abs.exists() {
        fs::create_dir_all(&abs).map_err(|source| ConfigError::OutputDir {
            path: abs.clone(),
            source,
        })?;
        tracing::info!("created output dir {}", abs.display());
    }
    Ok(abs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn zero_parallelism_rejected() {
        let req = RunRequest {
            parallelism: Some(0),
            ..RunRequest::default()
        };
        let err = RunPlan::resolve(req, &SfdConfig::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Parallelism(0)));
    }

    #[test]
    fn negative_parallelism_rejected() {
        let req = RunRequest {
            parallelism: Some(-1),
            ..RunRequest::default()
        };
        let err = RunPlan::resolve(req, &SfdConfig::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Parallelism(-1)));
        assert_eq!(
            err.to_string(),
            "parallel downloads must be at least 1, got -1"
        );
    }

    #[test]
    fn zero_parallelism_in_config_rejected() {
        let cfg = SfdConfig {
            parallelism: Some(0),
            ..SfdConfig::default()
        };
        let err = RunPlan::resolve(RunRequest::default(), &cfg).unwrap_err();
        assert!(matches!(err, ConfigError::Parallelism(0)));
    }

    #[test]
    fn flag_overrides_config() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = SfdConfig {
            parallelism: Some(7),
            output_dir: Some(dir.path().join("from-config")),
            ..SfdConfig::default()
        };
        let req = RunRequest {
            parallelism: Some(2),
            output_dir: Some(dir.path().join("from-flag")),
            ..RunRequest::default()
        };
        let plan = RunPlan::resolve(req, &cfg).unwrap();
        assert_eq!(plan.parallelism, 2);
        assert_eq!(plan.output_dir, dir.path().join("from-flag"));
        assert!(plan.output_dir.is_dir());
        assert!(!dir.path().join("from-config").exists());
    }

    #[test]
    fn config_fills_missing_flags() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = SfdConfig {
            parallelism: Some(5),
            output_dir: Some(dir.path().to_path_buf()),
            ..SfdConfig::default()
        };
        let plan = RunPlan::resolve(RunRequest::default(), &cfg).unwrap();
        assert_eq!(plan.parallelism, 5);
        assert_eq!(plan.output_dir, dir.path());
        assert!(plan.tasks.is_empty());
    }

    #[test]
    fn default_parallelism_is_cpu_count() {
        let dir = tempfile::tempdir().unwrap();
        let req = RunRequest {
            output_dir: Some(dir.path().to_path_buf()),
            ..RunRequest::default()
        };
        let plan = RunPlan::resolve(req, &SfdConfig::default()).unwrap();
        assert_eq!(plan.parallelism, default_parallelism());
        assert!(plan.parallelism >= 1);
    }

    #[test]
    fn nested_output_dir_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b").join("c");
        let out = prepare_output_dir(Some(nested.as_path())).unwrap();
        assert_eq!(out, nested);
        assert!(nested.is_dir());
    }

    #[test]
    fn tasks_follow_link_order() {
        let dir = tempfile::tempdir().unwrap();
        let list = dir.path().join("links.txt");
        let mut f = std::fs::File::create(&list).unwrap();
        write!(f, "http://h/2.bin\nhttp://h/3.bin\n\n").unwrap();
        let req = RunRequest {
            parallelism: Some(1),
            output_dir: Some(dir.path().to_path_buf()),
            url: Some("http://h/1.bin".to_string()),
            list_file: Some(list),
        };
        let plan = RunPlan::resolve(req, &SfdConfig::default()).unwrap();
        let names: Vec<_> = plan.tasks.iter().map(|t| t.file_name.as_str()).collect();
        assert_eq!(names, vec!["1.bin", "2.bin", "3.bin"]);
    }

    #[test]
    fn output_dir_under_a_file_is_an_error() {
        let f = tempfile::NamedTempFile::new().unwrap();
        let err = prepare_output_dir(Some(f.path().join("sub").as_path())).unwrap_err();
        assert!(matches!(err, ConfigError::OutputDir { .. }));
        assert!(err.to_string().starts_with("create output path dir err:"));
    }
}
