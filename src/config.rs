use crate::error::{Error, Result};
use crate::pipeline::WorkerPool;
use crate::stats::Operation;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const ENV_WORKERS: &str = "COLSTATS_WORKERS";
pub const ENV_LOG_LEVEL: &str = "COLSTATS_LOG";

/// Location of the optional user config file
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "colstats", "colstats")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// User defaults, layered as: config file, then environment, then CLI flags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Worker pool size; host parallelism when unset
    pub workers: Option<usize>,
    /// Operation used when `--op` is not given
    pub operation: Option<Operation>,
    /// `tracing` filter directive, e.g. `info` or `colstats=debug`
    pub log_level: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from `path`, or from the default location when `path` is `None`.
    ///
    /// An explicit path must exist. A missing default file yields the
    /// built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match default_config_path() {
                Some(path) if path.is_file() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        debug!("Loaded configuration from {}", path.display());
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        if config.workers == Some(0) {
            return Err(Error::Config("workers must be at least 1".to_string()));
        }
        Ok(config)
    }

    pub fn merge_env_vars(&mut self) {
        self.merge_env_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from `lookup`; unparseable values are ignored.
    pub fn merge_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(workers) = lookup(ENV_WORKERS) {
            match workers.trim().parse::<usize>() {
                Ok(n) if n > 0 => self.workers = Some(n),
                _ => debug!("Ignoring invalid {}={:?}", ENV_WORKERS, workers),
            }
        }

        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            if !level.trim().is_empty() {
                self.log_level = Some(level);
            }
        }
    }

    pub fn worker_pool(&self) -> WorkerPool {
        self.workers.map(WorkerPool::new).unwrap_or_default()
    }
}
