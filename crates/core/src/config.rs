// Run configuration: one JSON document describing the target repository.
//
// Default path: `./config.json`, overridable via the `CONFIG_PATH`
// environment variable (CLI flags take precedence over both).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable overriding the config file path.
pub const CONFIG_PATH_ENV: &str = "CONFIG_PATH";

/// Default config file path, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

/// Configuration for one commit workflow execution.
///
/// Loaded once per invocation (or once at scheduler start, reused per
/// tick) and immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RunConfig {
    /// Local checkout the workflow operates on.
    pub repo_path: PathBuf,
    /// File that receives one timestamped line per run, relative to the
    /// repository root.
    #[serde(default = "default_commit_file")]
    pub commit_file: String,
    /// Branch pulled from and pushed to.
    #[serde(default = "default_branch")]
    pub branch: String,
}

fn default_commit_file() -> String {
    "auto-sign.txt".to_string()
}

fn default_branch() -> String {
    "main".to_string()
}

impl RunConfig {
    /// Resolve the config file path: `CONFIG_PATH` if set, else
    /// `./config.json`.
    pub fn resolve_path() -> PathBuf {
        std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    /// Load from the resolved default location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::resolve_path())
    }

    /// Load from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::Missing(path.to_path_buf()));
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        serde_json::from_str(&contents)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    /// Verify that `repo_path` points at a git repository.
    pub fn ensure_repository(&self) -> Result<(), ConfigError> {
        if self.repo_path.join(".git").exists() {
            Ok(())
        } else {
            Err(ConfigError::RepositoryNotFound(self.repo_path.clone()))
        }
    }

    /// Absolute path of the commit file inside the repository.
    pub fn commit_file_path(&self) -> PathBuf {
        self.repo_path.join(&self.commit_file)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found at `{0}`")]
    Missing(PathBuf),

    #[error("failed to read config at `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in config at `{path}`: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("`{0}` is not a git repository (no .git directory)")]
    RepositoryNotFound(PathBuf),
}
