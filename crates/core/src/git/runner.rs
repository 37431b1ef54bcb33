// The commit workflow: pull, append a timestamped line, stage, commit, push.
//
// One invocation is one atomic unit of externally observable work. Steps
// are not rolled back: a failed commit or push leaves the pull and the
// appended line in place.

use std::io::Write;
use std::path::PathBuf;

use chrono::Local;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{ConfigError, RunConfig};
use crate::git::worker::{CommandExecutor, GitError, GitWorker, ProcessCommandExecutor};

/// Timestamp format used in the appended line and the commit message.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Result of one workflow run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// A new commit was created and pushed.
    Committed { message: String },
    /// Staging produced no differences; commit and push were skipped.
    NoChanges,
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Git(#[from] GitError),

    #[error("failed to append to `{path}`: {source}")]
    Append {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Executes the pull/append/stage/commit/push sequence for one config.
pub struct CommitRunner<E = ProcessCommandExecutor> {
    config: RunConfig,
    worker: GitWorker<E>,
}

impl CommitRunner<ProcessCommandExecutor> {
    pub fn new(config: RunConfig) -> Self {
        let worker = GitWorker::new(config.repo_path.clone());
        Self { config, worker }
    }
}

impl<E: CommandExecutor> CommitRunner<E> {
    pub fn with_executor(config: RunConfig, executor: E) -> Self {
        let worker = GitWorker::with_executor(config.repo_path.clone(), executor);
        Self { config, worker }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Run the workflow once.
    ///
    /// Returns `NoChanges` when the staged diff is empty, `Committed` when
    /// a commit was created and pushed. Any failing step aborts the run
    /// without retrying or undoing earlier steps.
    pub fn run(&self) -> Result<RunOutcome, RunError> {
        self.config.ensure_repository()?;

        let branch = self.config.branch.as_str();
        info!(repo = %self.config.repo_path.display(), branch, "pulling latest changes");
        self.worker.pull(branch)?;

        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        self.append_timestamp_line(&timestamp)?;
        debug!(file = %self.config.commit_file, "appended timestamp line");

        self.worker.add(&self.config.commit_file)?;
        if !self.worker.has_staged_changes()? {
            info!("no staged changes, skipping commit");
            return Ok(RunOutcome::NoChanges);
        }

        let message = format!("Auto commit: {timestamp}");
        self.worker.commit(&message)?;
        info!(%message, "created commit");

        self.worker.push(branch)?;
        info!(branch, "pushed to origin");

        Ok(RunOutcome::Committed { message })
    }

    fn append_timestamp_line(&self, timestamp: &str) -> Result<(), RunError> {
        let path = self.config.commit_file_path();
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| RunError::Append { path: path.clone(), source })?;
        writeln!(file, "Auto commit at: {timestamp}")
            .map_err(|source| RunError::Append { path, source })
    }
}
