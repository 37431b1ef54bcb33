// `autosign run` — execute the commit workflow once.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use tracing::{info, warn};

use autosign_core::config::RunConfig;
use autosign_core::git::runner::{CommitRunner, RunOutcome};

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Path to the JSON config file (overrides CONFIG_PATH and the
    /// default `./config.json`).
    #[arg(long)]
    config: Option<PathBuf>,
}

pub fn run(args: RunArgs) -> anyhow::Result<()> {
    let config = load_config(args.config)?;
    let runner = CommitRunner::new(config);

    match runner.run().context("commit workflow failed")? {
        RunOutcome::Committed { message } => info!(%message, "commit pushed"),
        RunOutcome::NoChanges => warn!("nothing to commit"),
    }
    Ok(())
}

pub(crate) fn load_config(override_path: Option<PathBuf>) -> anyhow::Result<RunConfig> {
    let path = override_path.unwrap_or_else(RunConfig::resolve_path);
    let config = RunConfig::load_from(&path)?;
    info!(
        config = %path.display(),
        repo = %config.repo_path.display(),
        file = %config.commit_file,
        branch = %config.branch,
        "loaded configuration"
    );
    Ok(config)
}
