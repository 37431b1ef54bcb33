// `autosign schedule` — run the commit workflow on a cron timer.
//
// The config is loaded once at startup and reused per tick. Tick failures
// are logged and swallowed; the timer keeps running until ctrl-c.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use tracing::{error, info};

use autosign_core::git::runner::{CommitRunner, RunOutcome};
use autosign_core::schedule::{self, CommitScheduler};

const CRON_HELP: &str = "\
Cron fields (seconds optional):

    sec  min  hour  day-of-month  month  day-of-week

Examples:
    0 9 * * *       every day at 09:00
    0 */6 * * *     every 6 hours
    0 0 * * 1-5     weekday midnights
    */30 * * * *    every 30 minutes";

#[derive(Debug, Args)]
#[command(after_help = CRON_HELP)]
pub struct ScheduleArgs {
    /// Cron expression (overrides CRON_SCHEDULE; default `0 9 * * *`)
    #[arg(long)]
    cron: Option<String>,

    /// IANA timezone for the schedule (overrides TZ; default Asia/Shanghai)
    #[arg(long)]
    timezone: Option<String>,

    /// Path to the JSON config file (overrides CONFIG_PATH and the
    /// default `./config.json`).
    #[arg(long)]
    config: Option<PathBuf>,
}

pub fn run(args: ScheduleArgs) -> anyhow::Result<()> {
    // Blocking git calls happen on the blocking pool; one worker thread is
    // all the timer itself needs.
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("tokio runtime should build")?
        .block_on(run_scheduler(args))
}

async fn run_scheduler(args: ScheduleArgs) -> anyhow::Result<()> {
    let config = super::run::load_config(args.config)?;
    // Fail fast on a bad repository path instead of logging it every tick.
    config.ensure_repository()?;

    let expression = args.cron.unwrap_or_else(schedule::resolve_expression);
    let timezone = match args.timezone {
        Some(name) => schedule::parse_timezone(&name)?,
        None => schedule::resolve_timezone()?,
    };

    info!(%expression, %timezone, "starting commit scheduler (ctrl-c to stop)");

    let runner = Arc::new(CommitRunner::new(config));
    let scheduler = CommitScheduler::start(&expression, timezone, move || {
        info!("schedule fired, running commit workflow");
        match runner.run() {
            Ok(RunOutcome::Committed { message }) => info!(%message, "commit pushed"),
            Ok(RunOutcome::NoChanges) => info!("nothing to commit"),
            // Logged, never propagated: the next tick proceeds unaffected.
            Err(error) => error!(error = %error, "scheduled run failed"),
        }
    })
    .await?;

    tokio::signal::ctrl_c().await.context("failed to listen for interrupt signal")?;
    info!("interrupt received, stopping scheduler");
    scheduler.cancel().await?;
    info!("scheduler stopped");
    Ok(())
}
