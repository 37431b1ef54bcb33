// CLI subcommand dispatch.

use clap::Subcommand;

pub mod run;
pub mod schedule;

#[derive(Subcommand)]
pub enum Command {
    /// Run the commit workflow once
    Run(run::RunArgs),
    /// Run the commit workflow on a cron schedule until interrupted
    Schedule(schedule::ScheduleArgs),
}

pub fn run(cmd: Command) -> anyhow::Result<()> {
    match cmd {
        Command::Run(args) => run::run(args),
        Command::Schedule(args) => schedule::run(args),
    }
}
