// autosign CLI entry point.

use clap::Parser;

mod commands;

#[derive(Parser)]
#[command(name = "autosign", about = "Scheduled auto-commit for a git repository")]
struct Cli {
    #[command(subcommand)]
    command: commands::Command,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    commands::run(cli.command)
}
