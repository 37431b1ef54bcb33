// autosign-core: config, git commit workflow, and cron scheduling.

pub mod config;
pub mod git;
pub mod schedule;
