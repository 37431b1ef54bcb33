// Git workflow: subprocess wrapper and the pull/append/commit/push runner.

pub mod runner;
pub mod worker;
