// Cron-driven scheduling for the commit workflow.
//
// The expression is validated when the job is built, so an invalid one
// fails before any timer is registered. Ticks run the callback on the
// blocking pool, serialized through a mutex: a tick that fires while the
// previous run is still executing waits for it to finish.

use std::str::FromStr;
use std::sync::Arc;

use chrono_tz::Tz;
use thiserror::Error;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{debug, warn};

/// Environment variable overriding the cron expression.
pub const SCHEDULE_ENV: &str = "CRON_SCHEDULE";

/// Environment variable overriding the timezone.
pub const TIMEZONE_ENV: &str = "TZ";

/// Default schedule: every day at 09:00.
pub const DEFAULT_SCHEDULE: &str = "0 9 * * *";

/// Default timezone when `TZ` is unset.
pub const DEFAULT_TIMEZONE: &str = "Asia/Shanghai";

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("invalid cron expression `{expression}`: {reason}")]
    InvalidExpression { expression: String, reason: String },

    #[error("invalid timezone `{0}` (expected an IANA name like Asia/Shanghai)")]
    InvalidTimezone(String),

    #[error("scheduler error: {0}")]
    Scheduler(String),
}

/// Resolve the cron expression: `CRON_SCHEDULE` if set, else the default.
pub fn resolve_expression() -> String {
    std::env::var(SCHEDULE_ENV).unwrap_or_else(|_| DEFAULT_SCHEDULE.to_string())
}

/// Resolve the timezone: `TZ` if set, else the default.
pub fn resolve_timezone() -> Result<Tz, ScheduleError> {
    match std::env::var(TIMEZONE_ENV) {
        Ok(name) => parse_timezone(&name),
        Err(_) => parse_timezone(DEFAULT_TIMEZONE),
    }
}

/// Parse an IANA timezone name.
pub fn parse_timezone(name: &str) -> Result<Tz, ScheduleError> {
    Tz::from_str(name).map_err(|_| ScheduleError::InvalidTimezone(name.to_string()))
}

/// Map a five-field expression to the seconds-first six-field form the
/// scheduler backend expects. Expressions that already carry a seconds
/// field pass through unchanged.
pub fn normalize_expression(expression: &str) -> String {
    let trimmed = expression.trim();
    if trimmed.split_whitespace().count() == 5 {
        format!("0 {trimmed}")
    } else {
        trimmed.to_string()
    }
}

/// A recurring cron job owning its timer and cancellation handle.
///
/// `start` registers the tick callback and starts the timer; `cancel`
/// shuts the timer down and prevents any further callback invocation
/// after it returns.
pub struct CommitScheduler {
    inner: JobScheduler,
}

impl CommitScheduler {
    /// Validate `expression` in `timezone` and start firing `on_tick`.
    ///
    /// The callback runs on the blocking pool; invocations never overlap.
    pub async fn start<F>(
        expression: &str,
        timezone: Tz,
        on_tick: F,
    ) -> Result<Self, ScheduleError>
    where
        F: Fn() + Send + Sync + 'static,
    {
        let normalized = normalize_expression(expression);
        let callback = Arc::new(on_tick);
        let gate = Arc::new(tokio::sync::Mutex::new(()));

        let job = Job::new_async_tz(normalized.as_str(), timezone, move |_id, _sched| {
            let callback = Arc::clone(&callback);
            let gate = Arc::clone(&gate);
            Box::pin(async move {
                let _running = gate.lock().await;
                debug!("schedule tick fired");
                if tokio::task::spawn_blocking(move || callback()).await.is_err() {
                    warn!("scheduled run panicked");
                }
            })
        })
        .map_err(|error| ScheduleError::InvalidExpression {
            expression: expression.to_string(),
            reason: error.to_string(),
        })?;

        let mut inner = JobScheduler::new()
            .await
            .map_err(|error| ScheduleError::Scheduler(error.to_string()))?;
        inner.add(job).await.map_err(|error| ScheduleError::Scheduler(error.to_string()))?;
        inner.start().await.map_err(|error| ScheduleError::Scheduler(error.to_string()))?;

        Ok(Self { inner })
    }

    /// Stop the timer. No tick callback is invoked after this returns.
    pub async fn cancel(mut self) -> Result<(), ScheduleError> {
        self.inner
            .shutdown()
            .await
            .map_err(|error| ScheduleError::Scheduler(error.to_string()))
    }
}
