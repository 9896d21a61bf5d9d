pub mod cron;

pub use crate::schedule::cron::TaskScheduleCron;

use chrono::{DateTime, Local};
use std::error::Error;
use std::sync::Arc;

/// The [`TaskSchedule`] trait defines when a task should be executed. It is
/// the seam an external scheduler consumes: given the current time, an
/// implementation answers with the next time the task is due.
///
/// The engine ships one implementation, [`TaskScheduleCron`], which computes
/// occurrences from a compiled cron expression. The trait stays deliberately
/// small: timers, pause/resume and run bookkeeping belong to whoever drives
/// the schedule, and that driver must treat a returned time as immutable once
/// produced.
///
/// # See
/// - [`TaskScheduleCron`]
pub trait TaskSchedule: Send + Sync {
    /// Calculates the next time to execute, strictly after `time`. Returns an
    /// error when no future execution exists, which callers should treat as
    /// "no next run" rather than a failure.
    fn next_after(&self, time: &DateTime<Local>) -> Result<DateTime<Local>, Arc<dyn Error>>;
}

impl<TS: TaskSchedule + ?Sized> TaskSchedule for Arc<TS> {
    fn next_after(&self, time: &DateTime<Local>) -> Result<DateTime<Local>, Arc<dyn Error>> {
        self.as_ref().next_after(time)
    }
}
