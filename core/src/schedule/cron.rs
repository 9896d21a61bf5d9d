use std::error::Error;
use std::str::FromStr;
use std::sync::Arc;
use chrono::{DateTime, Local, Utc};
use crate::cursor::{CalendarCursor, SearchOptions};
use crate::errors::{PatternSyntaxError, Unsatisfiable};
use crate::pattern::{CronPattern, PatternOptions};
use crate::schedule::TaskSchedule;
use crate::timezone::TimeZoneSpec;

/// [`TaskScheduleCron`] is an implementation of the [`TaskSchedule`] trait
/// that executes tasks according to a cron expression.
///
/// Cron expressions provide a powerful way to define recurring schedules with
/// fine-grained control (e.g., "every minute", "at 2:30 AM every day", "every
/// Monday at 9 AM"). The expression is compiled once, eagerly, at
/// construction; a schedule that was built successfully can never fail to
/// parse later. Occurrences are computed against the schedule's timezone
/// binding, which defaults to the system timezone.
///
/// # Construction
///
/// - Use [`TaskScheduleCron::new`] to compile an expression with default
///   options.
/// - Use [`TaskScheduleCron::with_options`] to pass [`PatternOptions`]
///   (pinned field count, alternative weekday numbering, forced AND
///   combination).
/// - Chain [`TaskScheduleCron::in_zone`] to bind a different timezone and
///   [`TaskScheduleCron::with_search_options`] to set a minimum run spacing.
///
/// # Examples
///
/// ```rust
/// use cronwheel_core::schedule::TaskScheduleCron;
/// use cronwheel_core::timezone::TimeZoneSpec;
///
/// // Run at 12:00 (noon) every day, system timezone
/// let schedule = TaskScheduleCron::new("0 12 * * *").unwrap();
///
/// // Run every five minutes, wall clock of New York
/// let schedule = TaskScheduleCron::new("*/5 * * * *")
///     .unwrap()
///     .in_zone(TimeZoneSpec::named("America/New_York").unwrap());
/// ```
///
/// # See also
/// - [`TaskSchedule`] — the trait implemented by this type
/// - [`CronPattern`] — the compiled expression
/// - [`CalendarCursor`] — the search state driven by each query
#[derive(Debug, Clone)]
pub struct TaskScheduleCron {
    pattern: CronPattern,
    zone: TimeZoneSpec,
    options: SearchOptions,
}

impl TaskScheduleCron {
    /// Compiles `expression` with default [`PatternOptions`], bound to the
    /// system timezone.
    pub fn new(expression: &str) -> Result<Self, PatternSyntaxError> {
        Self::with_options(expression, &PatternOptions::default())
    }

    /// Compiles `expression` with explicit [`PatternOptions`].
    pub fn with_options(
        expression: &str,
        options: &PatternOptions,
    ) -> Result<Self, PatternSyntaxError> {
        Ok(Self {
            pattern: CronPattern::compile(expression, options)?,
            zone: TimeZoneSpec::Local,
            options: SearchOptions::default(),
        })
    }

    /// Rebinds the schedule to `zone`. Occurrences are computed against that
    /// zone's wall clock from then on.
    pub fn in_zone(mut self, zone: TimeZoneSpec) -> Self {
        self.zone = zone;
        self
    }

    pub fn with_search_options(mut self, options: SearchOptions) -> Self {
        self.options = options;
        self
    }

    pub fn pattern(&self) -> &CronPattern {
        &self.pattern
    }

    pub fn zone(&self) -> &TimeZoneSpec {
        &self.zone
    }

    /// Next matching instant strictly after `after`, or [`Unsatisfiable`]
    /// when the pattern can never fire again.
    pub fn next_after_utc(&self, after: &DateTime<Utc>) -> Result<DateTime<Utc>, Unsatisfiable> {
        let mut cursor = CalendarCursor::from_instant(*after, self.zone.clone());
        cursor.advance(&self.pattern, &self.options, false)
    }

    /// Latest matching instant strictly before `before`. The primitive
    /// behind "previous N runs" queries: feed each result back in to walk
    /// further into the past.
    pub fn previous_before_utc(
        &self,
        before: &DateTime<Utc>,
    ) -> Result<DateTime<Utc>, Unsatisfiable> {
        let mut cursor = CalendarCursor::from_instant(*before, self.zone.clone());
        cursor.retreat(&self.pattern, &self.options, false)
    }

    /// Whether `at` itself satisfies the pattern (milliseconds ignored).
    pub fn matches_utc(&self, at: &DateTime<Utc>) -> bool {
        CalendarCursor::from_instant(*at, self.zone.clone()).satisfies(&self.pattern)
    }

    /// Iterator over the occurrences strictly after `from`, in order. The
    /// iterator reports previous runs to the search, so a configured
    /// minimum interval spaces out consecutive items.
    pub fn upcoming(&self, from: DateTime<Utc>) -> UpcomingOccurrences {
        UpcomingOccurrences {
            pattern: self.pattern.clone(),
            options: self.options,
            cursor: CalendarCursor::from_instant(from, self.zone.clone()),
            fired: false,
        }
    }
}

impl TaskSchedule for TaskScheduleCron {
    fn next_after(&self, time: &DateTime<Local>) -> Result<DateTime<Local>, Arc<dyn Error>> {
        let next = self
            .next_after_utc(&time.with_timezone(&Utc))
            .map_err(|unsatisfiable| Arc::new(unsatisfiable) as Arc<dyn Error>)?;
        Ok(next.with_timezone(&Local))
    }
}

impl FromStr for TaskScheduleCron {
    type Err = PatternSyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskScheduleCron::new(s)
    }
}

/// Iterator returned by [`TaskScheduleCron::upcoming`]. Ends (returns `None`)
/// once the pattern has no further occurrence within the supported years.
pub struct UpcomingOccurrences {
    pattern: CronPattern,
    options: SearchOptions,
    cursor: CalendarCursor,
    fired: bool,
}

impl Iterator for UpcomingOccurrences {
    type Item = DateTime<Utc>;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self
            .cursor
            .advance(&self.pattern, &self.options, self.fired)
            .ok()?;
        self.fired = true;
        Some(next)
    }
}
