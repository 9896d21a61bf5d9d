mod parser;

use std::fmt;
use std::str::FromStr;
use chrono::{Datelike, NaiveDate};
use typed_builder::TypedBuilder;
use crate::cursor::days_in_month;
use crate::errors::PatternSyntaxError;

/// Occurrence bits carried by each weekday table entry: bits 0..4 select the
/// 1st..5th occurrence of that weekday within a month, bit 5 the last one.
/// A weekday named without a selector carries every occurrence bit.
pub(crate) const LAST_OCCURRENCE: u8 = 0b10_0000;
pub(crate) const ALL_OCCURRENCES: u8 = 0b01_1111;

/// How an explicit day-of-month restriction combines with an explicit
/// day-of-week restriction. The default is [`CombineMode::Or`]; a leading `+`
/// on the weekday field or [`PatternOptions::combine_mode`] forces
/// [`CombineMode::And`]. When either field is a pure wildcard the other one
/// governs alone and this mode is irrelevant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CombineMode {
    And,
    #[default]
    Or,
}

/// Pins the number of whitespace-separated fields an expression must have.
/// [`FieldCount::Auto`] accepts 5 (no seconds, no year), 6 (no year) or 7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldCount {
    #[default]
    Auto,
    Five,
    Six,
    Seven,
}

/// Compilation options for [`CronPattern::compile`].
///
/// # Examples
///
/// ```rust
/// use cronwheel_core::pattern::{CombineMode, CronPattern, PatternOptions};
///
/// // Quartz-style weekday numbering (1 = Sunday .. 7 = Saturday) and forced
/// // AND combination of day-of-month with day-of-week.
/// let options = PatternOptions::builder()
///     .alternative_weekday_numbering(true)
///     .combine_mode(Some(CombineMode::And))
///     .build();
/// let pattern = CronPattern::compile("0 12 1 * 2", &options).unwrap();
/// ```
#[derive(TypedBuilder, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternOptions {
    #[builder(default)]
    pub mode: FieldCount,

    /// Interpret weekday literals as `1 = Sunday .. 7 = Saturday` instead of
    /// `0 = Sunday .. 6 = Saturday` (with `7` folding back to Sunday).
    #[builder(default = false)]
    pub alternative_weekday_numbering: bool,

    /// `Some(CombineMode::And)` forces AND combination exactly like a leading
    /// `+` on the weekday field. `None` keeps the expression's own choice.
    #[builder(default)]
    pub combine_mode: Option<CombineMode>,
}

impl Default for PatternOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Explicit year constraint, kept as sorted stepped ranges because the
/// 1..=9999 domain is too large for a fixed table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct YearFilter {
    ranges: Vec<YearRange>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct YearRange {
    pub(crate) start: i32,
    pub(crate) end: i32,
    pub(crate) step: i32,
}

impl YearFilter {
    pub(crate) fn new(mut ranges: Vec<YearRange>) -> Self {
        ranges.sort_by_key(|range| range.start);
        Self { ranges }
    }

    pub(crate) fn contains(&self, year: i32) -> bool {
        self.ranges.iter().any(|range| {
            year >= range.start && year <= range.end && (year - range.start) % range.step == 0
        })
    }

    /// Smallest admissible year `>= from`, if any.
    pub(crate) fn next_from(&self, from: i32) -> Option<i32> {
        self.ranges
            .iter()
            .filter_map(|range| {
                if from > range.end {
                    return None;
                }
                let base = from.max(range.start);
                let offset = (base - range.start + range.step - 1) / range.step * range.step;
                let candidate = range.start + offset;
                (candidate <= range.end).then_some(candidate)
            })
            .min()
    }

    /// Largest admissible year `<= from`, if any.
    pub(crate) fn prev_from(&self, from: i32) -> Option<i32> {
        self.ranges
            .iter()
            .filter_map(|range| {
                if from < range.start {
                    return None;
                }
                let cap = from.min(range.end);
                Some(range.start + (cap - range.start) / range.step * range.step)
            })
            .max()
    }
}

/// [`CronPattern`] is the immutable, compiled form of a cron expression:
/// per-field match tables plus the modifier flags that drive day selection.
///
/// Compile once with [`CronPattern::new`] or [`CronPattern::compile`]; every
/// out-of-range value, malformed token or contradictory modifier combination
/// is rejected at that point, so match queries never validate again.
///
/// # Grammar
///
/// 5, 6 or 7 whitespace-separated fields: `[seconds] minutes hours
/// day-of-month month day-of-week [year]`. Each field accepts `*`, single
/// values, `a-b` ranges, `*/n` and `a-b/n` steps and comma lists; months and
/// weekdays also accept case-insensitive three-letter English names.
/// `?` is a wildcard alias on the two day fields. Day-of-month additionally
/// accepts `L` (last day) and `nW` (nearest weekday to `n`); day-of-week
/// accepts `nL`/`n#L` (last occurrence) and `n#1`..`n#5` (nth occurrence),
/// and a leading `+` forces AND combination with day-of-month. Nicknames
/// `@yearly`/`@annually`, `@monthly`, `@weekly`, `@daily`/`@midnight` and
/// `@hourly` expand before parsing.
///
/// # Examples
///
/// ```rust
/// use cronwheel_core::pattern::CronPattern;
///
/// // Noon on the last day of every month
/// let pattern = CronPattern::new("0 12 L * *").unwrap();
/// assert!(pattern.day_match(2024, 2, 29));
/// assert!(!pattern.day_match(2024, 2, 28));
/// ```
///
/// # See also
/// - [`CalendarCursor`](crate::cursor::CalendarCursor) — searches for
///   instants matching a pattern
/// - [`TaskScheduleCron`](crate::schedule::TaskScheduleCron) — the schedule
///   type built on top of both
#[derive(Clone)]
pub struct CronPattern {
    pub(crate) seconds: [bool; 60],
    pub(crate) minutes: [bool; 60],
    pub(crate) hours: [bool; 24],
    /// Indexed by `day - 1`.
    pub(crate) days: [bool; 31],
    /// Indexed by `month - 1`.
    pub(crate) months: [bool; 12],
    /// Indexed by weekday, `0 = Sunday`; entries are occurrence bitmasks.
    pub(crate) weekdays: [u8; 7],
    pub(crate) years: Option<YearFilter>,
    pub(crate) last_day_of_month: bool,
    /// Day-of-month targets flagged with `W`, indexed by `day - 1`.
    pub(crate) nearest_weekdays: [bool; 31],
    pub(crate) dom_wildcard: bool,
    pub(crate) dow_wildcard: bool,
    pub(crate) combine_mode: CombineMode,
    source: String,
}

impl CronPattern {
    /// Compiles `expression` with default [`PatternOptions`].
    pub fn new(expression: &str) -> Result<Self, PatternSyntaxError> {
        Self::compile(expression, &PatternOptions::default())
    }

    /// Compiles `expression`, rejecting any malformed field with a
    /// [`PatternSyntaxError`] naming the offending field and token.
    pub fn compile(
        expression: &str,
        options: &PatternOptions,
    ) -> Result<Self, PatternSyntaxError> {
        parser::compile(expression, options)
    }

    pub(crate) fn empty(source: &str) -> Self {
        Self {
            seconds: [false; 60],
            minutes: [false; 60],
            hours: [false; 24],
            days: [false; 31],
            months: [false; 12],
            weekdays: [0; 7],
            years: None,
            last_day_of_month: false,
            nearest_weekdays: [false; 31],
            dom_wildcard: false,
            dow_wildcard: false,
            combine_mode: CombineMode::Or,
            source: source.to_owned(),
        }
    }

    pub fn second_match(&self, second: u32) -> bool {
        self.seconds.get(second as usize).copied().unwrap_or(false)
    }

    pub fn minute_match(&self, minute: u32) -> bool {
        self.minutes.get(minute as usize).copied().unwrap_or(false)
    }

    pub fn hour_match(&self, hour: u32) -> bool {
        self.hours.get(hour as usize).copied().unwrap_or(false)
    }

    pub fn month_match(&self, month: u32) -> bool {
        month >= 1 && self.months.get(month as usize - 1).copied().unwrap_or(false)
    }

    pub fn year_match(&self, year: i32) -> bool {
        self.years.as_ref().map_or(true, |filter| filter.contains(year))
    }

    pub(crate) fn next_year(&self, from: i32) -> Option<i32> {
        self.years.as_ref().and_then(|filter| filter.next_from(from))
    }

    pub(crate) fn prev_year(&self, from: i32) -> Option<i32> {
        self.years.as_ref().and_then(|filter| filter.prev_from(from))
    }

    /// Whether `day` of the given month satisfies the combined day-of-month /
    /// day-of-week criteria, including `L`, `W` and occurrence selectors.
    ///
    /// A pure day-of-month wildcard defers wholly to the weekday table and
    /// vice versa; with both fields explicit the verdicts combine under
    /// [`CombineMode`].
    pub fn day_match(&self, year: i32, month: u32, day: u32) -> bool {
        match (self.dom_wildcard, self.dow_wildcard) {
            (true, true) => true,
            (false, true) => self.day_of_month_match(year, month, day),
            (true, false) => self.day_of_week_match(year, month, day),
            (false, false) => match self.combine_mode {
                CombineMode::And => {
                    self.day_of_month_match(year, month, day)
                        && self.day_of_week_match(year, month, day)
                }
                CombineMode::Or => {
                    self.day_of_month_match(year, month, day)
                        || self.day_of_week_match(year, month, day)
                }
            },
        }
    }

    fn day_of_month_match(&self, year: i32, month: u32, day: u32) -> bool {
        if day >= 1 && self.days.get(day as usize - 1).copied().unwrap_or(false) {
            return true;
        }
        if self.last_day_of_month && day == days_in_month(year, month) {
            return true;
        }
        (1..=31u32).any(|target| {
            self.nearest_weekdays[target as usize - 1]
                && nearest_weekday_in(year, month, target) == Some(day)
        })
    }

    fn day_of_week_match(&self, year: i32, month: u32, day: u32) -> bool {
        let Some(weekday) = weekday_of(year, month, day) else {
            return false;
        };
        let mask = self.weekdays[weekday as usize];
        if mask == 0 {
            return false;
        }
        let occurrence = (day - 1) / 7;
        let is_last = day + 7 > days_in_month(year, month);
        mask & (1u8 << occurrence) != 0 || (is_last && mask & LAST_OCCURRENCE != 0)
    }
}

impl fmt::Display for CronPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl fmt::Debug for CronPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CronPattern({:?})", self.source)
    }
}

impl FromStr for CronPattern {
    type Err = PatternSyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CronPattern::new(s)
    }
}

/// Weekday of a calendar date, `0 = Sunday`, or `None` for an invalid date.
fn weekday_of(year: i32, month: u32, day: u32) -> Option<u32> {
    NaiveDate::from_ymd_opt(year, month, day).map(|date| date.weekday().num_days_from_sunday())
}

/// Where a `W` target lands: Saturdays pull back to Friday, Sundays push
/// forward to Monday, both clamped inside the month (a Saturday the 1st goes
/// forward to Monday the 3rd, a Sunday month-end back to Friday). Targets past
/// the month's end select nothing.
fn nearest_weekday_in(year: i32, month: u32, target: u32) -> Option<u32> {
    let last = days_in_month(year, month);
    if target > last {
        return None;
    }
    let day = match weekday_of(year, month, target)? {
        6 => {
            if target == 1 {
                target + 2
            } else {
                target - 1
            }
        }
        0 => {
            if target == last {
                target - 2
            } else {
                target + 1
            }
        }
        _ => target,
    };
    Some(day)
}
