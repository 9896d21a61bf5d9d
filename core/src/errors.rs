use std::fmt;
use chrono::NaiveDateTime;
use thiserror::Error;

/// Names the cron expression field an error originates from, in the order the
/// fields appear in a full seven-field expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternField {
    Second,
    Minute,
    Hour,
    DayOfMonth,
    Month,
    DayOfWeek,
    Year,
}

impl fmt::Display for PatternField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PatternField::Second => "seconds",
            PatternField::Minute => "minutes",
            PatternField::Hour => "hours",
            PatternField::DayOfMonth => "day-of-month",
            PatternField::Month => "month",
            PatternField::DayOfWeek => "day-of-week",
            PatternField::Year => "year",
        })
    }
}

/// [`PatternSyntaxError`] is raised while compiling a cron expression into a
/// [`CronPattern`](crate::pattern::CronPattern). Every malformed input is
/// rejected eagerly at compile time; a pattern that compiles is never
/// re-validated afterwards.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatternSyntaxError {
    #[error("expected 5, 6 or 7 whitespace-separated fields, found {0}")]
    FieldCount(usize),

    #[error("expected exactly {expected} fields, found {found}")]
    PinnedFieldCount { expected: usize, found: usize },

    #[error("unknown schedule nickname `{0}`")]
    UnknownNickname(String),

    #[error("illegal token `{token}` in the {field} field")]
    IllegalToken { field: PatternField, token: String },

    #[error("value {value} is outside {min}..={max} in the {field} field")]
    ValueOutOfRange {
        field: PatternField,
        value: i64,
        min: u32,
        max: u32,
    },

    #[error("range `{token}` in the {field} field runs from high to low")]
    ReversedRange { field: PatternField, token: String },

    #[error("step in `{token}` ({field} field) is zero or wider than the field itself")]
    InvalidStep { field: PatternField, token: String },

    #[error("step `{token}` in the {field} field needs an explicit range, e.g. `a-b/n` or `*/n`")]
    BareStep { field: PatternField, token: String },

    #[error("modifier in `{token}` ({field} field) cannot be combined with a range or step")]
    ModifierWithRange { field: PatternField, token: String },

    #[error("`{token}` is not allowed in the {field} field")]
    MisplacedModifier { field: PatternField, token: String },
}

/// Returned by [`CalendarCursor::advance`](crate::cursor::CalendarCursor::advance)
/// and [`retreat`](crate::cursor::CalendarCursor::retreat) when no instant can
/// satisfy the pattern within the supported year range (1..=9999), e.g.
/// `0 0 31 2 *`.
///
/// This is an expected outcome ("no next run"), not a failure, and it is
/// terminal for the starting instant it was produced from: retrying the same
/// search yields the same result.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("no matching instant within the supported year range")]
pub struct Unsatisfiable;

/// Raised by the strict variant of wall-clock resolution when the requested
/// local time never existed because a daylight-saving transition skipped it.
///
/// Non-strict resolution never raises this; it shifts the reading forward
/// past the gap instead. See
/// [`TimeZoneSpec::wall_to_utc_strict`](crate::timezone::TimeZoneSpec::wall_to_utc_strict).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("wall-clock time {wall} does not exist in zone {zone} (daylight-saving gap)")]
pub struct DstGapError {
    pub wall: NaiveDateTime,
    pub zone: String,
}
