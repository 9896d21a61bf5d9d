mod search;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeDelta, Timelike, Utc};
use typed_builder::TypedBuilder;
use crate::pattern::CronPattern;
use crate::timezone::TimeZoneSpec;

/// Last day of the given month, leap years included.
pub(crate) fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    (NaiveDate::from_ymd_opt(next_year, next_month, 1).unwrap() - TimeDelta::days(1)).day()
}

/// Options for a single occurrence search.
///
/// `min_interval_seconds` enforces a minimum spacing between consecutive
/// runs: when the caller reports a previous run, the search starts that many
/// seconds past the cursor instead of one.
#[derive(TypedBuilder, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    #[builder(default = 1)]
    pub min_interval_seconds: u32,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// [`CalendarCursor`] is a decomposed calendar instant (year, month, day,
/// hour, minute, second, millisecond) bound to a [`TimeZoneSpec`], and the
/// mutable working state of one occurrence search.
///
/// Fields may transiently hold out-of-range values (`day = 0`, `month = 13`)
/// right after an arithmetic step; [`normalize`](Self::normalize) resolves
/// the mixed-radix carries through a calendar reconstruction and must run
/// before the cursor is read or compared. A cursor is cheap: construct one
/// per search from an absolute instant, let [`advance`](Self::advance) or
/// [`retreat`](Self::retreat) mutate it in place, and read the result off
/// the return value or [`to_instant`](Self::to_instant).
///
/// # Examples
///
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use cronwheel_core::cursor::{CalendarCursor, SearchOptions};
/// use cronwheel_core::pattern::CronPattern;
/// use cronwheel_core::timezone::TimeZoneSpec;
///
/// let pattern = CronPattern::new("0 12 * * *").unwrap();
/// let start = Utc.with_ymd_and_hms(2024, 5, 17, 13, 0, 0).unwrap();
/// let mut cursor = CalendarCursor::from_instant(start, TimeZoneSpec::utc());
/// let next = cursor.advance(&pattern, &SearchOptions::default(), false).unwrap();
/// assert_eq!(next, Utc.with_ymd_and_hms(2024, 5, 18, 12, 0, 0).unwrap());
/// ```
///
/// # See also
/// - [`CronPattern`] — what the search matches against
/// - [`TaskScheduleCron`](crate::schedule::TaskScheduleCron) — owns the
///   pattern/zone pair and drives cursors for the caller
#[derive(Debug, Clone)]
pub struct CalendarCursor {
    pub(crate) year: i32,
    pub(crate) month: i32,
    pub(crate) day: i32,
    pub(crate) hour: i32,
    pub(crate) minute: i32,
    pub(crate) second: i32,
    pub(crate) millisecond: i32,
    pub(crate) zone: TimeZoneSpec,
    /// The absolute instant the cursor denotes, kept in sync by the
    /// constructors and by a converged search.
    anchor: Option<DateTime<Utc>>,
}

impl CalendarCursor {
    /// Decomposes `instant` into the wall-clock reading of `zone`.
    pub fn from_instant(instant: DateTime<Utc>, zone: TimeZoneSpec) -> Self {
        let wall = zone.utc_to_wall(&instant);
        Self {
            year: wall.year(),
            month: wall.month() as i32,
            day: wall.day() as i32,
            hour: wall.hour() as i32,
            minute: wall.minute() as i32,
            second: wall.second() as i32,
            millisecond: instant.timestamp_subsec_millis() as i32,
            zone,
            anchor: Some(instant),
        }
    }

    /// Builds a cursor directly from wall-clock parts. The parts are taken
    /// as-is and may be out of range; call [`normalize`](Self::normalize) to
    /// resolve carries.
    pub fn from_wall(
        year: i32,
        month: i32,
        day: i32,
        hour: i32,
        minute: i32,
        second: i32,
        zone: TimeZoneSpec,
    ) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
            millisecond: 0,
            zone,
            anchor: None,
        }
    }

    pub fn zone(&self) -> &TimeZoneSpec {
        &self.zone
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> i32 {
        self.month
    }

    pub fn day(&self) -> i32 {
        self.day
    }

    pub fn hour(&self) -> i32 {
        self.hour
    }

    pub fn minute(&self) -> i32 {
        self.minute
    }

    pub fn second(&self) -> i32 {
        self.second
    }

    /// Resolves overflowed or underflowed fields by rebuilding the reading
    /// through a calendar round trip: months fold into years first, then
    /// days, hours, minutes, seconds and milliseconds carry through a date
    /// reconstruction. Idempotent: normalizing a normalized cursor is a
    /// no-op.
    pub fn normalize(&mut self) {
        let months = self.year as i64 * 12 + (self.month as i64 - 1);
        let year = months.div_euclid(12) as i32;
        let month = (months.rem_euclid(12) + 1) as u32;
        let rebuilt = NaiveDate::from_ymd_opt(year, month, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + TimeDelta::days(self.day as i64 - 1)
            + TimeDelta::hours(self.hour as i64)
            + TimeDelta::minutes(self.minute as i64)
            + TimeDelta::seconds(self.second as i64)
            + TimeDelta::milliseconds(self.millisecond as i64);
        self.year = rebuilt.year();
        self.month = rebuilt.month() as i32;
        self.day = rebuilt.day() as i32;
        self.hour = rebuilt.hour() as i32;
        self.minute = rebuilt.minute() as i32;
        self.second = rebuilt.second() as i32;
        self.millisecond = rebuilt.and_utc().timestamp_subsec_millis() as i32;
    }

    /// The absolute instant this cursor denotes. For a cursor built with
    /// [`from_wall`](Self::from_wall) the reading is normalized and resolved
    /// through the zone binding (folds map to their earlier occurrence, gap
    /// readings shift forward past the gap).
    pub fn to_instant(&self) -> DateTime<Utc> {
        if let Some(anchor) = self.anchor {
            return anchor;
        }
        let mut copy = self.clone();
        copy.normalize();
        self.zone.wall_to_utc(copy.wall_reading())
    }

    /// Whether this cursor's reading satisfies every field of `pattern`,
    /// the match predicate behind
    /// [`TaskScheduleCron::matches_utc`](crate::schedule::TaskScheduleCron::matches_utc).
    /// Milliseconds are ignored; no field is mutated.
    pub fn satisfies(&self, pattern: &CronPattern) -> bool {
        let mut copy = self.clone();
        copy.normalize();
        pattern.second_match(copy.second as u32)
            && pattern.minute_match(copy.minute as u32)
            && pattern.hour_match(copy.hour as u32)
            && pattern.day_match(copy.year, copy.month as u32, copy.day as u32)
            && pattern.month_match(copy.month as u32)
            && pattern.year_match(copy.year)
    }

    /// Wall-clock reading of a normalized cursor.
    pub(crate) fn wall_reading(&self) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(self.year, self.month as u32, self.day as u32)
            .unwrap()
            .and_hms_milli_opt(
                self.hour as u32,
                self.minute as u32,
                self.second as u32,
                self.millisecond as u32,
            )
            .unwrap()
    }

    pub(crate) fn sync_to(&mut self, instant: DateTime<Utc>) {
        let wall = self.zone.utc_to_wall(&instant);
        self.year = wall.year();
        self.month = wall.month() as i32;
        self.day = wall.day() as i32;
        self.hour = wall.hour() as i32;
        self.minute = wall.minute() as i32;
        self.second = wall.second() as i32;
        self.millisecond = instant.timestamp_subsec_millis() as i32;
        self.anchor = Some(instant);
    }
}
