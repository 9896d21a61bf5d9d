//! The occurrence search: a coarse-to-fine cascade over the cursor fields
//! with odometer-style carry propagation. Any field movement resets the finer
//! fields to their directional extremes and restarts the cascade from the
//! coarsest field, because a changed month or day changes which finer values
//! are even reachable (leap days, short months, weekday occurrences).

use chrono::{DateTime, Utc};
use crate::errors::Unsatisfiable;
use crate::pattern::CronPattern;
use crate::timezone::WallResolution;
use super::{days_in_month, CalendarCursor, SearchOptions};

const YEAR_CEILING: i32 = 9999;
const YEAR_FLOOR: i32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

/// Closed set of searchable cursor fields, coarse to fine. Year is not part
/// of the cascade: it has no match table and is handled by the carry out of
/// the month field plus the explicit year constraint check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CursorField {
    Month,
    Day,
    Hour,
    Minute,
    Second,
}

const CASCADE: [CursorField; 5] = [
    CursorField::Month,
    CursorField::Day,
    CursorField::Hour,
    CursorField::Minute,
    CursorField::Second,
];

impl CursorField {
    fn get(self, cursor: &CalendarCursor) -> i32 {
        match self {
            CursorField::Month => cursor.month,
            CursorField::Day => cursor.day,
            CursorField::Hour => cursor.hour,
            CursorField::Minute => cursor.minute,
            CursorField::Second => cursor.second,
        }
    }

    fn set(self, cursor: &mut CalendarCursor, value: i32) {
        match self {
            CursorField::Month => cursor.month = value,
            CursorField::Day => cursor.day = value,
            CursorField::Hour => cursor.hour = value,
            CursorField::Minute => cursor.minute = value,
            CursorField::Second => cursor.second = value,
        }
    }

    fn floor(self) -> i32 {
        match self {
            CursorField::Month | CursorField::Day => 1,
            _ => 0,
        }
    }

    /// Upper bound for the field given the cursor's current year and month;
    /// the day ceiling tracks real month lengths.
    fn ceiling(self, cursor: &CalendarCursor) -> i32 {
        match self {
            CursorField::Month => 12,
            CursorField::Day => days_in_month(cursor.year, cursor.month as u32) as i32,
            CursorField::Hour => 23,
            CursorField::Minute | CursorField::Second => 59,
        }
    }

    fn matches(self, pattern: &CronPattern, cursor: &CalendarCursor, value: i32) -> bool {
        match self {
            CursorField::Month => pattern.month_match(value as u32),
            CursorField::Day => pattern.day_match(cursor.year, cursor.month as u32, value as u32),
            CursorField::Hour => pattern.hour_match(value as u32),
            CursorField::Minute => pattern.minute_match(value as u32),
            CursorField::Second => pattern.second_match(value as u32),
        }
    }

    /// First matching value at or past `from` in the search direction, within
    /// the field's current range.
    fn scan(
        self,
        pattern: &CronPattern,
        cursor: &CalendarCursor,
        from: i32,
        direction: Direction,
    ) -> Option<i32> {
        match direction {
            Direction::Forward => {
                (from..=self.ceiling(cursor)).find(|&value| self.matches(pattern, cursor, value))
            }
            Direction::Backward => (self.floor()..=from)
                .rev()
                .find(|&value| self.matches(pattern, cursor, value)),
        }
    }
}

impl CalendarCursor {
    /// Moves the cursor to the next instant matching `pattern`, strictly
    /// after the instant it currently denotes, and returns it. Returns
    /// [`Unsatisfiable`] when no such instant exists at or below year 9999.
    ///
    /// With `has_previous_run` set and
    /// [`min_interval_seconds`](SearchOptions::min_interval_seconds) above 1,
    /// the search starts that many seconds past the cursor instead of one.
    pub fn advance(
        &mut self,
        pattern: &CronPattern,
        options: &SearchOptions,
        has_previous_run: bool,
    ) -> Result<DateTime<Utc>, Unsatisfiable> {
        self.seek(pattern, options, has_previous_run, Direction::Forward)
    }

    /// Mirror image of [`advance`](Self::advance): moves to the latest
    /// matching instant strictly before the cursor, bailing out below year 1.
    pub fn retreat(
        &mut self,
        pattern: &CronPattern,
        options: &SearchOptions,
        has_previous_run: bool,
    ) -> Result<DateTime<Utc>, Unsatisfiable> {
        self.seek(pattern, options, has_previous_run, Direction::Backward)
    }

    fn seek(
        &mut self,
        pattern: &CronPattern,
        options: &SearchOptions,
        has_previous_run: bool,
        direction: Direction,
    ) -> Result<DateTime<Utc>, Unsatisfiable> {
        let reference = self.to_instant();
        self.step_past(options, has_previous_run, direction);
        loop {
            self.converge(pattern, direction)?;
            match self.resolve_candidate(reference, direction) {
                Some(instant) => {
                    self.sync_to(instant);
                    return Ok(instant);
                }
                // A fold collision: the converged reading resolves at or
                // behind the reference. Step one second further and rerun.
                None => self.bump_finest(direction),
            }
        }
    }

    /// Step 0 of a search: move one unit (or the minimum interval) past the
    /// current reading and clear milliseconds. Going backward from a reading
    /// with a nonzero millisecond, truncating alone is already strictly
    /// earlier, so the containing second stays eligible.
    fn step_past(&mut self, options: &SearchOptions, has_previous_run: bool, direction: Direction) {
        let interval = if has_previous_run && options.min_interval_seconds > 1 {
            options.min_interval_seconds as i32
        } else {
            1
        };
        match direction {
            Direction::Forward => self.second += interval,
            Direction::Backward => {
                if self.millisecond == 0 {
                    self.second -= interval;
                }
            }
        }
        self.millisecond = 0;
        self.anchor = None;
        self.normalize();
    }

    /// The cascade: leaves the cursor on the nearest reading whose fields all
    /// match, or fails once the year range is exhausted.
    fn converge(
        &mut self,
        pattern: &CronPattern,
        direction: Direction,
    ) -> Result<(), Unsatisfiable> {
        'cascade: loop {
            if self.year > YEAR_CEILING || self.year < YEAR_FLOOR {
                #[cfg(feature = "logging")]
                tracing::debug!(pattern = %pattern, year = self.year, "search left the supported year range");
                return Err(Unsatisfiable);
            }
            for (index, field) in CASCADE.iter().copied().enumerate() {
                let current = field.get(self);
                match field.scan(pattern, self, current, direction) {
                    Some(found) if found == current => {}
                    Some(found) => {
                        field.set(self, found);
                        self.reset_fields(index + 1, direction);
                        continue 'cascade;
                    }
                    None => {
                        self.carry(index, direction);
                        continue 'cascade;
                    }
                }
            }
            if !pattern.year_match(self.year) {
                let jump = match direction {
                    Direction::Forward => pattern.next_year(self.year + 1),
                    Direction::Backward => pattern.prev_year(self.year - 1),
                };
                match jump {
                    Some(year) => {
                        self.year = year;
                        self.reset_fields(0, direction);
                        continue 'cascade;
                    }
                    None => return Err(Unsatisfiable),
                }
            }
            return Ok(());
        }
    }

    /// No match left in the field's range: move the parent one unit and reset
    /// the field and everything finer. The parent may leave its own range
    /// (month 13, day 0); the floors keep the reconstruction clean and
    /// `normalize` folds the overflow through.
    fn carry(&mut self, index: usize, direction: Direction) {
        #[cfg(feature = "logging")]
        tracing::trace!(field = ?CASCADE[index], ?direction, "field exhausted, carrying into parent");
        let delta = match direction {
            Direction::Forward => 1,
            Direction::Backward => -1,
        };
        match CASCADE[index] {
            CursorField::Month => self.year += delta,
            CursorField::Day => self.month += delta,
            CursorField::Hour => self.day += delta,
            CursorField::Minute => self.hour += delta,
            CursorField::Second => self.minute += delta,
        }
        for field in CASCADE[index..].iter().copied() {
            field.set(self, field.floor());
        }
        self.normalize();
        if direction == Direction::Backward {
            for field in CASCADE[index..].iter().copied() {
                let ceiling = field.ceiling(self);
                field.set(self, ceiling);
            }
        }
    }

    /// Resets every cascade field from `first` onward to its directional
    /// extreme, coarse first so the day ceiling sees the month it belongs to.
    fn reset_fields(&mut self, first: usize, direction: Direction) {
        for field in CASCADE[first..].iter().copied() {
            let value = match direction {
                Direction::Forward => field.floor(),
                Direction::Backward => field.ceiling(self),
            };
            field.set(self, value);
        }
    }

    /// Resolves the converged wall reading against the zone binding and
    /// enforces strict monotonicity. Folds prefer their earlier occurrence;
    /// the later one is used only when the earlier sits at or behind the
    /// reference (a search started inside the fold).
    fn resolve_candidate(
        &self,
        reference: DateTime<Utc>,
        direction: Direction,
    ) -> Option<DateTime<Utc>> {
        let resolved = match self.zone.resolve_wall(self.wall_reading()) {
            WallResolution::Unique(instant) => instant,
            WallResolution::Gap(instant) => instant,
            WallResolution::Fold { earlier, later } => match direction {
                Direction::Forward => {
                    if earlier > reference {
                        earlier
                    } else {
                        later
                    }
                }
                Direction::Backward => earlier,
            },
        };
        match direction {
            Direction::Forward if resolved > reference => Some(resolved),
            Direction::Backward if resolved < reference => Some(resolved),
            _ => None,
        }
    }

    fn bump_finest(&mut self, direction: Direction) {
        match direction {
            Direction::Forward => self.second += 1,
            Direction::Backward => self.second -= 1,
        }
        self.normalize();
    }
}
