use std::fmt;
use chrono::{DateTime, FixedOffset, Local, LocalResult, NaiveDateTime, Offset, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use crate::errors::DstGapError;

/// [`TimeZoneSpec`] binds a wall-clock reading to a concrete timezone so it
/// can be converted to and from absolute UTC instants.
///
/// Three bindings are supported:
/// - [`TimeZoneSpec::Local`] — the system timezone, the default used by
///   [`TaskScheduleCron`](crate::schedule::TaskScheduleCron)
/// - [`TimeZoneSpec::Fixed`] — a fixed UTC offset, never subject to
///   daylight-saving transitions
/// - [`TimeZoneSpec::Named`] — an IANA zone looked up in the platform zone
///   database, e.g. `America/New_York`
///
/// Resolution is stateless: both directions are pure functions of the zone
/// and the input reading, so a [`TimeZoneSpec`] can be shared freely.
///
/// # Examples
///
/// ```rust
/// use cronwheel_core::timezone::TimeZoneSpec;
///
/// let utc = TimeZoneSpec::utc();
/// let new_york = TimeZoneSpec::named("America/New_York").unwrap();
/// ```
///
/// # See also
/// - [`CalendarCursor`](crate::cursor::CalendarCursor) — carries a binding
///   through an occurrence search
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeZoneSpec {
    Local,
    Fixed(FixedOffset),
    Named(Tz),
}

/// How a wall-clock reading maps onto absolute time in a zone. Daylight-saving
/// transitions make the mapping non-injective: a reading can exist once, twice
/// (fall-back fold) or not at all (spring-forward gap).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WallResolution {
    Unique(DateTime<Utc>),
    Fold {
        earlier: DateTime<Utc>,
        later: DateTime<Utc>,
    },
    /// The reading never occurred; the carried instant is the reading
    /// projected through the pre-transition offset, which lands just past
    /// the gap (its wall reading is >= the requested one).
    Gap(DateTime<Utc>),
}

impl TimeZoneSpec {
    /// A fixed zero-offset binding.
    pub fn utc() -> Self {
        TimeZoneSpec::Fixed(FixedOffset::east_opt(0).unwrap())
    }

    /// A fixed offset east of UTC, in minutes. Returns `None` when the offset
    /// is outside `-1439..=1439`.
    pub fn fixed_minutes(minutes: i32) -> Option<Self> {
        FixedOffset::east_opt(minutes * 60).map(TimeZoneSpec::Fixed)
    }

    /// Looks up an IANA zone id in the platform zone database. Returns `None`
    /// for unknown ids.
    pub fn named(id: &str) -> Option<Self> {
        id.parse::<Tz>().ok().map(TimeZoneSpec::Named)
    }

    /// Converts an absolute instant into this zone's wall-clock reading.
    /// A direct, non-iterative zone database lookup.
    pub fn utc_to_wall(&self, instant: &DateTime<Utc>) -> NaiveDateTime {
        match self {
            TimeZoneSpec::Local => instant.with_timezone(&Local).naive_local(),
            TimeZoneSpec::Fixed(offset) => instant.with_timezone(offset).naive_local(),
            TimeZoneSpec::Named(tz) => instant.with_timezone(tz).naive_local(),
        }
    }

    /// Converts a wall-clock reading into an absolute instant.
    ///
    /// The conversion is deterministic through daylight-saving transitions:
    /// a fall-back fold resolves to the earlier (pre-transition) occurrence,
    /// and a reading inside a spring-forward gap is shifted forward past the
    /// gap. This variant never fails; use [`wall_to_utc_strict`](Self::wall_to_utc_strict)
    /// to reject readings that never existed.
    pub fn wall_to_utc(&self, wall: NaiveDateTime) -> DateTime<Utc> {
        match self.resolve_wall(wall) {
            WallResolution::Unique(instant) => instant,
            WallResolution::Fold { earlier, .. } => earlier,
            WallResolution::Gap(instant) => instant,
        }
    }

    /// Like [`wall_to_utc`](Self::wall_to_utc), but signals a [`DstGapError`]
    /// when the reading falls inside a spring-forward gap instead of shifting
    /// it. Fold readings still resolve to the earlier occurrence.
    pub fn wall_to_utc_strict(&self, wall: NaiveDateTime) -> Result<DateTime<Utc>, DstGapError> {
        match self.resolve_wall(wall) {
            WallResolution::Unique(instant) => Ok(instant),
            WallResolution::Fold { earlier, .. } => Ok(earlier),
            WallResolution::Gap(_) => Err(DstGapError {
                wall,
                zone: self.to_string(),
            }),
        }
    }

    pub(crate) fn resolve_wall(&self, wall: NaiveDateTime) -> WallResolution {
        match self {
            TimeZoneSpec::Local => resolve_in(&Local, wall),
            TimeZoneSpec::Fixed(offset) => resolve_in(offset, wall),
            TimeZoneSpec::Named(tz) => resolve_in(tz, wall),
        }
    }
}

impl fmt::Display for TimeZoneSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeZoneSpec::Local => f.write_str("local"),
            TimeZoneSpec::Fixed(offset) => write!(f, "{offset}"),
            TimeZoneSpec::Named(tz) => write!(f, "{}", tz.name()),
        }
    }
}

fn resolve_in<Z: TimeZone>(zone: &Z, wall: NaiveDateTime) -> WallResolution {
    match zone.from_local_datetime(&wall) {
        LocalResult::Single(instant) => WallResolution::Unique(instant.with_timezone(&Utc)),
        LocalResult::Ambiguous(earlier, later) => WallResolution::Fold {
            earlier: earlier.with_timezone(&Utc),
            later: later.with_timezone(&Utc),
        },
        LocalResult::None => {
            #[cfg(feature = "logging")]
            tracing::debug!(wall = %wall, "wall-clock reading falls in a DST gap");
            WallResolution::Gap(project_through_gap(zone, wall))
        }
    }
}

/// Maps a nonexistent reading to the instant the pre-transition offset would
/// have produced. Probes backwards in half-hour steps until a representable
/// reading yields that offset; gaps larger than two days (none exist in the
/// zone database) fall back to treating the reading as UTC.
fn project_through_gap<Z: TimeZone>(zone: &Z, wall: NaiveDateTime) -> DateTime<Utc> {
    let mut probe = wall;
    for _ in 0..96 {
        probe -= TimeDelta::minutes(30);
        let before = match zone.from_local_datetime(&probe) {
            LocalResult::Single(instant) => instant,
            LocalResult::Ambiguous(earlier, _) => earlier,
            LocalResult::None => continue,
        };
        let offset_seconds = before.offset().fix().local_minus_utc();
        return Utc.from_utc_datetime(&(wall - TimeDelta::seconds(offset_seconds as i64)));
    }
    Utc.from_utc_datetime(&wall)
}
