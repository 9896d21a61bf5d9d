//! Cron expression timing engine: compiles cron expressions into immutable
//! match tables and computes the next or previous matching wall-clock
//! instant, correctly across month lengths, leap years and daylight-saving
//! transitions.
//!
//! The engine is synchronous and side-effect-free. Every operation is a pure
//! function of its inputs plus the read-only platform zone database, so all
//! types here can be shared across threads without locking; the only mutable
//! state is the per-search [`cursor::CalendarCursor`], which is never shared.
//!
//! # Layout
//!
//! - [`pattern`] compiles an expression (ranges, steps, lists, `L`, `W`,
//!   `#`, names, nicknames, an optional year field) into a [`pattern::CronPattern`].
//! - [`cursor`] holds the decomposed calendar instant and the carry-propagating
//!   occurrence search ([`cursor::CalendarCursor::advance`] / [`cursor::CalendarCursor::retreat`]).
//! - [`timezone`] resolves wall-clock readings to UTC instants and back,
//!   deterministically through DST gaps and folds.
//! - [`schedule`] is the seam a host scheduler consumes: the
//!   [`schedule::TaskSchedule`] trait and its cron-backed implementation.
//!
//! # Examples
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use cronwheel_core::schedule::TaskScheduleCron;
//! use cronwheel_core::timezone::TimeZoneSpec;
//!
//! let schedule = TaskScheduleCron::new("0 9 * * MON")
//!     .unwrap()
//!     .in_zone(TimeZoneSpec::utc());
//!
//! let after = Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap();
//! let next = schedule.next_after_utc(&after).unwrap();
//! assert_eq!(next, Utc.with_ymd_and_hms(2024, 1, 8, 9, 0, 0).unwrap());
//! ```

pub mod cursor;
pub mod errors;
pub mod pattern;
pub mod schedule;
pub mod timezone;
