// core/tests/occurrence_modifiers.rs
use chrono::{TimeZone, Utc};
use cronwheel_core::errors::Unsatisfiable;
use cronwheel_core::pattern::{CombineMode, CronPattern, PatternOptions};
use cronwheel_core::schedule::TaskScheduleCron;
use cronwheel_core::timezone::TimeZoneSpec;

fn utc_schedule(expression: &str) -> TaskScheduleCron {
    TaskScheduleCron::new(expression)
        .unwrap()
        .in_zone(TimeZoneSpec::utc())
}

#[test]
fn test_last_day_of_month_tracks_leap_years() {
    let schedule = utc_schedule("0 0 L 2 *");
    let next = schedule
        .next_after_utc(&Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
        .unwrap();
    assert_eq!(next, Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap());

    let next = schedule
        .next_after_utc(&Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap())
        .unwrap();
    assert_eq!(next, Utc.with_ymd_and_hms(2025, 2, 28, 0, 0, 0).unwrap());
}

#[test]
fn test_last_day_of_month_retreat() {
    let schedule = utc_schedule("0 0 12 L * *");
    let previous = schedule
        .previous_before_utc(&Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap())
        .unwrap();
    assert_eq!(previous, Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap());
}

#[test]
fn test_impossible_day_is_unsatisfiable() {
    let schedule = utc_schedule("0 0 31 2 *");
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    assert_eq!(schedule.next_after_utc(&start), Err(Unsatisfiable));
}

#[test]
fn test_day_and_weekday_combine_with_or_by_default() {
    let schedule = utc_schedule("0 12 1 * MON");
    // Monday the 1st satisfies both criteria
    assert!(schedule.matches_utc(&Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()));
    // A Monday that is not the 1st still matches
    assert!(schedule.matches_utc(&Utc.with_ymd_and_hms(2024, 1, 8, 12, 0, 0).unwrap()));
    // The 1st on a Thursday still matches
    assert!(schedule.matches_utc(&Utc.with_ymd_and_hms(2024, 2, 1, 12, 0, 0).unwrap()));
    // A plain Wednesday matches neither
    assert!(!schedule.matches_utc(&Utc.with_ymd_and_hms(2024, 1, 3, 12, 0, 0).unwrap()));

    let next = schedule
        .next_after_utc(&Utc.with_ymd_and_hms(2024, 1, 1, 13, 0, 0).unwrap())
        .unwrap();
    assert_eq!(next, Utc.with_ymd_and_hms(2024, 1, 8, 12, 0, 0).unwrap());
}

#[test]
fn test_plus_prefix_forces_and_combination() {
    let schedule = utc_schedule("0 12 1 * +MON");
    // Jan 1 2024 is a Monday
    assert!(schedule.matches_utc(&Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()));
    // Feb 1 2024 is a Thursday
    assert!(!schedule.matches_utc(&Utc.with_ymd_and_hms(2024, 2, 1, 12, 0, 0).unwrap()));
    // A Monday that is not the 1st fails the day-of-month side
    assert!(!schedule.matches_utc(&Utc.with_ymd_and_hms(2024, 1, 8, 12, 0, 0).unwrap()));

    // The next 1st falling on a Monday after January 2024 is April 1st
    let next = schedule
        .next_after_utc(&Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap())
        .unwrap();
    assert_eq!(next, Utc.with_ymd_and_hms(2024, 4, 1, 12, 0, 0).unwrap());
}

#[test]
fn test_combine_mode_option_forces_and() {
    let options = PatternOptions::builder()
        .combine_mode(Some(CombineMode::And))
        .build();
    let pattern = CronPattern::compile("0 12 1 * MON", &options).unwrap();
    assert!(pattern.day_match(2024, 1, 1));
    assert!(!pattern.day_match(2024, 2, 1));
    assert!(!pattern.day_match(2024, 1, 8));
}

#[test]
fn test_wildcard_day_of_month_defers_to_weekday() {
    let schedule = utc_schedule("0 12 * * MON");
    // Wildcard day-of-month must not turn the OR into match-everything
    assert!(!schedule.matches_utc(&Utc.with_ymd_and_hms(2024, 1, 3, 12, 0, 0).unwrap()));
    assert!(schedule.matches_utc(&Utc.with_ymd_and_hms(2024, 1, 8, 12, 0, 0).unwrap()));
}

#[test]
fn test_nth_weekday_occurrence() {
    // Second Friday of January 2024 is the 12th
    let schedule = utc_schedule("0 0 12 * * FRI#2");
    let next = schedule
        .next_after_utc(&Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
        .unwrap();
    assert_eq!(next, Utc.with_ymd_and_hms(2024, 1, 12, 12, 0, 0).unwrap());
}

#[test]
fn test_last_weekday_occurrence() {
    // Last Friday of 2023 is December 29th
    let schedule = utc_schedule("0 0 0 * * FRI#L");
    assert!(schedule.matches_utc(&Utc.with_ymd_and_hms(2023, 12, 29, 0, 0, 0).unwrap()));
    assert!(!schedule.matches_utc(&Utc.with_ymd_and_hms(2023, 12, 22, 0, 0, 0).unwrap()));

    // The `FRIL` spelling is equivalent
    let suffixed = utc_schedule("0 0 0 * * FRIL");
    assert!(suffixed.matches_utc(&Utc.with_ymd_and_hms(2023, 12, 29, 0, 0, 0).unwrap()));
    assert!(!suffixed.matches_utc(&Utc.with_ymd_and_hms(2023, 12, 22, 0, 0, 0).unwrap()));
}

#[test]
fn test_last_weekday_list_keeps_per_token_selectors() {
    // Each token carries its own selector: only last Mondays and last
    // Fridays match, not every Monday or Friday.
    let schedule = utc_schedule("0 0 0 * * MONL,FRIL");
    assert!(schedule.matches_utc(&Utc.with_ymd_and_hms(2024, 1, 29, 0, 0, 0).unwrap()));
    assert!(schedule.matches_utc(&Utc.with_ymd_and_hms(2024, 1, 26, 0, 0, 0).unwrap()));
    assert!(!schedule.matches_utc(&Utc.with_ymd_and_hms(2024, 1, 8, 0, 0, 0).unwrap()));
    assert!(!schedule.matches_utc(&Utc.with_ymd_and_hms(2024, 1, 19, 0, 0, 0).unwrap()));
}

#[test]
fn test_mixed_occurrence_selectors_accumulate() {
    // First and third Wednesday
    let schedule = utc_schedule("0 0 12 * * WED#1,WED#3");
    assert!(schedule.matches_utc(&Utc.with_ymd_and_hms(2024, 1, 3, 12, 0, 0).unwrap()));
    assert!(schedule.matches_utc(&Utc.with_ymd_and_hms(2024, 1, 17, 12, 0, 0).unwrap()));
    assert!(!schedule.matches_utc(&Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap()));
}

#[test]
fn test_nearest_weekday_clamps_at_month_start() {
    // June 1st 2024 is a Saturday; `1W` must resolve forward to Monday the
    // 3rd, never into May.
    let schedule = utc_schedule("0 0 12 1W 6 *");
    let next = schedule
        .next_after_utc(&Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap())
        .unwrap();
    assert_eq!(next, Utc.with_ymd_and_hms(2024, 6, 3, 12, 0, 0).unwrap());
}

#[test]
fn test_nearest_weekday_pulls_saturday_back() {
    // June 15th 2024 is a Saturday; the nearest weekday is Friday the 14th.
    let schedule = utc_schedule("0 0 12 15W 6 *");
    let next = schedule
        .next_after_utc(&Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap())
        .unwrap();
    assert_eq!(next, Utc.with_ymd_and_hms(2024, 6, 14, 12, 0, 0).unwrap());
}

#[test]
fn test_nearest_weekday_clamps_at_month_end() {
    // November 30th 2025 is a Sunday; the shift forward would cross into
    // December, so it falls back to Friday the 28th.
    let pattern = CronPattern::new("0 0 12 30W 11 *").unwrap();
    assert!(pattern.day_match(2025, 11, 28));
    assert!(!pattern.day_match(2025, 11, 30));
    assert!(!pattern.day_match(2025, 12, 1));
}

#[test]
fn test_nearest_weekday_hits_exact_weekdays() {
    // July 15th 2024 is a Monday and needs no adjustment
    let pattern = CronPattern::new("0 0 12 15W 7 *").unwrap();
    assert!(pattern.day_match(2024, 7, 15));
    assert!(!pattern.day_match(2024, 7, 14));
    assert!(!pattern.day_match(2024, 7, 16));
}

#[test]
fn test_year_constraint_jumps_to_next_admissible_year() {
    let schedule = utc_schedule("0 0 12 1 1 * 2030-2040/5");
    let start = Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap();
    let next = schedule.next_after_utc(&start).unwrap();
    assert_eq!(next, Utc.with_ymd_and_hms(2030, 1, 1, 12, 0, 0).unwrap());

    let after_first = schedule.next_after_utc(&next).unwrap();
    assert_eq!(after_first, Utc.with_ymd_and_hms(2035, 1, 1, 12, 0, 0).unwrap());

    // Nothing admissible lies before the range
    assert_eq!(schedule.previous_before_utc(&start), Err(Unsatisfiable));
}

#[test]
fn test_explicit_year_list() {
    let schedule = utc_schedule("0 0 12 1 6 * 2027,2031");
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let next = schedule.next_after_utc(&start).unwrap();
    assert_eq!(next, Utc.with_ymd_and_hms(2027, 6, 1, 12, 0, 0).unwrap());
    let last = schedule.next_after_utc(&next).unwrap();
    assert_eq!(last, Utc.with_ymd_and_hms(2031, 6, 1, 12, 0, 0).unwrap());
    assert_eq!(schedule.next_after_utc(&last), Err(Unsatisfiable));
}

#[test]
fn test_alternative_numbering_schedules_mondays() {
    let options = PatternOptions::builder()
        .alternative_weekday_numbering(true)
        .build();
    // 2 = Monday under the alternative numbering
    let schedule = TaskScheduleCron::with_options("0 0 12 * * 2", &options)
        .unwrap()
        .in_zone(TimeZoneSpec::utc());
    let next = schedule
        .next_after_utc(&Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap())
        .unwrap();
    assert_eq!(next, Utc.with_ymd_and_hms(2024, 1, 8, 12, 0, 0).unwrap());
}
