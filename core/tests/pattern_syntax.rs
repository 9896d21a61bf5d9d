// core/tests/pattern_syntax.rs
use cronwheel_core::errors::PatternSyntaxError;
use cronwheel_core::pattern::{CronPattern, FieldCount, PatternOptions};

#[test]
fn test_accepts_five_six_and_seven_fields() {
    assert!(CronPattern::new("* * * * *").is_ok());
    assert!(CronPattern::new("0 * * * * *").is_ok());
    assert!(CronPattern::new("0 0 12 * * * 2030").is_ok());
}

#[test]
fn test_rejects_wrong_field_count() {
    assert!(matches!(
        CronPattern::new("* * * *"),
        Err(PatternSyntaxError::FieldCount(4))
    ));
    assert!(matches!(
        CronPattern::new("* * * * * * * *"),
        Err(PatternSyntaxError::FieldCount(8))
    ));
}

#[test]
fn test_pinned_field_count() {
    let options = PatternOptions::builder().mode(FieldCount::Six).build();
    assert!(CronPattern::compile("0 0 12 * * *", &options).is_ok());
    assert!(matches!(
        CronPattern::compile("0 12 * * *", &options),
        Err(PatternSyntaxError::PinnedFieldCount {
            expected: 6,
            found: 5
        })
    ));
}

#[test]
fn test_five_fields_default_seconds_to_zero() {
    let pattern = CronPattern::new("30 12 * * *").unwrap();
    assert!(pattern.second_match(0));
    assert!(!pattern.second_match(30));
    assert!(pattern.minute_match(30));
}

#[test]
fn test_nickname_expansion() {
    let daily = CronPattern::new("@daily").unwrap();
    assert!(daily.second_match(0) && daily.minute_match(0) && daily.hour_match(0));
    assert!(!daily.hour_match(12));

    let yearly = CronPattern::new("@yearly").unwrap();
    assert!(yearly.month_match(1) && !yearly.month_match(2));

    // Nicknames are case-insensitive
    assert!(CronPattern::new("@Hourly").is_ok());
}

#[test]
fn test_unknown_nickname() {
    assert!(matches!(
        CronPattern::new("@fortnightly"),
        Err(PatternSyntaxError::UnknownNickname(_))
    ));
}

#[test]
fn test_month_and_weekday_names() {
    let pattern = CronPattern::new("0 12 * jan,MAR mon-fri").unwrap();
    assert!(pattern.month_match(1));
    assert!(pattern.month_match(3));
    assert!(!pattern.month_match(2));
    // 2024-01-02 is a Tuesday, 2024-01-06 a Saturday
    assert!(pattern.day_match(2024, 1, 2));
    assert!(!pattern.day_match(2024, 1, 6));
}

#[test]
fn test_lists_ranges_and_steps() {
    let pattern = CronPattern::new("0 0,15,30-35 */6 * * *").unwrap();
    assert!(pattern.minute_match(15));
    assert!(pattern.minute_match(33));
    assert!(!pattern.minute_match(36));
    assert!(pattern.hour_match(0) && pattern.hour_match(18));
    assert!(!pattern.hour_match(13));

    let stepped = CronPattern::new("0 10-30/10 * * * *").unwrap();
    assert!(stepped.minute_match(10) && stepped.minute_match(20) && stepped.minute_match(30));
    assert!(!stepped.minute_match(15));
}

#[test]
fn test_rejects_reversed_range() {
    assert!(matches!(
        CronPattern::new("0 10-5 * * * *"),
        Err(PatternSyntaxError::ReversedRange { .. })
    ));
}

#[test]
fn test_rejects_zero_and_excessive_step() {
    assert!(matches!(
        CronPattern::new("0 */0 * * * *"),
        Err(PatternSyntaxError::InvalidStep { .. })
    ));
    assert!(matches!(
        CronPattern::new("0 0-59/61 * * * *"),
        Err(PatternSyntaxError::InvalidStep { .. })
    ));
}

#[test]
fn test_rejects_bare_numeric_step() {
    // `5/5` must be spelled with an explicit range, e.g. `5-59/5`
    assert!(matches!(
        CronPattern::new("0 5/5 * * * *"),
        Err(PatternSyntaxError::BareStep { .. })
    ));
    assert!(CronPattern::new("0 5-59/5 * * * *").is_ok());
}

#[test]
fn test_rejects_out_of_range_values() {
    assert!(matches!(
        CronPattern::new("60 * * * * *"),
        Err(PatternSyntaxError::ValueOutOfRange { .. })
    ));
    assert!(matches!(
        CronPattern::new("0 0 24 * * *"),
        Err(PatternSyntaxError::ValueOutOfRange { .. })
    ));
    assert!(matches!(
        CronPattern::new("0 0 12 32 * *"),
        Err(PatternSyntaxError::ValueOutOfRange { .. })
    ));
    assert!(matches!(
        CronPattern::new("0 0 12 * 13 *"),
        Err(PatternSyntaxError::ValueOutOfRange { .. })
    ));
    assert!(matches!(
        CronPattern::new("0 0 12 * * 8"),
        Err(PatternSyntaxError::ValueOutOfRange { .. })
    ));
}

#[test]
fn test_rejects_year_outside_supported_range() {
    assert!(matches!(
        CronPattern::new("0 0 12 * * * 0"),
        Err(PatternSyntaxError::ValueOutOfRange { .. })
    ));
    assert!(matches!(
        CronPattern::new("0 0 12 * * * 10000"),
        Err(PatternSyntaxError::ValueOutOfRange { .. })
    ));
    assert!(CronPattern::new("0 0 12 * * * 9999").is_ok());
}

#[test]
fn test_rejects_nearest_weekday_with_range() {
    assert!(matches!(
        CronPattern::new("0 0 12 1-5W * *"),
        Err(PatternSyntaxError::ModifierWithRange { .. })
    ));
    assert!(matches!(
        CronPattern::new("0 0 12 15W-20 * *"),
        Err(PatternSyntaxError::ModifierWithRange { .. })
    ));
}

#[test]
fn test_rejects_occurrence_selector_on_range() {
    assert!(matches!(
        CronPattern::new("0 0 12 * * MON-FRI#2"),
        Err(PatternSyntaxError::ModifierWithRange { .. })
    ));
}

#[test]
fn test_question_mark_only_on_day_fields() {
    assert!(CronPattern::new("0 0 12 ? * MON").is_ok());
    assert!(CronPattern::new("0 0 12 15 * ?").is_ok());
    assert!(matches!(
        CronPattern::new("0 ? 12 * * *"),
        Err(PatternSyntaxError::MisplacedModifier { .. })
    ));
    assert!(matches!(
        CronPattern::new("0 0 12 * * * ?"),
        Err(PatternSyntaxError::MisplacedModifier { .. })
    ));
}

#[test]
fn test_plus_prefix_only_on_weekday_field() {
    assert!(CronPattern::new("0 0 12 1 * +MON").is_ok());
    assert!(matches!(
        CronPattern::new("0 0 12 +1 * *"),
        Err(PatternSyntaxError::IllegalToken { .. })
    ));
}

#[test]
fn test_illegal_tokens() {
    assert!(matches!(
        CronPattern::new("0 0 12 * * MONDAY"),
        Err(PatternSyntaxError::IllegalToken { .. })
    ));
    assert!(matches!(
        CronPattern::new("0 0 12 * bogus *"),
        Err(PatternSyntaxError::IllegalToken { .. })
    ));
    assert!(matches!(
        CronPattern::new("0 0 12 3L * *"),
        Err(PatternSyntaxError::IllegalToken { .. })
    ));
}

#[test]
fn test_weekday_seven_folds_to_sunday() {
    let pattern = CronPattern::new("0 0 12 * * 7").unwrap();
    // 2024-01-07 is a Sunday
    assert!(pattern.day_match(2024, 1, 7));
    assert!(!pattern.day_match(2024, 1, 8));
}

#[test]
fn test_alternative_weekday_numbering() {
    let options = PatternOptions::builder()
        .alternative_weekday_numbering(true)
        .build();
    // 1 = Sunday under the alternative numbering
    let pattern = CronPattern::compile("0 0 12 * * 1", &options).unwrap();
    assert!(pattern.day_match(2024, 1, 7));
    assert!(!pattern.day_match(2024, 1, 8));
    // 0 is no longer a legal literal
    assert!(matches!(
        CronPattern::compile("0 0 12 * * 0", &options),
        Err(PatternSyntaxError::ValueOutOfRange { .. })
    ));
    // Names keep their meaning regardless of numbering
    let named = CronPattern::compile("0 0 12 * * SUN", &options).unwrap();
    assert!(named.day_match(2024, 1, 7));
}
