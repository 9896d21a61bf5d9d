//! Tokenization and table construction for cron expressions. Nicknames are
//! expanded before field splitting, alphabetic month/weekday names are
//! substituted per field, and each field is then reduced through comma lists,
//! ranges with steps, plain ranges, wildcard steps and literal values.

use std::borrow::Cow;
use super::{
    CombineMode, CronPattern, FieldCount, PatternOptions, YearFilter, YearRange,
    ALL_OCCURRENCES, LAST_OCCURRENCE,
};
use crate::errors::{PatternField, PatternSyntaxError};

const MONTH_NAMES: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];
const WEEKDAY_NAMES: [&str; 7] = ["SUN", "MON", "TUE", "WED", "THU", "FRI", "SAT"];

pub(super) fn compile(
    expression: &str,
    options: &PatternOptions,
) -> Result<CronPattern, PatternSyntaxError> {
    let trimmed = expression.trim();
    let expanded = expand_nickname(trimmed)?;
    let fields: Vec<&str> = expanded.split_whitespace().collect();

    match options.mode {
        FieldCount::Auto => {
            if !(5..=7).contains(&fields.len()) {
                return Err(PatternSyntaxError::FieldCount(fields.len()));
            }
        }
        pinned => {
            let expected = match pinned {
                FieldCount::Five => 5,
                FieldCount::Six => 6,
                _ => 7,
            };
            if fields.len() != expected {
                return Err(PatternSyntaxError::PinnedFieldCount {
                    expected,
                    found: fields.len(),
                });
            }
        }
    }

    // A 5-field expression has no seconds (they default to 0) and no year;
    // a 6-field one adds seconds, a 7-field one adds the year constraint.
    let (seconds_src, minutes_src, hours_src, dom_src, month_src, dow_src, year_src) =
        match fields.len() {
            5 => ("0", fields[0], fields[1], fields[2], fields[3], fields[4], "*"),
            6 => (fields[0], fields[1], fields[2], fields[3], fields[4], fields[5], "*"),
            _ => (fields[0], fields[1], fields[2], fields[3], fields[4], fields[5], fields[6]),
        };

    let mut pattern = CronPattern::empty(trimmed);

    let (dow_src, forced_and) = match dow_src.strip_prefix('+') {
        Some(rest) => (rest, true),
        None => (dow_src, false),
    };
    pattern.combine_mode = if forced_and {
        CombineMode::And
    } else {
        options.combine_mode.unwrap_or_default()
    };

    parse_clock_field(seconds_src, PatternField::Second, 59, &mut pattern.seconds)?;
    parse_clock_field(minutes_src, PatternField::Minute, 59, &mut pattern.minutes)?;
    parse_clock_field(hours_src, PatternField::Hour, 23, &mut pattern.hours)?;
    parse_dom_field(dom_src, &mut pattern)?;
    parse_month_field(month_src, &mut pattern.months)?;
    parse_dow_field(dow_src, options.alternative_weekday_numbering, &mut pattern)?;
    pattern.years = parse_year_field(year_src)?;

    #[cfg(feature = "logging")]
    tracing::trace!(pattern = %pattern, "compiled cron expression");

    Ok(pattern)
}

fn expand_nickname(expression: &str) -> Result<Cow<'_, str>, PatternSyntaxError> {
    if !expression.starts_with('@') {
        return Ok(Cow::Borrowed(expression));
    }
    let nickname = expression.to_ascii_lowercase();
    let expanded = match nickname.as_str() {
        "@yearly" | "@annually" => "0 0 1 1 *",
        "@monthly" => "0 0 1 * *",
        "@weekly" => "0 0 * * 0",
        "@daily" | "@midnight" => "0 0 * * *",
        "@hourly" => "0 * * * *",
        _ => return Err(PatternSyntaxError::UnknownNickname(expression.to_owned())),
    };
    Ok(Cow::Borrowed(expanded))
}

#[derive(Clone, Copy)]
struct Bounds {
    field: PatternField,
    min: u32,
    max: u32,
}

#[derive(Clone, Copy)]
enum Item {
    Every(u32),
    Range(u32, u32, u32),
    Single(u32),
}

/// Digits-only parse; rejects signs, whitespace and anything that overflows.
fn parse_digits(src: &str) -> Option<i64> {
    if src.is_empty() || !src.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    src.parse().ok()
}

fn parse_bounded(src: &str, bounds: &Bounds) -> Result<u32, PatternSyntaxError> {
    let value = parse_digits(src).ok_or_else(|| PatternSyntaxError::IllegalToken {
        field: bounds.field,
        token: src.to_owned(),
    })?;
    if value < bounds.min as i64 || value > bounds.max as i64 {
        return Err(PatternSyntaxError::ValueOutOfRange {
            field: bounds.field,
            value,
            min: bounds.min,
            max: bounds.max,
        });
    }
    Ok(value as u32)
}

fn parse_item(token: &str, bounds: &Bounds) -> Result<Item, PatternSyntaxError> {
    let field = bounds.field;
    let (base, step) = match token.split_once('/') {
        Some((base, step_src)) => {
            let step = parse_digits(step_src).ok_or_else(|| PatternSyntaxError::IllegalToken {
                field,
                token: token.to_owned(),
            })?;
            if step < 1 || step > (bounds.max - bounds.min + 1) as i64 {
                return Err(PatternSyntaxError::InvalidStep {
                    field,
                    token: token.to_owned(),
                });
            }
            (base, Some(step as u32))
        }
        None => (token, None),
    };

    if base == "*" {
        return Ok(Item::Every(step.unwrap_or(1)));
    }
    if let Some((lo_src, hi_src)) = base.split_once('-') {
        let lo = parse_bounded(lo_src, bounds)?;
        let hi = parse_bounded(hi_src, bounds)?;
        if lo > hi {
            return Err(PatternSyntaxError::ReversedRange {
                field,
                token: token.to_owned(),
            });
        }
        return Ok(Item::Range(lo, hi, step.unwrap_or(1)));
    }
    if parse_digits(base).is_some() {
        // `5/5` pins a step to a single value; the stricter historic grammar
        // requires an explicit range (`5-59/5`) or a wildcard base.
        if step.is_some() {
            return Err(PatternSyntaxError::BareStep {
                field,
                token: token.to_owned(),
            });
        }
        return Ok(Item::Single(parse_bounded(base, bounds)?));
    }
    Err(PatternSyntaxError::IllegalToken {
        field,
        token: token.to_owned(),
    })
}

fn expand_item(item: Item, bounds: &Bounds) -> Vec<u32> {
    let (lo, hi, step) = match item {
        Item::Every(step) => (bounds.min, bounds.max, step),
        Item::Range(lo, hi, step) => (lo, hi, step),
        Item::Single(value) => (value, value, 1),
    };
    let mut values = Vec::new();
    let mut value = lo;
    while value <= hi {
        values.push(value);
        value += step;
    }
    values
}

fn parse_clock_field(
    src: &str,
    field: PatternField,
    max: u32,
    table: &mut [bool],
) -> Result<(), PatternSyntaxError> {
    if src == "?" {
        return Err(PatternSyntaxError::MisplacedModifier {
            field,
            token: "?".to_owned(),
        });
    }
    let bounds = Bounds { field, min: 0, max };
    for token in src.split(',') {
        let item = parse_item(token, &bounds)?;
        for value in expand_item(item, &bounds) {
            table[value as usize] = true;
        }
    }
    Ok(())
}

fn parse_month_field(src: &str, table: &mut [bool; 12]) -> Result<(), PatternSyntaxError> {
    let field = PatternField::Month;
    if src == "?" {
        return Err(PatternSyntaxError::MisplacedModifier {
            field,
            token: "?".to_owned(),
        });
    }
    let normalized = substitute_names(src, &MONTH_NAMES, 1);
    let bounds = Bounds { field, min: 1, max: 12 };
    for token in normalized.split(',') {
        let item = parse_item(token, &bounds)?;
        for value in expand_item(item, &bounds) {
            table[value as usize - 1] = true;
        }
    }
    Ok(())
}

fn parse_dom_field(src: &str, pattern: &mut CronPattern) -> Result<(), PatternSyntaxError> {
    let field = PatternField::DayOfMonth;
    if src == "*" || src == "?" {
        pattern.dom_wildcard = true;
        pattern.days = [true; 31];
        return Ok(());
    }
    let bounds = Bounds { field, min: 1, max: 31 };
    let normalized = src.to_ascii_uppercase();
    for token in normalized.split(',') {
        if token == "L" {
            pattern.last_day_of_month = true;
            continue;
        }
        if let Some(base) = token.strip_suffix('W') {
            if base.contains('-') || base.contains('/') {
                return Err(PatternSyntaxError::ModifierWithRange {
                    field,
                    token: token.to_owned(),
                });
            }
            let day = parse_bounded(base, &bounds)?;
            pattern.nearest_weekdays[day as usize - 1] = true;
            continue;
        }
        if token.contains('W') {
            return Err(PatternSyntaxError::ModifierWithRange {
                field,
                token: token.to_owned(),
            });
        }
        if token.contains('L') {
            return Err(PatternSyntaxError::IllegalToken {
                field,
                token: token.to_owned(),
            });
        }
        let item = parse_item(token, &bounds)?;
        for value in expand_item(item, &bounds) {
            pattern.days[value as usize - 1] = true;
        }
    }
    Ok(())
}

fn parse_dow_field(
    src: &str,
    alternative: bool,
    pattern: &mut CronPattern,
) -> Result<(), PatternSyntaxError> {
    let field = PatternField::DayOfWeek;
    if src == "*" || src == "?" {
        pattern.dow_wildcard = true;
        pattern.weekdays = [ALL_OCCURRENCES; 7];
        return Ok(());
    }
    // With alternative numbering names substitute to 1..=7 so that literals
    // and names shift uniformly afterwards.
    let normalized = substitute_names(src, &WEEKDAY_NAMES, if alternative { 1 } else { 0 });
    let bounds = Bounds {
        field,
        min: if alternative { 1 } else { 0 },
        max: 7,
    };
    for token in normalized.split(',') {
        if let Some((base, selector)) = token.split_once('#') {
            let bit = match selector {
                "L" => LAST_OCCURRENCE,
                _ => match parse_digits(selector) {
                    Some(nth @ 1..=5) => 1u8 << (nth as u32 - 1),
                    _ => {
                        return Err(PatternSyntaxError::IllegalToken {
                            field,
                            token: token.to_owned(),
                        })
                    }
                },
            };
            let index = single_weekday(base, token, alternative, &bounds)?;
            pattern.weekdays[index] |= bit;
            continue;
        }
        if let Some(base) = token.strip_suffix('L') {
            if base.is_empty() {
                return Err(PatternSyntaxError::IllegalToken {
                    field,
                    token: token.to_owned(),
                });
            }
            let index = single_weekday(base, token, alternative, &bounds)?;
            pattern.weekdays[index] |= LAST_OCCURRENCE;
            continue;
        }
        let item = parse_item(token, &bounds)?;
        for raw in expand_item(item, &bounds) {
            pattern.weekdays[fold_weekday(raw, alternative)] |= ALL_OCCURRENCES;
        }
    }
    Ok(())
}

/// Occurrence selectors bind to exactly one weekday; a range or step base is
/// a disallowed combination.
fn single_weekday(
    base: &str,
    token: &str,
    alternative: bool,
    bounds: &Bounds,
) -> Result<usize, PatternSyntaxError> {
    if base.contains('-') || base.contains('/') {
        return Err(PatternSyntaxError::ModifierWithRange {
            field: bounds.field,
            token: token.to_owned(),
        });
    }
    let value = parse_bounded(base, bounds)?;
    Ok(fold_weekday(value, alternative))
}

fn fold_weekday(raw: u32, alternative: bool) -> usize {
    let shifted = if alternative { raw - 1 } else { raw };
    (if shifted == 7 { 0 } else { shifted }) as usize
}

fn parse_year_field(src: &str) -> Result<Option<YearFilter>, PatternSyntaxError> {
    if src == "*" {
        return Ok(None);
    }
    let field = PatternField::Year;
    if src == "?" {
        return Err(PatternSyntaxError::MisplacedModifier {
            field,
            token: "?".to_owned(),
        });
    }
    let bounds = Bounds { field, min: 1, max: 9999 };
    let mut ranges = Vec::new();
    for token in src.split(',') {
        ranges.push(match parse_item(token, &bounds)? {
            Item::Every(step) => YearRange {
                start: 1,
                end: 9999,
                step: step as i32,
            },
            Item::Range(lo, hi, step) => YearRange {
                start: lo as i32,
                end: hi as i32,
                step: step as i32,
            },
            Item::Single(value) => YearRange {
                start: value as i32,
                end: value as i32,
                step: 1,
            },
        });
    }
    Ok(Some(YearFilter::new(ranges)))
}

fn substitute_names(src: &str, names: &[&str], base: u32) -> String {
    let mut out = src.to_ascii_uppercase();
    for (index, name) in names.iter().enumerate() {
        if out.contains(name) {
            out = out.replace(name, &(base + index as u32).to_string());
        }
    }
    out
}
