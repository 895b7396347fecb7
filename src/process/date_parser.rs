use chrono::{Datelike, NaiveDate, NaiveDateTime};
use std::ops::RangeInclusive;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::process::raw_table::RawValue;
use crate::process::utils::clean_str;
use crate::schema::DateStrategy;

/// Three numeric groups separated by `/`, `-`, `.` or whitespace, with an
/// optional time-of-day tail that is ignored.
static NUMERIC_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,4})\s*[/\-.\s]\s*(\d{1,2})\s*[/\-.\s]\s*(\d{1,4})(?:[T\s]+\d{1,2}:\d{2}(?::\d{2}(?:\.\d+)?)?)?$")
        .expect("numeric date pattern")
});

/// chrono's `%Y` takes one to four digits; a short year such as `23` in
/// `25/12/23` is a typo, not the year 23.
const FOUR_DIGIT_YEARS: RangeInclusive<i32> = 1000..=9999;

/// Compiled date rules for one source.
///
/// Each raw value maps to `Some(date)` or `None`, the unparseable marker.
/// Parsing never fails loudly; callers count the `None`s.
#[derive(Debug)]
pub enum DateParser {
    Fixed(String),
    DayFirst,
    Ordered(Vec<String>),
    TokenText(Regex),
}

impl DateParser {
    pub fn new(strategy: &DateStrategy) -> Self {
        match strategy {
            DateStrategy::Fixed { format } => DateParser::Fixed(format.clone()),
            DateStrategy::DayFirst => DateParser::DayFirst,
            DateStrategy::Ordered { formats } => DateParser::Ordered(formats.clone()),
            DateStrategy::TokenText { year, month, day } => {
                DateParser::TokenText(token_pattern(year, month, day))
            }
        }
    }

    pub fn parse(&self, value: &RawValue) -> Option<NaiveDate> {
        match (self, value) {
            (_, RawValue::Empty) | (_, RawValue::Number(_)) => None,
            // only strings are candidates for the cascade
            (DateParser::Ordered(_), RawValue::Date(_)) => None,
            (_, RawValue::Date(dt)) => Some(dt.date()),
            (DateParser::Fixed(format), RawValue::Text(s)) => parse_with_format(&clean_str(s), format),
            (DateParser::DayFirst, RawValue::Text(s)) => parse_day_first(&clean_str(s)),
            (DateParser::Ordered(formats), RawValue::Text(s)) => {
                parse_ordered(&clean_str(s), formats)
            }
            (DateParser::TokenText(re), RawValue::Text(s)) => parse_tokens(&clean_str(s), re),
        }
    }
}

/// One-shot helper for callers that do not keep a [`DateParser`] around.
pub fn normalize(value: &RawValue, strategy: &DateStrategy) -> Option<NaiveDate> {
    DateParser::new(strategy).parse(value)
}

/// A format may carry a time component; only the date part is kept.
/// Dates outside four-digit years are unparseable.
pub fn parse_with_format(s: &str, format: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, format)
        .ok()
        .or_else(|| NaiveDateTime::parse_from_str(s, format).ok().map(|dt| dt.date()))
        .filter(|d| FOUR_DIGIT_YEARS.contains(&d.year()))
}

/// Try each format in turn; the first that parses wins.
pub fn parse_ordered(s: &str, formats: &[String]) -> Option<NaiveDate> {
    formats.iter().find_map(|f| parse_with_format(s, f))
}

/// Day-before-month reading of a numeric date.
///
/// - a four-digit first group is year-month-day
/// - otherwise day-month-year, falling back to month-day-year when the
///   day-first reading is not a real date
pub fn parse_day_first(s: &str) -> Option<NaiveDate> {
    let caps = NUMERIC_DATE.captures(s)?;
    let a = &caps[1];
    let b: u32 = caps[2].parse().ok()?;
    let c = &caps[3];

    if a.len() == 4 {
        let year: i32 = a.parse().ok()?;
        let day: u32 = c.parse().ok()?;
        return NaiveDate::from_ymd_opt(year, b, day);
    }
    if a.len() > 2 {
        return None;
    }
    let first: u32 = a.parse().ok()?;
    let year = expand_year(c)?;
    NaiveDate::from_ymd_opt(year, b, first).or_else(|| NaiveDate::from_ymd_opt(year, first, b))
}

/// Two-digit years follow chrono's `%y` window: 00-68 → 20xx, 69-99 → 19xx.
fn expand_year(s: &str) -> Option<i32> {
    let y: i32 = s.parse().ok()?;
    match s.len() {
        4 => Some(y),
        1 | 2 if y <= 68 => Some(2000 + y),
        1 | 2 => Some(1900 + y),
        _ => None,
    }
}

fn token_pattern(year: &str, month: &str, day: &str) -> Regex {
    let pattern = format!(
        r"^(\d{{4}})\s*{}\s*(\d{{1,2}})\s*{}\s*(\d{{1,2}})\s*{}$",
        regex::escape(year),
        regex::escape(month),
        regex::escape(day)
    );
    // every user-supplied piece is escaped, so the pattern is always valid
    Regex::new(&pattern).expect("escaped token pattern")
}

fn parse_tokens(s: &str, re: &Regex) -> Option<NaiveDate> {
    let caps = re.captures(s)?;
    let year: i32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let day: u32 = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}
