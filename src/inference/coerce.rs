//! Scalar coercion
//!
//! Converts one raw scalar into the most specific representation it supports.
//! Order of preference: temporal, boolean, integer, exact decimal, float, text.
//! Coercion is total: anything that matches nothing else comes back as text.

use std::str::FromStr;

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

use crate::models::Scalar;

/// A raw scalar after coercion to its most specific type
#[derive(Debug, Clone, PartialEq)]
pub enum Coerced {
    /// Null, empty, or whitespace-only input
    Null,
    Temporal(NaiveDateTime),
    Boolean(bool),
    Integer(i128),
    /// Exact decimal literal; scale and digits are those of the literal
    Decimal(Decimal),
    Float(f64),
    /// Text, exactly as given
    Text(String),
}

impl Coerced {
    pub fn is_null(&self) -> bool {
        matches!(self, Coerced::Null)
    }
}

const TRUE_WORDS: &[&str] = &["1", "true", "t", "y", "yes"];
const FALSE_WORDS: &[&str] = &["0", "false", "f", "n", "no"];

/// Digit-run lengths accepted as compact dates (YYYY, YYMMDD, YYYYMMDD, ...)
const DATE_DIGIT_RUNS: &[usize] = &[4, 6, 8, 12, 14];

/// Years outside this open interval are treated as false date hits
const MIN_YEAR: i32 = 1700;
const MAX_YEAR: i32 = 2150;

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

const WEEKDAYS: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

/// Words that may appear in a date without carrying a date part
const FILLER_WORDS: &[&str] = &["t", "at", "on", "of", "the", "and", "ad", "st", "nd", "rd", "th"];

static DATE_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\-\. /]").unwrap());

static DIGITS_ONLY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").unwrap());

static TIME_FRAGMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(\d{1,2}):(\d{2})(?::(\d{2})(?:[.,](\d{1,9}))?)?\s*(am|pm|a\.m\.|p\.m\.)?(?:\s*(?:z|utc|gmt|[+-]\d{2}:?\d{2}))?",
    )
    .unwrap()
});

/// Coerce a raw scalar, using the local current date for the temporal heuristics
pub fn coerce(raw: &Scalar) -> Coerced {
    coerce_with_reference(raw, Local::now().date_naive())
}

/// Coerce a raw scalar
///
/// `today` is the date a partial temporal value is completed from; values
/// that only parse as "today" are rejected as false date hits.
pub fn coerce_with_reference(raw: &Scalar, today: NaiveDate) -> Coerced {
    match raw {
        Scalar::Null => Coerced::Null,
        Scalar::Temporal(t) => Coerced::Temporal(*t),
        Scalar::Bool(b) => Coerced::Boolean(*b),
        Scalar::Text(s) if s.trim().is_empty() => Coerced::Null,
        Scalar::Text(s) => match parse_temporal(s, today) {
            Some(t) => Coerced::Temporal(t),
            None => coerce_text(s),
        },
        // Numbers go through their printed form, so 0 and 1 read as booleans
        other => coerce_text(&other.to_string()),
    }
}

fn coerce_text(text: &str) -> Coerced {
    let trimmed = text.trim();
    let lower = trimmed.to_lowercase();
    if TRUE_WORDS.contains(&lower.as_str()) {
        return Coerced::Boolean(true);
    }
    if FALSE_WORDS.contains(&lower.as_str()) {
        return Coerced::Boolean(false);
    }
    if let Ok(i) = trimmed.parse::<i128>() {
        return Coerced::Integer(i);
    }
    if let Some(d) = parse_decimal(trimmed) {
        return Coerced::Decimal(d);
    }
    if let Ok(x) = trimmed.parse::<f64>() {
        return Coerced::Float(x);
    }
    Coerced::Text(text.to_string())
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

/// Parse `text` as a date/time, rejecting likely false hits
///
/// The parser itself is permissive. A parse is accepted when the text has at
/// least two date separators, or when it is a single digit run of a compact
/// date length whose year is plausible and which did not simply resolve to
/// `today`.
pub fn parse_temporal(text: &str, today: NaiveDate) -> Option<NaiveDateTime> {
    let parsed = parse_datetime(text, today)?;
    let clean = text
        .trim()
        .trim_start_matches('-')
        .trim_start_matches('0')
        .trim_end_matches('.');
    if DATE_SEPARATOR.find_iter(clean).count() >= 2 {
        return Some(parsed);
    }
    if !DIGITS_ONLY.is_match(clean) || !DATE_DIGIT_RUNS.contains(&clean.len()) {
        return None;
    }
    if parsed.date() == today {
        return None;
    }
    if parsed.year() <= MIN_YEAR || parsed.year() >= MAX_YEAR {
        return None;
    }
    Some(parsed)
}

/// Permissive date/time parser
///
/// Missing date parts are filled from `today`, missing time parts are zero.
fn parse_datetime(text: &str, today: NaiveDate) -> Option<NaiveDateTime> {
    let mut rest = text.trim().to_string();
    let mut time = None;

    if let Some(caps) = TIME_FRAGMENT.captures(&rest) {
        let mut hour: u32 = caps.get(1)?.as_str().parse().ok()?;
        let minute: u32 = caps.get(2)?.as_str().parse().ok()?;
        let second: u32 = match caps.get(3) {
            Some(m) => m.as_str().parse().ok()?,
            None => 0,
        };
        let nanos: u32 = match caps.get(4) {
            Some(m) => format!("{:0<9}", m.as_str()).parse().ok()?,
            None => 0,
        };
        if let Some(meridiem) = caps.get(5) {
            let pm = meridiem.as_str().to_lowercase().starts_with('p');
            if hour > 12 {
                return None;
            }
            hour = match (pm, hour) {
                (true, 12) => 12,
                (true, h) => h + 12,
                (false, 12) => 0,
                (false, h) => h,
            };
        }
        time = Some(NaiveTime::from_hms_nano_opt(hour, minute, second, nanos)?);
        let range = caps.get(0)?.range();
        rest.replace_range(range, " ");
    }

    let mut month = None;
    let mut numbers: Vec<&str> = Vec::new();
    for piece in split_runs(&rest) {
        if piece.chars().all(|c| c.is_ascii_digit()) {
            numbers.push(piece);
            continue;
        }
        let word = piece.to_lowercase();
        if let Some(m) = month_number(&word) {
            if month.replace(m).is_some() {
                return None;
            }
        } else if !is_weekday(&word) && !FILLER_WORDS.contains(&word.as_str()) {
            return None;
        }
    }

    let (year, month, day) = match (month, numbers.as_slice()) {
        (None, []) => {
            time?;
            (today.year(), today.month(), Some(today.day()))
        }
        (None, [n]) => {
            let (date, clock) = compact_date(n, today)?;
            if clock.is_some() {
                time = clock;
            }
            (date.year(), date.month(), Some(date.day()))
        }
        (None, [a, b]) => {
            if a.len() == 4 {
                (number(a)? as i32, number(b)?, None)
            } else if b.len() == 4 {
                (number(b)? as i32, number(a)?, None)
            } else {
                (today.year(), number(a)?, Some(number(b)?))
            }
        }
        (None, [a, b, c]) => {
            if a.len() >= 3 {
                (year_of(a, today)?, number(b)?, Some(number(c)?))
            } else if number(a)? > 12 {
                (year_of(c, today)?, number(b)?, Some(number(a)?))
            } else {
                (year_of(c, today)?, number(a)?, Some(number(b)?))
            }
        }
        (Some(m), []) => (today.year(), m, None),
        (Some(m), [a]) => {
            if a.len() >= 3 || number(a)? > 31 {
                (year_of(a, today)?, m, None)
            } else {
                (today.year(), m, Some(number(a)?))
            }
        }
        (Some(m), [a, b]) => {
            if a.len() >= 3 || number(a)? > 31 {
                (year_of(a, today)?, m, Some(number(b)?))
            } else {
                (year_of(b, today)?, m, Some(number(a)?))
            }
        }
        _ => return None,
    };

    let day = match day {
        Some(d) => d,
        None => today.day().min(last_day_of_month(year, month)?),
    };
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    Some(date.and_time(time.unwrap_or(NaiveTime::MIN)))
}

/// Interpret a lone digit run: YYYY, YYMMDD, YYYYMMDD, YYYYMMDDhhmm, YYYYMMDDhhmmss
fn compact_date(digits: &str, today: NaiveDate) -> Option<(NaiveDate, Option<NaiveTime>)> {
    let part = |from: usize, to: usize| -> Option<u32> { digits.get(from..to)?.parse().ok() };
    let (date, time) = match digits.len() {
        1 | 2 => {
            let day = number(digits)?;
            (
                NaiveDate::from_ymd_opt(today.year(), today.month(), day)?,
                None,
            )
        }
        4 => {
            let year = number(digits)? as i32;
            let day = today.day().min(last_day_of_month(year, today.month())?);
            (NaiveDate::from_ymd_opt(year, today.month(), day)?, None)
        }
        6 => (
            NaiveDate::from_ymd_opt(year_of(&digits[..2], today)?, part(2, 4)?, part(4, 6)?)?,
            None,
        ),
        8 | 12 | 14 => {
            let date = NaiveDate::from_ymd_opt(part(0, 4)? as i32, part(4, 6)?, part(6, 8)?)?;
            let time = match digits.len() {
                12 => Some(NaiveTime::from_hms_opt(part(8, 10)?, part(10, 12)?, 0)?),
                14 => Some(NaiveTime::from_hms_opt(
                    part(8, 10)?,
                    part(10, 12)?,
                    part(12, 14)?,
                )?),
                _ => None,
            };
            (date, time)
        }
        _ => return None,
    };
    Some((date, time))
}

/// Split text into alternating runs of ASCII digits and letters, dropping separators
fn split_runs(text: &str) -> Vec<&str> {
    let mut runs = Vec::new();
    let mut start: Option<(usize, bool)> = None;
    for (i, c) in text.char_indices() {
        let class = if c.is_ascii_digit() {
            Some(true)
        } else if c.is_alphabetic() {
            Some(false)
        } else {
            None
        };
        match (start, class) {
            (Some((s, digit)), Some(d)) if digit != d => {
                runs.push(&text[s..i]);
                start = Some((i, d));
            }
            (Some(_), Some(_)) => {}
            (Some((s, _)), None) => {
                runs.push(&text[s..i]);
                start = None;
            }
            (None, Some(d)) => start = Some((i, d)),
            (None, None) => {}
        }
    }
    if let Some((s, _)) = start {
        runs.push(&text[s..]);
    }
    runs
}

fn number(digits: &str) -> Option<u32> {
    if digits.len() > 9 {
        return None;
    }
    digits.parse().ok()
}

/// Two-digit years land within fifty years of `today`
fn year_of(digits: &str, today: NaiveDate) -> Option<i32> {
    let value = number(digits)? as i32;
    if digits.len() > 2 {
        return Some(value);
    }
    let mut year = 2000 + value;
    if year > today.year() + 50 {
        year -= 100;
    }
    Some(year)
}

fn month_number(word: &str) -> Option<u32> {
    if word == "sept" {
        return Some(9);
    }
    if word.len() < 3 {
        return None;
    }
    MONTHS
        .iter()
        .position(|m| m.starts_with(word))
        .map(|i| i as u32 + 1)
}

fn is_weekday(word: &str) -> bool {
    word.len() >= 3 && WEEKDAYS.iter().any(|d| d.starts_with(word))
}

fn last_day_of_month(year: i32, month: u32) -> Option<u32> {
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    first_of_next.pred_opt().map(|d| d.day())
}
