//! Cascading date/time parsing.
//!
//! Each parser walks a fixed list of strftime patterns and returns the first
//! one that consumes the whole (trimmed) input. The order of the lists decides
//! ambiguous inputs such as `03-04-2024` (day first wins) and must not change.

use chrono::format::{Item, StrftimeItems};
use std::fmt::Write;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{ColwrightError, Result};
use crate::schema::Cell;

/// Date-only patterns, in priority order.
pub const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%d-%m-%Y",
    "%m-%d-%Y",
    "%Y/%m/%d",
    "%d/%m/%Y",
    "%m/%d/%Y",
    "%Y%m%d",
    "%d%m%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

/// Time-only patterns, in priority order.
pub const TIME_FORMATS: &[&str] = &["%H:%M:%S", "%H:%M", "%I:%M:%S %p", "%I:%M %p", "%H%M%S", "%H%M"];

/// Combined date and time patterns, in priority order.
pub const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%SZ",
    "%d-%m-%Y %H:%M:%S",
    "%m-%d-%Y %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
];

/// A cascade entry: the chrono pattern plus the input shape strptime accepts
/// for it. chrono alone lets `%Y` match one to three digits.
struct Pattern {
    format: &'static str,
    shape: Regex,
}

impl Pattern {
    fn accepts(&self, text: &str) -> bool {
        self.shape.is_match(text)
    }
}

static DATE_PATTERNS: Lazy<Vec<Pattern>> = Lazy::new(|| compile(DATE_FORMATS));
static TIME_PATTERNS: Lazy<Vec<Pattern>> = Lazy::new(|| compile(TIME_FORMATS));
static DATETIME_PATTERNS: Lazy<Vec<Pattern>> = Lazy::new(|| compile(DATETIME_FORMATS));

fn compile(formats: &[&'static str]) -> Vec<Pattern> {
    formats
        .iter()
        .filter_map(|&format| shape_of(format).map(|shape| Pattern { format, shape }))
        .collect()
}

/// Anchored, case-insensitive regex for the text a strftime pattern may match.
/// `%Y` takes exactly four digits; other numeric fields take one or two.
fn shape_of(format: &str) -> Option<Regex> {
    let mut pattern = String::from("(?i)^");
    let mut chars = format.chars();
    while let Some(c) = chars.next() {
        match c {
            '%' => pattern.push_str(match chars.next()? {
                'Y' => r"\d{4}",
                'm' | 'd' | 'H' | 'M' | 'S' | 'I' => r"\d{1,2}",
                'B' | 'b' => "[a-z]+",
                'p' => "[ap]m",
                '%' => "%",
                _ => return None,
            }),
            c if c.is_whitespace() => pattern.push_str(r"\s+"),
            c => pattern.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
        }
    }
    pattern.push('$');
    Regex::new(&pattern).ok()
}

fn first_date(text: &str) -> Option<NaiveDate> {
    DATE_PATTERNS
        .iter()
        .filter(|p| p.accepts(text))
        .find_map(|p| NaiveDate::parse_from_str(text, p.format).ok())
}

fn first_time(text: &str) -> Option<NaiveTime> {
    TIME_PATTERNS
        .iter()
        .filter(|p| p.accepts(text))
        .find_map(|p| NaiveTime::parse_from_str(text, p.format).ok())
}

fn first_datetime(text: &str) -> Option<NaiveDateTime> {
    DATETIME_PATTERNS
        .iter()
        .filter(|p| p.accepts(text))
        .find_map(|p| NaiveDateTime::parse_from_str(text, p.format).ok())
}

/// Parse a date using the date cascade.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    first_date(text.trim())
}

/// Parse a time of day using the time cascade.
pub fn parse_time(text: &str) -> Option<NaiveTime> {
    first_time(text.trim())
}

/// Parse a datetime: combined patterns first, then date-only patterns at
/// midnight.
pub fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    first_datetime(text).or_else(|| first_date(text).map(|d| d.and_time(NaiveTime::MIN)))
}

/// True if any date, datetime or time pattern parses the trimmed text.
pub fn looks_like_temporal(text: &str) -> bool {
    let text = text.trim();
    if text.is_empty() {
        return false;
    }
    first_date(text).is_some() || first_datetime(text).is_some() || first_time(text).is_some()
}

/// Parse with a caller-supplied pattern, accepting date-only patterns at
/// midnight.
pub fn parse_with_format(text: &str, format: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    NaiveDateTime::parse_from_str(text, format)
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(text, format)
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

/// Parse a time of day with a caller-supplied pattern.
pub fn parse_time_with_format(text: &str, format: &str) -> Option<NaiveTime> {
    let text = text.trim();
    NaiveTime::parse_from_str(text, format)
        .ok()
        .or_else(|| parse_with_format(text, format).map(|dt| dt.time()))
}

/// Interpret a cell as a full datetime. Dates land at midnight; text goes
/// through the cascade; everything else is `None`.
pub fn cell_to_datetime(cell: &Cell) -> Option<NaiveDateTime> {
    match cell {
        Cell::DateTime(dt) => Some(*dt),
        Cell::Date(d) => Some(d.and_time(NaiveTime::MIN)),
        Cell::Text(s) => parse_datetime(s),
        _ => None,
    }
}

/// Reject strftime strings that chrono cannot render.
pub fn validate_format(format: &str) -> Result<()> {
    if format.is_empty() {
        return Err(ColwrightError::Validation("Datetime format is empty".to_string()));
    }
    let invalid = || ColwrightError::Validation(format!("Invalid datetime format '{}'", format));
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(invalid());
    }
    // Offset specifiers parse fine but cannot render a naive value.
    let mut rendered = String::new();
    write!(rendered, "{}", NaiveDateTime::default().format(format)).map_err(|_| invalid())?;
    Ok(())
}

/// Render a datetime with a format already checked by [`validate_format`].
pub fn format_datetime(value: &NaiveDateTime, format: &str) -> String {
    value.format(format).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_date_iso() {
        assert_eq!(parse_date("2024-03-15"), Some(ymd(2024, 3, 15)));
        assert_eq!(parse_date("  2024/03/15 "), Some(ymd(2024, 3, 15)));
    }

    #[test]
    fn test_day_first_wins_when_ambiguous() {
        assert_eq!(parse_date("03-04-2024"), Some(ymd(2024, 4, 3)));
        assert_eq!(parse_date("03/04/2024"), Some(ymd(2024, 4, 3)));
        // Month-first only applies when day-first is impossible.
        assert_eq!(parse_date("12-25-2024"), Some(ymd(2024, 12, 25)));
    }

    #[test]
    fn test_parse_month_names() {
        assert_eq!(parse_date("March 15, 2024"), Some(ymd(2024, 3, 15)));
        assert_eq!(parse_date("15 Mar 2024"), Some(ymd(2024, 3, 15)));
    }

    #[test]
    fn test_parse_compact_date() {
        assert_eq!(parse_date("20240315"), Some(ymd(2024, 3, 15)));
    }

    #[test]
    fn test_parse_time() {
        assert_eq!(parse_time("09:30"), NaiveTime::from_hms_opt(9, 30, 0));
        assert_eq!(parse_time("9:30 PM"), NaiveTime::from_hms_opt(21, 30, 0));
        assert_eq!(parse_time("093015"), NaiveTime::from_hms_opt(9, 30, 15));
        assert_eq!(parse_time("noon"), None);
    }

    #[test]
    fn test_parse_datetime_falls_back_to_date() {
        assert_eq!(
            parse_datetime("2024-03-15T10:20:30"),
            Some(ymd(2024, 3, 15).and_hms_opt(10, 20, 30).unwrap())
        );
        assert_eq!(
            parse_datetime("2024-03-15"),
            Some(ymd(2024, 3, 15).and_hms_opt(0, 0, 0).unwrap())
        );
        assert_eq!(parse_datetime("hello"), None);
    }

    #[test]
    fn test_looks_like_temporal() {
        assert!(looks_like_temporal("2024-03-15"));
        assert!(looks_like_temporal("10:45"));
        assert!(looks_like_temporal("2024-03-15 10:45:00"));
        assert!(!looks_like_temporal("apple"));
        assert!(!looks_like_temporal(""));
    }

    #[test]
    fn test_year_needs_four_digits() {
        assert_eq!(parse_date("15-03-24"), None);
        assert_eq!(parse_datetime("1-2-3"), None);
        assert_eq!(parse_datetime("15-03-24 10:00:00"), None);
        assert!(!looks_like_temporal("1-2-3"));
        assert!(!looks_like_temporal("7-8-9"));
        assert_eq!(parse_date("0015-03-24"), Some(ymd(15, 3, 24)));
        assert_eq!(parse_date("3/4/2024"), Some(ymd(2024, 4, 3)));
    }

    #[test]
    fn test_every_cascade_pattern_compiles() {
        assert_eq!(DATE_PATTERNS.len(), DATE_FORMATS.len());
        assert_eq!(TIME_PATTERNS.len(), TIME_FORMATS.len());
        assert_eq!(DATETIME_PATTERNS.len(), DATETIME_FORMATS.len());
    }

    #[test]
    fn test_parse_with_explicit_format() {
        assert_eq!(
            parse_with_format("15.03.2024", "%d.%m.%Y"),
            Some(ymd(2024, 3, 15).and_hms_opt(0, 0, 0).unwrap())
        );
        assert_eq!(parse_with_format("2024-03-15", "%d.%m.%Y"), None);
        assert_eq!(
            parse_time_with_format("7h05", "%Hh%M"),
            NaiveTime::from_hms_opt(7, 5, 0)
        );
    }

    #[test]
    fn test_validate_format() {
        assert!(validate_format("%Y-%m-%d %H:%M:%S").is_ok());
        assert!(validate_format("%Q").is_err());
        assert!(validate_format("").is_err());
        assert!(validate_format("%Y %z").is_err());
    }

    #[test]
    fn test_cell_to_datetime() {
        let midnight = ymd(2024, 1, 2).and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(cell_to_datetime(&Cell::Date(ymd(2024, 1, 2))), Some(midnight));
        assert_eq!(cell_to_datetime(&Cell::text("2024-01-02")), Some(midnight));
        assert_eq!(cell_to_datetime(&Cell::Integer(20240102)), None);
    }
}
