//! Date ranges for filtering items.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;

use crate::error::{ShowcaseError, ShowcaseResult};

const FORMAT_HINT: &str = "Use '2024' for a year, 'YYYY-MM-DD' for a single day, \
                           or 'YYYY-MM-DD to YYYY-MM-DD' for a custom range";

/// An inclusive time span plus the text shown to callers describing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub description: String,
}

impl DateRange {
    /// Build a range from explicit bounds. The description lists both dates.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> ShowcaseResult<Self> {
        if start > end {
            return Err(ShowcaseError::validation(format!(
                "Start date {} is after end date {}",
                start.date_naive(),
                end.date_naive()
            )));
        }

        Ok(DateRange {
            start,
            end,
            description: format!("{} to {}", start.date_naive(), end.date_naive()),
        })
    }

    /// Jan 1 00:00:00 through Dec 31 23:59:00 of `year`.
    pub fn year(year: i32) -> ShowcaseResult<Self> {
        let first = NaiveDate::from_ymd_opt(year, 1, 1)
            .ok_or_else(|| ShowcaseError::validation(format!("Invalid year '{}'", year)))?;
        let last = NaiveDate::from_ymd_opt(year, 12, 31)
            .ok_or_else(|| ShowcaseError::validation(format!("Invalid year '{}'", year)))?;

        Ok(DateRange {
            start: start_of_day(first),
            end: last.and_time(NaiveTime::from_hms_opt(23, 59, 0).unwrap_or(NaiveTime::MIN)).and_utc(),
            description: year.to_string(),
        })
    }

    /// Whole days from the start of `from` to the last second of `to`.
    pub fn days(from: NaiveDate, to: NaiveDate) -> ShowcaseResult<Self> {
        Self::new(start_of_day(from), end_of_day(to))
    }

    /// Parse the textual forms callers may send:
    /// - `2024`: the whole year
    /// - `2023-01-01 to 2023-12-31`: inclusive, end expanded to end of day
    /// - `2023-12-25`: that single day
    ///
    /// Anything else is a validation error.
    pub fn parse(input: &str) -> ShowcaseResult<Self> {
        let input = input.trim();

        if input.is_empty() {
            return Err(ShowcaseError::validation(format!(
                "Date range is required. {}",
                FORMAT_HINT
            )));
        }

        if input.len() == 4 && input.chars().all(|c| c.is_ascii_digit()) {
            let year: i32 = input
                .parse()
                .map_err(|_| ShowcaseError::validation(format!("Invalid year '{}'", input)))?;
            return Self::year(year);
        }

        if let Some((from, to)) = input.split_once(" to ") {
            let range = Self::days(parse_iso_date(from.trim())?, parse_iso_date(to.trim())?)?;
            return Ok(range);
        }

        if looks_like_iso_date(input) {
            let day = parse_iso_date(input)?;
            return Self::days(day, day);
        }

        Err(ShowcaseError::validation(format!(
            "Invalid date range '{}'. {}",
            input, FORMAT_HINT
        )))
    }

    /// Inclusive on both ends.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at <= self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.description)
    }
}

fn looks_like_iso_date(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit())
}

/// Parse YYYY-MM-DD, zero-padded.
fn parse_iso_date(s: &str) -> ShowcaseResult<NaiveDate> {
    let invalid = || ShowcaseError::validation(format!("Invalid date '{}'. Expected YYYY-MM-DD", s));
    if !looks_like_iso_date(s) {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| invalid())
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN))
        .and_utc()
}
