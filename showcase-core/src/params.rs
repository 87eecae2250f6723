//! Caller-facing parameter conventions shared by every tool.

use crate::error::{ShowcaseError, ShowcaseResult};

/// Result count used when the caller gives none (or garbage).
pub const DEFAULT_COUNT: usize = 10;

/// Upper bound for any result list.
pub const MAX_RESULTS: usize = 50;

/// Clamp a requested result count to `1..=MAX_RESULTS`.
pub fn clamp_count(n: usize) -> usize {
    n.clamp(1, MAX_RESULTS)
}

/// Lenient count parsing: missing, blank or non-numeric input falls back to
/// [`DEFAULT_COUNT`]; numbers are clamped to `1..=MAX_RESULTS`.
pub fn parse_count(raw: Option<&str>) -> usize {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return DEFAULT_COUNT;
    };

    match raw.parse::<i64>() {
        Ok(n) if n < 1 => 1,
        Ok(n) => usize::try_from(n).map(clamp_count).unwrap_or(MAX_RESULTS),
        Err(_) => DEFAULT_COUNT,
    }
}

/// A required text parameter. Missing or blank is a validation error naming
/// the parameter.
pub fn require_text<'a>(name: &str, raw: Option<&'a str>) -> ShowcaseResult<&'a str> {
    match raw.map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ShowcaseError::validation(format!(
            "The '{}' parameter is required and must not be blank",
            name
        ))),
    }
}
