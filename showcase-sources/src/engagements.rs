//! Speaking engagements from a JSON listing endpoint.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use showcase_core::speaking::Engagement;
use showcase_core::{ShowcaseError, ShowcaseResult, Source};
use tracing::{info, warn};
use url::Url;

use crate::http;

/// Date-time layouts accepted after RFC 3339, tried in order.
const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Date-only layouts, read as midnight. Month-first wins when ambiguous.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d/%m/%Y"];

/// Title given to rows that carry none.
pub const UNTITLED: &str = "Untitled";

/// One row of the listing as published by the endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEngagement {
    title: Option<String>,
    url: Option<String>,
    name: Option<String>,
    location: Option<String>,
    description: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
}

pub struct EngagementSource {
    client: reqwest::Client,
    url: Url,
}

impl EngagementSource {
    pub fn new(client: reqwest::Client, url: Url) -> Self {
        EngagementSource { client, url }
    }
}

#[async_trait]
impl Source for EngagementSource {
    type Item = Engagement;

    fn name(&self) -> &str {
        "speaking engagements"
    }

    async fn fetch(&self) -> ShowcaseResult<Vec<Engagement>> {
        info!("Fetching speaking data from {}", self.url);
        let rows: Value = http::get_json(&self.client, &self.url).await?;
        let engagements = parse_engagements(rows)?;
        info!("Parsed {} speaking engagements", engagements.len());
        Ok(engagements)
    }
}

/// Convert the endpoint's JSON array. Rows that are not objects or have
/// mistyped fields are skipped; rows without a title are kept as [`UNTITLED`].
pub fn parse_engagements(rows: Value) -> ShowcaseResult<Vec<Engagement>> {
    let Value::Array(rows) = rows else {
        return Err(ShowcaseError::Parse(
            "Expected a JSON array of engagements".to_string(),
        ));
    };

    let engagements = rows
        .into_iter()
        .enumerate()
        .filter_map(|(idx, row)| match serde_json::from_value::<RawEngagement>(row) {
            Ok(raw) => Some(to_engagement(idx, raw)),
            Err(e) => {
                warn!("Skipping malformed engagement #{}: {}", idx, e);
                None
            }
        })
        .collect();

    Ok(engagements)
}

fn to_engagement(idx: usize, raw: RawEngagement) -> Engagement {
    let title = non_blank(raw.title).unwrap_or_else(|| {
        warn!("Engagement #{} has no title", idx);
        UNTITLED.to_string()
    });

    Engagement {
        title,
        url: non_blank(raw.url),
        event_name: non_blank(raw.name),
        start: raw.start_date.as_deref().and_then(parse_date_time),
        end: raw.end_date.as_deref().and_then(parse_date_time),
        location: non_blank(raw.location),
        description: non_blank(raw.description),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse a listing date. Values without an offset are taken as UTC.
pub fn parse_date_time(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    let naive = DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        });

    if naive.is_none() {
        warn!("Could not parse date: {}", raw);
    }
    naive.map(|n| n.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_parse_date_time_formats() {
        let cases = [
            ("2024-05-01T10:00:00Z", "2024-05-01T10:00:00Z"),
            ("2024-05-01T10:00:00+02:00", "2024-05-01T08:00:00Z"),
            ("2024-05-01T10:00:00.250", "2024-05-01T10:00:00.250Z"),
            ("2024-05-01T10:00:00", "2024-05-01T10:00:00Z"),
            ("2024-05-01 10:00:00", "2024-05-01T10:00:00Z"),
            ("2024-10-07T09:00", "2024-10-07T09:00:00Z"),
            ("2024-05-01", "2024-05-01T00:00:00Z"),
            ("05/01/2024", "2024-05-01T00:00:00Z"),
            ("25/12/2024", "2024-12-25T00:00:00Z"),
        ];

        for (raw, expected) in cases {
            assert_eq!(parse_date_time(raw), Some(utc(expected)), "{}", raw);
        }
    }

    #[test]
    fn test_parse_date_time_rejects_garbage() {
        assert_eq!(parse_date_time(""), None);
        assert_eq!(parse_date_time("   "), None);
        assert_eq!(parse_date_time("next Tuesday"), None);
        assert_eq!(parse_date_time("2024-13-45"), None);
    }

    #[test]
    fn test_parse_engagements() {
        let rows = json!([
            {
                "title": "Spring AI in Practice",
                "url": "https://example.com/talks/spring-ai",
                "name": "Devoxx Conference",
                "location": " Antwerp, Belgium ",
                "description": "Building AI apps",
                "startDate": "2024-10-07T09:00:00",
                "endDate": "2024-10-07T10:00:00"
            },
            {
                "title": "Meetup talk",
                "startDate": "sometime"
            },
            { "url": "https://example.com/no-title" },
            { "title": 42 },
            "not an object"
        ]);

        let engagements = parse_engagements(rows).unwrap();
        assert_eq!(engagements.len(), 3);

        let first = &engagements[0];
        assert_eq!(first.event_name.as_deref(), Some("Devoxx Conference"));
        assert_eq!(first.location.as_deref(), Some("Antwerp, Belgium"));
        assert_eq!(first.start, Some(utc("2024-10-07T09:00:00Z")));
        assert_eq!(first.end, Some(utc("2024-10-07T10:00:00Z")));

        let second = &engagements[1];
        assert_eq!(second.start, None);
        assert_eq!(second.url, None);

        let untitled = &engagements[2];
        assert_eq!(untitled.title, UNTITLED);
        assert_eq!(untitled.url.as_deref(), Some("https://example.com/no-title"));
    }

    #[test]
    fn test_parse_engagements_requires_array() {
        let err = parse_engagements(json!({ "items": [] })).unwrap_err();
        assert!(matches!(err, ShowcaseError::Parse(_)));
    }
}
