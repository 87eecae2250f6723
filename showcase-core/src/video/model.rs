//! Videos and channel metadata from a video catalog.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ShowcaseError;
use crate::item::Item;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub id: String,
    pub title: String,
    pub url: String,
    pub description: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub view_count: u64,
    pub like_count: u64,
    pub comment_count: u64,
    /// ISO 8601 duration as reported by the catalog, e.g. "PT12M3S".
    pub duration: Option<String>,
    pub thumbnail_url: Option<String>,
}

impl Video {
    pub fn watch_url(id: &str) -> String {
        format!("https://www.youtube.com/watch?v={id}")
    }
}

impl Item for Video {
    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.published_at
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.title.as_str()];
        fields.extend(self.description.as_deref());
        fields
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelInfo {
    pub id: String,
    pub title: String,
    pub description: String,
    /// `None` when the channel hides its subscriber count.
    pub subscriber_count: Option<u64>,
    pub view_count: u64,
    pub video_count: u64,
    pub created_at: Option<DateTime<Utc>>,
}

impl Item for ChannelInfo {
    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.description.as_str()]
    }
}

/// Publication window for top-video rankings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopRange {
    /// Everything currently cached (the most recent uploads).
    #[default]
    Recent,
    /// Published in the last 30 days.
    Month,
    /// Published in the last 365 days.
    Year,
    All,
}

impl TopRange {
    /// Earliest publication time admitted, if the range has one.
    pub fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            TopRange::Recent | TopRange::All => None,
            TopRange::Month => Some(now - Duration::days(30)),
            TopRange::Year => Some(now - Duration::days(365)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TopRange::Recent => "recent",
            TopRange::Month => "month",
            TopRange::Year => "year",
            TopRange::All => "all",
        }
    }
}

impl fmt::Display for TopRange {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TopRange {
    type Err = ShowcaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "recent" => Ok(TopRange::Recent),
            "month" => Ok(TopRange::Month),
            "year" => Ok(TopRange::Year),
            "all" => Ok(TopRange::All),
            other => Err(ShowcaseError::validation(format!(
                "Invalid time range '{}'. Use 'recent', 'month', 'year' or 'all'",
                other
            ))),
        }
    }
}

/// Human-friendly count: 950, 1.2K, 3.4M, 1.1B.
pub fn compact_count(n: u64) -> String {
    match n {
        n if n >= 1_000_000_000 => format!("{:.1}B", n as f64 / 1_000_000_000.0),
        n if n >= 1_000_000 => format!("{:.1}M", n as f64 / 1_000_000.0),
        n if n >= 1_000 => format!("{:.1}K", n as f64 / 1_000.0),
        n => n.to_string(),
    }
}
