//! Speaking engagements (talks, workshops, podcasts, ...).

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::item::Item;
use crate::query::{self, Phase};
use crate::text;

/// Events without an end time are assumed to last this long.
pub const DEFAULT_EVENT_DURATION: Duration = Duration::hours(2);

/// Topics recognized in talk titles and descriptions.
pub const TOPIC_TERMS: &[&str] = &[
    "spring", "java", "ai", "boot", "microservices", "cloud", "kubernetes", "docker", "rest",
    "api", "testing", "devops", "aws", "azure", "graphql",
];

const SHORT_DESCRIPTION_LEN: usize = 300;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Engagement {
    pub title: String,
    pub url: Option<String>,
    /// Name of the event the talk is part of, e.g. "Spring I/O 2024".
    pub event_name: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub description: Option<String>,
}

/// Classification derived from the event name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Conference,
    Meetup,
    Workshop,
    Webinar,
    Podcast,
    SpeakingEvent,
}

impl EventType {
    /// First matching rule wins; no name means a generic speaking event.
    pub fn classify(event_name: Option<&str>) -> Self {
        let Some(name) = event_name else {
            return EventType::SpeakingEvent;
        };
        let name = name.to_lowercase();

        if name.contains("conference") {
            EventType::Conference
        } else if name.contains("meetup") || name.contains("user group") {
            EventType::Meetup
        } else if name.contains("workshop") {
            EventType::Workshop
        } else if name.contains("webinar") || name.contains("virtual") {
            EventType::Webinar
        } else if name.contains("podcast") {
            EventType::Podcast
        } else {
            EventType::SpeakingEvent
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EventType::Conference => "Conference",
            EventType::Meetup => "Meetup",
            EventType::Workshop => "Workshop",
            EventType::Webinar => "Webinar",
            EventType::Podcast => "Podcast",
            EventType::SpeakingEvent => "Speaking Event",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl Engagement {
    pub fn event_type(&self) -> EventType {
        EventType::classify(self.event_name.as_deref())
    }

    /// `None` while the date is unknown.
    pub fn status(&self, now: DateTime<Utc>) -> Option<Phase> {
        query::phase(self, now, DEFAULT_EVENT_DURATION)
    }

    /// Location with surrounding whitespace removed, `None` when blank.
    pub fn trimmed_location(&self) -> Option<&str> {
        self.location
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
    }

    pub fn topics(&self) -> Vec<String> {
        let content = format!("{} {}", self.title, self.description.as_deref().unwrap_or(""));
        text::terms_in(&content, TOPIC_TERMS)
    }

    pub fn short_description(&self) -> String {
        text::shorten(self.description.as_deref().unwrap_or(""), SHORT_DESCRIPTION_LEN)
    }

    /// e.g. "May 02, 2024 from 9:00 AM to 10:30 AM" or "Date TBD".
    pub fn date_summary(&self) -> String {
        const DAY: &str = "%b %d, %Y";
        const TIME: &str = "%-I:%M %p";

        let Some(start) = self.start else {
            return "Date TBD".to_string();
        };

        match self.end {
            None => format!("{} at {}", start.format(DAY), start.format(TIME)),
            Some(end) if end.date_naive() == start.date_naive() => format!(
                "{} from {} to {}",
                start.format(DAY),
                start.format(TIME),
                end.format(TIME)
            ),
            Some(end) => format!("{} - {}", start.format(DAY), end.format(DAY)),
        }
    }
}

impl Item for Engagement {
    fn id(&self) -> &str {
        self.url.as_deref().unwrap_or(&self.title)
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.start
    }

    fn end_timestamp(&self) -> Option<DateTime<Utc>> {
        self.end
    }

    fn search_fields(&self) -> Vec<&str> {
        [
            Some(self.title.as_str()),
            self.description.as_deref(),
            self.event_name.as_deref(),
            self.location.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}
