//! Blog posts as read from a content feed.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::item::Item;
use crate::text;

/// Terms recognized as tags when a feed entry carries no categories.
pub const TECH_TERMS: &[&str] = &[
    "spring", "java", "boot", "ai", "graphql", "react", "vue", "docker", "kubernetes",
    "microservices", "rest", "api", "jwt", "security", "testing", "junit", "maven", "gradle",
    "git", "devops", "cloud", "aws", "azure", "gcp", "database", "sql", "nosql", "mongodb",
    "redis", "elasticsearch", "kafka", "rabbitmq", "jpa", "hibernate",
];

const SHORT_DESCRIPTION_LEN: usize = 200;

static YOUTUBE_URL_RES: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r"https://www\.youtube\.com/watch\?v=[a-zA-Z0-9_-]+").expect("valid watch regex"),
        Regex::new(r"https://youtu\.be/[a-zA-Z0-9_-]+").expect("valid short link regex"),
        Regex::new(r"youtube\.com/embed/[a-zA-Z0-9_-]+").expect("valid embed regex"),
    ]
});

/// A single feed entry (provider-neutral).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogPost {
    pub id: String,
    pub title: String,
    /// Absolute URL of the post.
    pub link: String,
    pub description: String,
    pub published_at: Option<DateTime<Utc>>,
    pub author: Option<String>,
    pub tags: Vec<String>,
    /// First YouTube link found in the description.
    pub youtube_url: Option<String>,
}

impl BlogPost {
    pub fn has_video(&self) -> bool {
        self.youtube_url.is_some()
    }

    /// The description cut to 200 characters, with "..." when shortened.
    pub fn short_description(&self) -> String {
        text::shorten(&self.description, SHORT_DESCRIPTION_LEN)
    }
}

impl Item for BlogPost {
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
        vec![self.title.as_str(), self.description.as_str()]
    }
}

/// Terms from [`TECH_TERMS`] appearing as whole words in the title or
/// description, in vocabulary order.
pub fn extract_tags(title: &str, description: &str) -> Vec<String> {
    text::terms_in(&format!("{title} {description}"), TECH_TERMS)
}

/// The first YouTube link in `content`. Full watch URLs are preferred over
/// short links, which are preferred over embeds.
pub fn find_youtube_url(content: &str) -> Option<String> {
    YOUTUBE_URL_RES
        .iter()
        .find_map(|re| re.find(content))
        .map(|m| m.as_str().to_string())
}
