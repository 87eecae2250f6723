//! Validated per-integration settings.

use std::fmt;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use url::Url;

use crate::cache::{DEFAULT_TTL, MIN_TTL};
use crate::error::{ShowcaseError, ShowcaseResult};

use super::showcase_config::{BlogSection, SpeakingSection, YoutubeSection};

const DEFAULT_APPLICATION_NAME: &str = "showcase";
const API_KEY_MIN_LEN: usize = 10;
const API_KEY_MAX_LEN: usize = 100;

static CHANNEL_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(UC|UU|HC)[A-Za-z0-9_-]{22}$").expect("valid channel id regex"));

#[derive(Debug, Clone)]
pub struct BlogSettings {
    pub rss_url: Url,
    pub cache_duration: Duration,
}

impl BlogSettings {
    pub fn from_section(section: &BlogSection) -> ShowcaseResult<Self> {
        Ok(BlogSettings {
            rss_url: http_url("blog.rss_url", section.rss_url.as_deref())?,
            cache_duration: cache_duration("blog", section.cache_duration.as_deref())?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct SpeakingSettings {
    pub api_url: Url,
    pub cache_duration: Duration,
}

impl SpeakingSettings {
    pub fn from_section(section: &SpeakingSection) -> ShowcaseResult<Self> {
        Ok(SpeakingSettings {
            api_url: http_url("speaking.api_url", section.api_url.as_deref())?,
            cache_duration: cache_duration("speaking", section.cache_duration.as_deref())?,
        })
    }
}

#[derive(Clone)]
pub struct YoutubeSettings {
    pub api_key: String,
    pub channel_id: String,
    pub application_name: String,
    pub cache_duration: Duration,
}

impl YoutubeSettings {
    pub fn from_section(section: &YoutubeSection) -> ShowcaseResult<Self> {
        let api_key = required("youtube.api_key", section.api_key.as_deref())?;
        let key_len = api_key.chars().count();
        if !(API_KEY_MIN_LEN..=API_KEY_MAX_LEN).contains(&key_len) {
            return Err(ShowcaseError::Config(format!(
                "youtube.api_key must be between {} and {} characters",
                API_KEY_MIN_LEN, API_KEY_MAX_LEN
            )));
        }

        let channel_id = required("youtube.channel_id", section.channel_id.as_deref())?;
        if !CHANNEL_ID_RE.is_match(channel_id) {
            return Err(ShowcaseError::Config(format!(
                "youtube.channel_id '{}' is not a valid channel ID \
                 (expected UC, UU or HC followed by 22 characters)",
                channel_id
            )));
        }

        let application_name = section
            .application_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_APPLICATION_NAME)
            .to_string();

        Ok(YoutubeSettings {
            api_key: api_key.to_string(),
            channel_id: channel_id.to_string(),
            application_name,
            cache_duration: cache_duration("youtube", section.cache_duration.as_deref())?,
        })
    }
}

impl fmt::Debug for YoutubeSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("YoutubeSettings")
            .field("api_key", &"<redacted>")
            .field("channel_id", &self.channel_id)
            .field("application_name", &self.application_name)
            .field("cache_duration", &self.cache_duration)
            .finish()
    }
}

fn required<'a>(key: &str, value: Option<&'a str>) -> ShowcaseResult<&'a str> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ShowcaseError::Config(format!("{key} is required")))
}

fn http_url(key: &str, value: Option<&str>) -> ShowcaseResult<Url> {
    let raw = required(key, value)?;
    let url = Url::parse(raw)
        .map_err(|e| ShowcaseError::Config(format!("{key} '{raw}' is not a valid URL: {e}")))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ShowcaseError::Config(format!(
            "{key} must use http or https, not '{other}'"
        ))),
    }
}

/// Humantime string such as "30m" or "1h". Missing means [`DEFAULT_TTL`].
fn cache_duration(section: &str, value: Option<&str>) -> ShowcaseResult<Duration> {
    let Some(raw) = value.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(DEFAULT_TTL);
    };

    let duration = humantime::parse_duration(raw).map_err(|e| {
        ShowcaseError::Config(format!("{section}.cache_duration '{raw}' is invalid: {e}"))
    })?;

    if duration < MIN_TTL {
        return Err(ShowcaseError::Config(format!(
            "{section}.cache_duration must be at least 1 minute, got {raw}"
        )));
    }

    Ok(duration)
}
