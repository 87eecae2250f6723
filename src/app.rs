//! Composition root: one service per configured integration.

use serde::Serialize;
use showcase_core::blog::{BlogPost, BlogService};
use showcase_core::config::{BlogSettings, ShowcaseConfig, SpeakingSettings, YoutubeSettings};
use showcase_core::speaking::{Engagement, SpeakingService};
use showcase_core::video::{ChannelInfo, Video, VideoService};
use showcase_core::{BoxedSource, Freshness, ShowcaseError, ShowcaseResult};
use showcase_sources::{ChannelSource, EngagementSource, FeedSource, VideoSource, YoutubeApi, http};
use tracing::{error, info};

const USER_AGENT: &str = concat!("showcase/", env!("CARGO_PKG_VERSION"));

pub type Blog = BlogService<BoxedSource<BlogPost>>;
pub type Speaking = SpeakingService<BoxedSource<Engagement>>;
pub type Youtube = VideoService<BoxedSource<Video>, BoxedSource<ChannelInfo>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Blog,
    Speaking,
    Youtube,
}

impl Feature {
    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::Blog => "blog",
            Feature::Speaking => "speaking",
            Feature::Youtube => "youtube",
        }
    }
}

/// The enabled services. A `None` field is a disabled integration.
#[derive(Default)]
pub struct App {
    pub blog: Option<Blog>,
    pub speaking: Option<Speaking>,
    pub youtube: Option<Youtube>,
}

/// One line of `showcase status`.
#[derive(Debug, Serialize)]
pub struct FeatureStatus {
    pub feature: Feature,
    pub enabled: bool,
    pub items: usize,
    pub freshness: Option<Freshness>,
}

impl App {
    /// Build every integration whose section is present and valid. Invalid
    /// sections are logged and leave only that integration disabled.
    pub fn from_config(config: &ShowcaseConfig) -> Self {
        App {
            blog: enable(Feature::Blog, config.blog_settings(), build_blog),
            speaking: enable(Feature::Speaking, config.speaking_settings(), build_speaking),
            youtube: enable(Feature::Youtube, config.youtube_settings(), build_youtube),
        }
    }

    pub fn blog(&self) -> ShowcaseResult<&Blog> {
        self.blog.as_ref().ok_or_else(|| disabled(Feature::Blog))
    }

    pub fn speaking(&self) -> ShowcaseResult<&Speaking> {
        self.speaking.as_ref().ok_or_else(|| disabled(Feature::Speaking))
    }

    pub fn youtube(&self) -> ShowcaseResult<&Youtube> {
        self.youtube.as_ref().ok_or_else(|| disabled(Feature::Youtube))
    }

    pub fn enabled(&self) -> Vec<Feature> {
        [
            (Feature::Blog, self.blog.is_some()),
            (Feature::Speaking, self.speaking.is_some()),
            (Feature::Youtube, self.youtube.is_some()),
        ]
        .into_iter()
        .filter_map(|(feature, on)| on.then_some(feature))
        .collect()
    }

    /// Read every enabled cache (refreshing it if needed) and report what it
    /// holds. For YouTube the video catalog is reported.
    pub async fn status(&self) -> Vec<FeatureStatus> {
        let mut statuses = Vec::with_capacity(3);

        statuses.push(match &self.blog {
            Some(blog) => {
                let read = blog.cache().read().await;
                FeatureStatus::enabled(Feature::Blog, read.snapshot.len(), read.freshness)
            }
            None => FeatureStatus::disabled(Feature::Blog),
        });

        statuses.push(match &self.speaking {
            Some(speaking) => {
                let read = speaking.cache().read().await;
                FeatureStatus::enabled(Feature::Speaking, read.snapshot.len(), read.freshness)
            }
            None => FeatureStatus::disabled(Feature::Speaking),
        });

        statuses.push(match &self.youtube {
            Some(youtube) => {
                let read = youtube.video_cache().read().await;
                FeatureStatus::enabled(Feature::Youtube, read.snapshot.len(), read.freshness)
            }
            None => FeatureStatus::disabled(Feature::Youtube),
        });

        statuses
    }
}

impl FeatureStatus {
    fn enabled(feature: Feature, items: usize, freshness: Freshness) -> Self {
        FeatureStatus {
            feature,
            enabled: true,
            items,
            freshness: Some(freshness),
        }
    }

    fn disabled(feature: Feature) -> Self {
        FeatureStatus {
            feature,
            enabled: false,
            items: 0,
            freshness: None,
        }
    }
}

fn disabled(feature: Feature) -> ShowcaseError {
    ShowcaseError::FeatureDisabled(feature.as_str().to_string())
}

fn enable<S, T>(
    feature: Feature,
    settings: Option<ShowcaseResult<S>>,
    build: impl FnOnce(S) -> ShowcaseResult<T>,
) -> Option<T> {
    let Some(settings) = settings else {
        info!("No [{}] section configured, integration disabled", feature.as_str());
        return None;
    };

    match settings.and_then(build) {
        Ok(service) => {
            info!("{} integration enabled", feature.as_str());
            Some(service)
        }
        Err(e) => {
            error!("{} integration disabled: {}", feature.as_str(), e);
            None
        }
    }
}

fn build_blog(settings: BlogSettings) -> ShowcaseResult<Blog> {
    let client = http::client(USER_AGENT)?;
    let source: BoxedSource<BlogPost> = Box::new(FeedSource::new(client, settings.rss_url));
    Ok(BlogService::new(source, settings.cache_duration))
}

fn build_speaking(settings: SpeakingSettings) -> ShowcaseResult<Speaking> {
    let client = http::client(USER_AGENT)?;
    let source: BoxedSource<Engagement> = Box::new(EngagementSource::new(client, settings.api_url));
    Ok(SpeakingService::new(source, settings.cache_duration))
}

fn build_youtube(settings: YoutubeSettings) -> ShowcaseResult<Youtube> {
    let client = http::client(&settings.application_name)?;
    let api = YoutubeApi::new(client, settings.api_key, settings.channel_id);
    let videos: BoxedSource<Video> = Box::new(VideoSource::new(api.clone()));
    let channel: BoxedSource<ChannelInfo> = Box::new(ChannelSource::new(api));
    Ok(VideoService::new(videos, channel, settings.cache_duration))
}
