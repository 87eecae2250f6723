use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::blog::post::BlogPost;
use crate::cache::{Freshness, RefreshableCache};
use crate::error::ShowcaseResult;
use crate::query::{self, SearchResult};
use crate::source::Source;
use crate::stats::{self, PostingFrequency, Timeline};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlogStats {
    #[serde(flatten)]
    pub timeline: Timeline,
    pub posts_with_videos: usize,
    /// Share of posts with an embedded video, e.g. "12.5%".
    pub video_percentage: String,
    pub most_common_tag: Option<String>,
    pub posting_frequency: PostingFrequency,
    pub posting_frequency_label: String,
    pub timespan: String,
}

impl BlogStats {
    pub fn compute(posts: &[BlogPost], now: DateTime<Utc>) -> Self {
        let timeline = Timeline::of(posts, now);
        let posts_with_videos = posts.iter().filter(|p| p.has_video()).count();
        let most_common_tag =
            stats::most_common(posts.iter().flat_map(|p| p.tags.iter().cloned())).map(|(tag, _)| tag);
        let posting_frequency = timeline.frequency();

        BlogStats {
            posts_with_videos,
            video_percentage: stats::percentage(posts_with_videos, posts.len()),
            most_common_tag,
            posting_frequency,
            posting_frequency_label: posting_frequency.label().to_string(),
            timespan: timeline.timespan(),
            timeline,
        }
    }
}

/// Cached access to one blog feed.
pub struct BlogService<S: Source<Item = BlogPost>> {
    cache: RefreshableCache<S>,
}

impl<S: Source<Item = BlogPost>> BlogService<S> {
    pub fn new(source: S, cache_duration: Duration) -> Self {
        BlogService {
            cache: RefreshableCache::new(source, cache_duration),
        }
    }

    pub async fn all_posts(&self) -> Vec<BlogPost> {
        self.cache.get().await.to_vec()
    }

    pub async fn latest_posts(&self, count: usize) -> Vec<BlogPost> {
        query::latest(&self.cache.get().await, count)
    }

    pub async fn search_by_keyword(&self, keyword: &str, count: usize) -> SearchResult<BlogPost> {
        query::search(&self.cache.get().await, keyword, count)
    }

    /// `range` is a year, a single date or "start to end".
    pub async fn posts_by_date_range(
        &self,
        range: &str,
        count: usize,
    ) -> ShowcaseResult<SearchResult<BlogPost>> {
        query::in_range_text(&self.cache.get().await, range, count)
    }

    pub async fn posts_by_year(&self, year: i32, count: usize) -> ShowcaseResult<SearchResult<BlogPost>> {
        query::in_year(&self.cache.get().await, year, count)
    }

    pub async fn stats(&self) -> BlogStats {
        BlogStats::compute(&self.cache.get().await, Utc::now())
    }

    pub fn freshness(&self) -> Freshness {
        self.cache.status()
    }

    pub fn cache(&self) -> &RefreshableCache<S> {
        &self.cache
    }
}
