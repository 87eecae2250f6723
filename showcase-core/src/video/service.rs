use std::cmp::Reverse;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cache::{Freshness, RefreshableCache};
use crate::error::ShowcaseResult;
use crate::params::clamp_count;
use crate::query::{self, SearchKind, SearchResult};
use crate::source::Source;
use crate::stats::Timeline;
use crate::text;
use crate::video::model::{ChannelInfo, TopRange, Video, compact_count};

const CHANNEL_DESCRIPTION_LEN: usize = 200;

/// The most viewed videos published within `range`, ties in snapshot order.
pub fn top_viewed(videos: &[Video], range: TopRange, now: DateTime<Utc>, n: usize) -> SearchResult<Video> {
    let cutoff = range.cutoff(now);
    let mut matches: Vec<Video> = videos
        .iter()
        .filter(|v| match cutoff {
            Some(cutoff) => v.published_at.is_some_and(|at| at >= cutoff),
            None => true,
        })
        .cloned()
        .collect();

    let total = matches.len();
    matches.sort_by_key(|v| Reverse(v.view_count));
    matches.truncate(clamp_count(n));

    SearchResult::new(
        SearchKind::TopViewed {
            range: range.to_string(),
        },
        total,
        matches,
    )
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoStats {
    #[serde(flatten)]
    pub timeline: Timeline,
    pub total_views: u64,
    pub total_likes: u64,
    pub total_comments: u64,
    pub average_views: u64,
    pub most_viewed: Option<Video>,
}

impl VideoStats {
    pub fn compute(videos: &[Video], now: DateTime<Utc>) -> Self {
        let total_views: u64 = videos.iter().map(|v| v.view_count).sum();
        let average_views = match videos.len() as u64 {
            0 => 0,
            n => total_views / n,
        };

        // max_by_key returns the last maximum; reverse so ties keep the first.
        let most_viewed = videos.iter().rev().max_by_key(|v| v.view_count).cloned();

        VideoStats {
            timeline: Timeline::of(videos, now),
            total_views,
            total_likes: videos.iter().map(|v| v.like_count).sum(),
            total_comments: videos.iter().map(|v| v.comment_count).sum(),
            average_views,
            most_viewed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelStats {
    pub channel_id: String,
    pub title: String,
    pub description: String,
    pub subscriber_count: Option<u64>,
    /// "1.2K", or "Hidden" when the channel hides it.
    pub subscribers: String,
    pub total_views: u64,
    pub total_views_display: String,
    pub video_count: u64,
    pub average_views_per_video: u64,
    pub created_at: Option<DateTime<Utc>>,
}

impl ChannelStats {
    pub fn from_channel(channel: &ChannelInfo) -> Self {
        ChannelStats {
            channel_id: channel.id.clone(),
            title: channel.title.clone(),
            description: text::shorten(&channel.description, CHANNEL_DESCRIPTION_LEN),
            subscriber_count: channel.subscriber_count,
            subscribers: channel
                .subscriber_count
                .map(compact_count)
                .unwrap_or_else(|| "Hidden".to_string()),
            total_views: channel.view_count,
            total_views_display: compact_count(channel.view_count),
            video_count: channel.video_count,
            average_views_per_video: channel.view_count.checked_div(channel.video_count).unwrap_or(0),
            created_at: channel.created_at,
        }
    }
}

/// Cached access to one channel: its uploads and its metadata, each behind
/// its own cache.
pub struct VideoService<V, C>
where
    V: Source<Item = Video>,
    C: Source<Item = ChannelInfo>,
{
    videos: RefreshableCache<V>,
    channel: RefreshableCache<C>,
}

impl<V, C> VideoService<V, C>
where
    V: Source<Item = Video>,
    C: Source<Item = ChannelInfo>,
{
    pub fn new(videos: V, channel: C, cache_duration: Duration) -> Self {
        VideoService {
            videos: RefreshableCache::new(videos, cache_duration),
            channel: RefreshableCache::new(channel, cache_duration),
        }
    }

    pub async fn latest_videos(&self, count: usize) -> Vec<Video> {
        query::latest(&self.videos.get().await, count)
    }

    pub async fn top_videos(&self, count: usize, range: TopRange) -> SearchResult<Video> {
        top_viewed(&self.videos.get().await, range, Utc::now(), count)
    }

    /// Keyword search over titles and descriptions of the cached uploads.
    pub async fn search_by_topic(&self, topic: &str, count: usize) -> SearchResult<Video> {
        query::search(&self.videos.get().await, topic, count)
    }

    pub async fn videos_by_date_range(
        &self,
        range: &str,
        count: usize,
    ) -> ShowcaseResult<SearchResult<Video>> {
        query::in_range_text(&self.videos.get().await, range, count)
    }

    pub async fn videos_by_year(&self, year: i32, count: usize) -> ShowcaseResult<SearchResult<Video>> {
        query::in_year(&self.videos.get().await, year, count)
    }

    pub async fn video_stats(&self) -> VideoStats {
        VideoStats::compute(&self.videos.get().await, Utc::now())
    }

    /// `None` until the channel has been fetched successfully once.
    pub async fn channel_stats(&self) -> Option<ChannelStats> {
        self.channel.get().await.first().map(ChannelStats::from_channel)
    }

    pub fn video_cache(&self) -> &RefreshableCache<V> {
        &self.videos
    }

    pub fn channel_cache(&self) -> &RefreshableCache<C> {
        &self.channel
    }

    pub fn video_freshness(&self) -> Freshness {
        self.videos.status()
    }

    pub fn channel_freshness(&self) -> Freshness {
        self.channel.status()
    }
}
