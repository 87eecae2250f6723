//! YouTube Data API v3 adapters: a channel's uploads and its metadata.
//!
//! Uploads take three calls: the channel's `contentDetails` names the
//! uploads playlist, `playlistItems` lists up to 50 of its entries, and one
//! batched `videos` call fills in view/like/comment counts and durations.
//! The API reports counts as decimal strings.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use showcase_core::video::{ChannelInfo, Video};
use showcase_core::{ShowcaseError, ShowcaseResult, Source};
use tracing::{info, warn};
use url::Url;

use crate::http;

const API_BASE: &str = "https://www.googleapis.com/youtube/v3";

/// Upper bound the API accepts for `maxResults` and for batched ids.
const PAGE_SIZE: usize = 50;

/// Authenticated access to the API for one channel.
#[derive(Clone)]
pub struct YoutubeApi {
    client: reqwest::Client,
    api_key: String,
    channel_id: String,
}

impl YoutubeApi {
    pub fn new(client: reqwest::Client, api_key: impl Into<String>, channel_id: impl Into<String>) -> Self {
        YoutubeApi {
            client,
            api_key: api_key.into(),
            channel_id: channel_id.into(),
        }
    }

    pub fn channel_id(&self) -> &str {
        &self.channel_id
    }

    async fn call<T: DeserializeOwned>(&self, resource: &str, params: &[(&str, &str)]) -> ShowcaseResult<T> {
        let mut url = Url::parse(&format!("{API_BASE}/{resource}"))
            .map_err(|e| ShowcaseError::Http(format!("Invalid API URL: {e}")))?;
        url.query_pairs_mut()
            .extend_pairs(params)
            .append_pair("key", &self.api_key);
        http::get_json(&self.client, &url).await
    }
}

/// The channel's most recent uploads with statistics.
pub struct VideoSource {
    api: YoutubeApi,
}

impl VideoSource {
    pub fn new(api: YoutubeApi) -> Self {
        VideoSource { api }
    }
}

#[async_trait]
impl Source for VideoSource {
    type Item = Video;

    fn name(&self) -> &str {
        "youtube videos"
    }

    async fn fetch(&self) -> ShowcaseResult<Vec<Video>> {
        let channels: ListResponse<ChannelResource> = self
            .api
            .call("channels", &[("part", "contentDetails"), ("id", self.api.channel_id())])
            .await?;
        let playlist_id = uploads_playlist(channels, self.api.channel_id())?;

        let max_results = PAGE_SIZE.to_string();
        let items: ListResponse<PlaylistItem> = self
            .api
            .call(
                "playlistItems",
                &[
                    ("part", "snippet,contentDetails"),
                    ("playlistId", playlist_id.as_str()),
                    ("maxResults", max_results.as_str()),
                ],
            )
            .await?;
        let mut videos = playlist_videos(items);

        if !videos.is_empty() {
            let ids = videos.iter().map(|v| v.id.as_str()).collect::<Vec<_>>().join(",");
            let details: ListResponse<VideoResource> = self
                .api
                .call("videos", &[("part", "statistics,contentDetails"), ("id", ids.as_str())])
                .await?;
            merge_details(&mut videos, details);
        }

        info!("Fetched {} videos from uploads playlist {}", videos.len(), playlist_id);
        Ok(videos)
    }
}

/// Snippet and statistics of the configured channel, as a single item.
pub struct ChannelSource {
    api: YoutubeApi,
}

impl ChannelSource {
    pub fn new(api: YoutubeApi) -> Self {
        ChannelSource { api }
    }
}

#[async_trait]
impl Source for ChannelSource {
    type Item = ChannelInfo;

    fn name(&self) -> &str {
        "youtube channel"
    }

    async fn fetch(&self) -> ShowcaseResult<Vec<ChannelInfo>> {
        let response: ListResponse<ChannelResource> = self
            .api
            .call("channels", &[("part", "snippet,statistics"), ("id", self.api.channel_id())])
            .await?;
        let channel = channel_info(response, self.api.channel_id())?;
        info!("Fetched channel '{}'", channel.title);
        Ok(vec![channel])
    }
}

// Wire types. Only the fields read below are declared.

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct ListResponse<T> {
    #[serde(default)]
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelResource {
    id: String,
    snippet: Option<ChannelSnippet>,
    statistics: Option<ChannelStatistics>,
    content_details: Option<ChannelContentDetails>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelSnippet {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    published_at: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelStatistics {
    view_count: Option<String>,
    subscriber_count: Option<String>,
    #[serde(default)]
    hidden_subscriber_count: bool,
    video_count: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelContentDetails {
    related_playlists: RelatedPlaylists,
}

#[derive(Debug, Deserialize)]
struct RelatedPlaylists {
    uploads: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItem {
    snippet: Option<PlaylistSnippet>,
    content_details: Option<PlaylistContentDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistSnippet {
    #[serde(default)]
    title: String,
    description: Option<String>,
    published_at: Option<String>,
    resource_id: Option<ResourceId>,
    #[serde(default)]
    thumbnails: HashMap<String, Thumbnail>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistContentDetails {
    video_id: Option<String>,
    video_published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoResource {
    id: String,
    statistics: Option<VideoStatistics>,
    content_details: Option<VideoContentDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoStatistics {
    view_count: Option<String>,
    like_count: Option<String>,
    comment_count: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideoContentDetails {
    duration: Option<String>,
}

fn not_found(channel_id: &str) -> ShowcaseError {
    ShowcaseError::Remote {
        status: 404,
        message: format!("Channel not found: {channel_id}"),
    }
}

fn uploads_playlist(response: ListResponse<ChannelResource>, channel_id: &str) -> ShowcaseResult<String> {
    let channel = response.items.into_iter().next().ok_or_else(|| not_found(channel_id))?;
    channel
        .content_details
        .and_then(|d| d.related_playlists.uploads)
        .ok_or_else(|| ShowcaseError::Parse(format!("Channel {channel_id} has no uploads playlist")))
}

fn channel_info(response: ListResponse<ChannelResource>, channel_id: &str) -> ShowcaseResult<ChannelInfo> {
    let channel = response.items.into_iter().next().ok_or_else(|| not_found(channel_id))?;
    let snippet = channel.snippet.unwrap_or_default();
    let stats = channel.statistics.unwrap_or_default();

    let subscriber_count = if stats.hidden_subscriber_count {
        None
    } else {
        stats.subscriber_count.as_deref().and_then(parse_count)
    };

    Ok(ChannelInfo {
        id: channel.id,
        title: snippet.title,
        description: snippet.description,
        subscriber_count,
        view_count: count(stats.view_count.as_deref()),
        video_count: count(stats.video_count.as_deref()),
        created_at: snippet.published_at.as_deref().and_then(parse_timestamp),
    })
}

fn playlist_videos(response: ListResponse<PlaylistItem>) -> Vec<Video> {
    response
        .items
        .into_iter()
        .take(PAGE_SIZE)
        .filter_map(|item| {
            let Some(snippet) = item.snippet else {
                warn!("Skipping playlist item without a snippet");
                return None;
            };
            let details = item.content_details;

            let id = details
                .as_ref()
                .and_then(|d| d.video_id.clone())
                .or_else(|| snippet.resource_id.as_ref().and_then(|r| r.video_id.clone()));
            let Some(id) = id else {
                warn!("Skipping playlist item '{}' without a video id", snippet.title);
                return None;
            };

            let published_at = details
                .as_ref()
                .and_then(|d| d.video_published_at.as_deref())
                .or(snippet.published_at.as_deref())
                .and_then(parse_timestamp);

            let thumbnail_url = ["high", "medium", "default"]
                .iter()
                .find_map(|size| snippet.thumbnails.get(*size))
                .map(|t| t.url.clone());

            Some(Video {
                url: Video::watch_url(&id),
                id,
                title: snippet.title,
                description: snippet.description.filter(|d| !d.trim().is_empty()),
                published_at,
                view_count: 0,
                like_count: 0,
                comment_count: 0,
                duration: None,
                thumbnail_url,
            })
        })
        .collect()
}

// Videos missing from the batch keep zero counts.
fn merge_details(videos: &mut [Video], response: ListResponse<VideoResource>) {
    let by_id: HashMap<&str, &VideoResource> = response.items.iter().map(|v| (v.id.as_str(), v)).collect();

    for video in videos.iter_mut() {
        let Some(details) = by_id.get(video.id.as_str()) else {
            warn!("No statistics returned for video {}", video.id);
            continue;
        };
        if let Some(stats) = &details.statistics {
            video.view_count = count(stats.view_count.as_deref());
            video.like_count = count(stats.like_count.as_deref());
            video.comment_count = count(stats.comment_count.as_deref());
        }
        video.duration = details.content_details.as_ref().and_then(|c| c.duration.clone());
    }
}

fn parse_count(raw: &str) -> Option<u64> {
    raw.trim().parse().ok()
}

fn count(raw: Option<&str>) -> u64 {
    raw.and_then(parse_count).unwrap_or(0)
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| warn!("Could not parse timestamp '{}': {}", raw, e))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHANNEL_ID: &str = "UC1234567890abcdefghijAB";

    fn from_json<T: DeserializeOwned>(json: &str) -> T {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_channel_info() {
        let response = from_json(
            r#"{
              "kind": "youtube#channelListResponse",
              "items": [{
                "id": "UC1234567890abcdefghijAB",
                "snippet": {
                  "title": "Dev Channel",
                  "description": "Tutorials",
                  "publishedAt": "2012-03-04T05:06:07Z"
                },
                "statistics": {
                  "viewCount": "2500000",
                  "subscriberCount": "1240",
                  "hiddenSubscriberCount": false,
                  "videoCount": "400"
                }
              }]
            }"#,
        );

        let channel = channel_info(response, CHANNEL_ID).unwrap();
        assert_eq!(channel.title, "Dev Channel");
        assert_eq!(channel.subscriber_count, Some(1240));
        assert_eq!(channel.view_count, 2_500_000);
        assert_eq!(channel.video_count, 400);
        assert_eq!(
            channel.created_at.unwrap().to_rfc3339(),
            "2012-03-04T05:06:07+00:00"
        );
    }

    #[test]
    fn test_hidden_subscribers() {
        let response = from_json(
            r#"{"items": [{
                "id": "UC1234567890abcdefghijAB",
                "snippet": {"title": "Quiet"},
                "statistics": {"viewCount": "10", "hiddenSubscriberCount": true, "videoCount": "1"}
            }]}"#,
        );
        let channel = channel_info(response, CHANNEL_ID).unwrap();
        assert_eq!(channel.subscriber_count, None);
        assert_eq!(channel.created_at, None);
    }

    #[test]
    fn test_missing_channel() {
        let err = channel_info(from_json(r#"{"items": []}"#), CHANNEL_ID).unwrap_err();
        assert!(matches!(err, ShowcaseError::Remote { status: 404, .. }));

        let err = uploads_playlist(from_json("{}"), CHANNEL_ID).unwrap_err();
        assert!(matches!(err, ShowcaseError::Remote { status: 404, .. }));
    }

    #[test]
    fn test_uploads_playlist() {
        let response = from_json(
            r#"{"items": [{
                "id": "UC1234567890abcdefghijAB",
                "contentDetails": {"relatedPlaylists": {"likes": "", "uploads": "UU1234567890abcdefghijAB"}}
            }]}"#,
        );
        assert_eq!(uploads_playlist(response, CHANNEL_ID).unwrap(), "UU1234567890abcdefghijAB");
    }

    #[test]
    fn test_playlist_and_details() {
        let playlist = from_json(
            r#"{"items": [
              {
                "snippet": {
                  "title": "Spring Boot 3.3",
                  "description": "What's new",
                  "publishedAt": "2024-06-21T00:00:00Z",
                  "resourceId": {"kind": "youtube#video", "videoId": "vid1"},
                  "thumbnails": {
                    "default": {"url": "https://i.ytimg.com/vi/vid1/default.jpg"},
                    "high": {"url": "https://i.ytimg.com/vi/vid1/hqdefault.jpg"}
                  }
                },
                "contentDetails": {"videoId": "vid1", "videoPublishedAt": "2024-06-20T15:00:00Z"}
              },
              {
                "snippet": {"title": "Short", "description": "", "resourceId": {"videoId": "vid2"}}
              },
              {
                "snippet": {"title": "Broken", "resourceId": {}}
              }
            ]}"#,
        );

        let mut videos = playlist_videos(playlist);
        assert_eq!(videos.len(), 2);
        assert_eq!(videos[0].url, "https://www.youtube.com/watch?v=vid1");
        assert_eq!(
            videos[0].published_at.unwrap().to_rfc3339(),
            "2024-06-20T15:00:00+00:00"
        );
        assert_eq!(
            videos[0].thumbnail_url.as_deref(),
            Some("https://i.ytimg.com/vi/vid1/hqdefault.jpg")
        );
        assert_eq!(videos[1].description, None);
        assert_eq!(videos[1].published_at, None);

        let details = from_json(
            r#"{"items": [{
                "id": "vid1",
                "statistics": {"viewCount": "1500", "likeCount": "120", "commentCount": "7"},
                "contentDetails": {"duration": "PT12M3S"}
            }]}"#,
        );
        merge_details(&mut videos, details);

        assert_eq!(videos[0].view_count, 1_500);
        assert_eq!(videos[0].like_count, 120);
        assert_eq!(videos[0].comment_count, 7);
        assert_eq!(videos[0].duration.as_deref(), Some("PT12M3S"));
        assert_eq!(videos[1].view_count, 0, "missing from the batch");
    }

    #[test]
    fn test_list_response_without_items() {
        let body = r#"{"kind": "youtube#listResponse", "pageInfo": {"totalResults": 0}}"#;

        let channels: ListResponse<ChannelResource> = from_json(body);
        let playlist: ListResponse<PlaylistItem> = from_json(body);
        let details: ListResponse<VideoResource> = from_json(body);
        assert!(channels.items.is_empty());
        assert!(playlist_videos(playlist).is_empty());
        assert!(details.items.is_empty());
    }

    #[test]
    fn test_count_parsing() {
        assert_eq!(count(Some("42")), 42);
        assert_eq!(count(Some("n/a")), 0);
        assert_eq!(count(None), 0);
    }
}
