//! Named tools over the enabled services.
//!
//! Every tool takes string parameters and answers with a JSON value, so the
//! same dispatch backs both the CLI subcommands and the `serve` loop.

use std::collections::HashMap;

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use showcase_core::params::{parse_count, require_text};
use showcase_core::query::Phase;
use showcase_core::speaking::{Engagement, EventType};
use showcase_core::video::{ChannelStats, TopRange};
use showcase_core::{SearchResult, ShowcaseError, ShowcaseResult};

use crate::app::App;

pub struct ParamSpec {
    pub name: &'static str,
    pub required: bool,
    pub description: &'static str,
}

pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub params: &'static [ParamSpec],
}

const COUNT: ParamSpec = ParamSpec {
    name: "count",
    required: false,
    description: "Number of results (default 10, max 50)",
};

const DATE_RANGE: ParamSpec = ParamSpec {
    name: "dateRange",
    required: true,
    description: "'2024', '2023-01-01 to 2023-12-31' or '2024-05-02'",
};

const KEYWORD: ParamSpec = ParamSpec {
    name: "keyword",
    required: true,
    description: "Word or phrase to search for",
};

const TOPIC: ParamSpec = ParamSpec {
    name: "topic",
    required: true,
    description: "Topic to search for",
};

const TIME_RANGE: ParamSpec = ParamSpec {
    name: "timeRange",
    required: false,
    description: "'recent' (default), 'month', 'year' or 'all'",
};

pub const TOOLS: &[ToolSpec] = &[
    ToolSpec {
        name: "blog-get-latest-posts",
        description: "Latest blog posts, newest first",
        params: &[COUNT],
    },
    ToolSpec {
        name: "blog-search-posts-by-keyword",
        description: "Blog posts whose title or description mention a keyword",
        params: &[KEYWORD, COUNT],
    },
    ToolSpec {
        name: "blog-get-posts-by-date-range",
        description: "Blog posts published within a date range",
        params: &[DATE_RANGE, COUNT],
    },
    ToolSpec {
        name: "blog-get-stats",
        description: "Posting statistics for the blog",
        params: &[],
    },
    ToolSpec {
        name: "speaking-get-latest-engagements",
        description: "Most recent speaking engagements",
        params: &[COUNT],
    },
    ToolSpec {
        name: "speaking-get-upcoming-events",
        description: "Upcoming speaking engagements, soonest first",
        params: &[COUNT],
    },
    ToolSpec {
        name: "speaking-get-past-events",
        description: "Past speaking engagements, most recent first",
        params: &[COUNT],
    },
    ToolSpec {
        name: "speaking-search-by-topic",
        description: "Engagements whose title, description, event or location match a topic",
        params: &[TOPIC, COUNT],
    },
    ToolSpec {
        name: "speaking-get-engagements-by-date-range",
        description: "Engagements starting within a date range",
        params: &[DATE_RANGE, COUNT],
    },
    ToolSpec {
        name: "speaking-get-stats",
        description: "Speaking statistics: counts, locations and event types",
        params: &[],
    },
    ToolSpec {
        name: "youtube-get-latest-videos",
        description: "Latest uploads, newest first",
        params: &[COUNT],
    },
    ToolSpec {
        name: "youtube-get-top-videos",
        description: "Most viewed uploads within a time range",
        params: &[COUNT, TIME_RANGE],
    },
    ToolSpec {
        name: "youtube-search-videos-by-topic",
        description: "Uploads whose title or description match a topic",
        params: &[TOPIC, COUNT],
    },
    ToolSpec {
        name: "youtube-get-videos-by-date-range",
        description: "Uploads published within a date range",
        params: &[DATE_RANGE, COUNT],
    },
    ToolSpec {
        name: "youtube-get-video-stats",
        description: "View, like and comment totals over the cached uploads",
        params: &[],
    },
    ToolSpec {
        name: "youtube-get-channel-stats",
        description: "Subscriber, view and video counts for the channel",
        params: &[],
    },
    ToolSpec {
        name: "list-tools",
        description: "List the available tools and their parameters",
        params: &[],
    },
];

/// String parameters of one tool call.
#[derive(Debug, Default, Clone)]
pub struct Params(HashMap<String, String>);

impl Params {
    pub fn new() -> Self {
        Params::default()
    }

    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.0.insert(name.to_string(), value.into());
        self
    }

    /// Scalars are converted to their text form. `null` counts as absent.
    pub fn from_json(map: serde_json::Map<String, Value>) -> Self {
        let params = map
            .into_iter()
            .filter_map(|(name, value)| {
                let text = match value {
                    Value::Null => return None,
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                Some((name, text))
            })
            .collect();
        Params(params)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    fn count(&self) -> usize {
        parse_count(self.get("count"))
    }

    fn text(&self, name: &str) -> ShowcaseResult<&str> {
        require_text(name, self.get(name))
    }
}

/// An engagement with its derived classification.
#[derive(Debug, Serialize)]
struct EngagementView {
    #[serde(flatten)]
    engagement: Engagement,
    event_type: EventType,
    status: Option<Phase>,
    when: String,
    topics: Vec<String>,
}

impl From<Engagement> for EngagementView {
    fn from(engagement: Engagement) -> Self {
        EngagementView {
            event_type: engagement.event_type(),
            status: engagement.status(Utc::now()),
            when: engagement.date_summary(),
            topics: engagement.topics(),
            engagement,
        }
    }
}

#[derive(Serialize)]
struct ToolInfo {
    name: &'static str,
    description: &'static str,
    params: Vec<ParamInfo>,
}

#[derive(Serialize)]
struct ParamInfo {
    name: &'static str,
    required: bool,
    description: &'static str,
}

fn engagement_views(result: SearchResult<Engagement>) -> SearchResult<EngagementView> {
    result.map(EngagementView::from)
}

fn json<T: Serialize>(value: T) -> ShowcaseResult<Value> {
    Ok(serde_json::to_value(value)?)
}

/// Run `tool` against `app`.
pub async fn call(app: &App, tool: &str, params: &Params) -> ShowcaseResult<Value> {
    match tool {
        "blog-get-latest-posts" => json(app.blog()?.latest_posts(params.count()).await),
        "blog-search-posts-by-keyword" => {
            let keyword = params.text("keyword")?;
            json(app.blog()?.search_by_keyword(keyword, params.count()).await)
        }
        "blog-get-posts-by-date-range" => {
            let range = params.text("dateRange")?;
            json(app.blog()?.posts_by_date_range(range, params.count()).await?)
        }
        "blog-get-stats" => json(app.blog()?.stats().await),

        "speaking-get-latest-engagements" => {
            let latest = app.speaking()?.latest_engagements(params.count()).await;
            json(latest.into_iter().map(EngagementView::from).collect::<Vec<_>>())
        }
        "speaking-get-upcoming-events" => json(engagement_views(
            app.speaking()?.upcoming_engagements(params.count()).await,
        )),
        "speaking-get-past-events" => json(engagement_views(
            app.speaking()?.past_engagements(params.count()).await,
        )),
        "speaking-search-by-topic" => {
            let topic = params.text("topic")?;
            json(engagement_views(
                app.speaking()?.search_by_topic(topic, params.count()).await,
            ))
        }
        "speaking-get-engagements-by-date-range" => {
            let range = params.text("dateRange")?;
            json(engagement_views(
                app.speaking()?.engagements_by_date_range(range, params.count()).await?,
            ))
        }
        "speaking-get-stats" => json(app.speaking()?.stats().await),

        "youtube-get-latest-videos" => json(app.youtube()?.latest_videos(params.count()).await),
        "youtube-get-top-videos" => {
            let range: TopRange = params.get("timeRange").unwrap_or_default().parse()?;
            json(app.youtube()?.top_videos(params.count(), range).await)
        }
        "youtube-search-videos-by-topic" => {
            let topic = params.text("topic")?;
            json(app.youtube()?.search_by_topic(topic, params.count()).await)
        }
        "youtube-get-videos-by-date-range" => {
            let range = params.text("dateRange")?;
            json(app.youtube()?.videos_by_date_range(range, params.count()).await?)
        }
        "youtube-get-video-stats" => json(app.youtube()?.video_stats().await),
        "youtube-get-channel-stats" => json(channel_stats(app).await?),

        "list-tools" => json(list_tools()),
        other => Err(ShowcaseError::UnknownTool(other.to_string())),
    }
}

async fn channel_stats(app: &App) -> ShowcaseResult<ChannelStats> {
    app.youtube()?
        .channel_stats()
        .await
        .ok_or_else(|| ShowcaseError::Remote {
            status: 503,
            message: "Channel statistics are not available yet".to_string(),
        })
}

fn list_tools() -> Vec<ToolInfo> {
    TOOLS
        .iter()
        .map(|tool| ToolInfo {
            name: tool.name,
            description: tool.description,
            params: tool
                .params
                .iter()
                .map(|p| ParamInfo {
                    name: p.name,
                    required: p.required,
                    description: p.description,
                })
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone};
    use serde_json::json;
    use showcase_core::blog::{BlogPost, BlogService};
    use showcase_core::speaking::SpeakingService;
    use showcase_core::{BoxedSource, Item, Source};

    use super::*;

    /// Serves a fixed list.
    struct Fixed<T>(Vec<T>);

    #[async_trait]
    impl<T: Item> Source for Fixed<T> {
        type Item = T;

        fn name(&self) -> &str {
            "fixed"
        }

        async fn fetch(&self) -> ShowcaseResult<Vec<T>> {
            Ok(self.0.clone())
        }
    }

    fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn post(id: &str, title: &str, at: DateTime<Utc>) -> BlogPost {
        BlogPost {
            id: id.to_string(),
            title: title.to_string(),
            link: format!("https://example.com/{id}"),
            description: String::new(),
            published_at: Some(at),
            author: None,
            tags: vec![],
            youtube_url: None,
        }
    }

    fn app() -> App {
        let posts: BoxedSource<BlogPost> = Box::new(Fixed(vec![
            post("a", "Spring Boot tips", day(2024, 3, 1)),
            post("b", "Java records", day(2024, 5, 1)),
            post("c", "Spring Security", day(2023, 7, 1)),
        ]));
        let talks: BoxedSource<Engagement> = Box::new(Fixed(vec![Engagement {
            title: "Spring AI".into(),
            url: None,
            event_name: Some("Devoxx Conference".into()),
            start: Some(day(2020, 10, 7)),
            end: None,
            location: Some("Antwerp".into()),
            description: None,
        }]));

        App {
            blog: Some(BlogService::new(posts, Duration::from_secs(60))),
            speaking: Some(SpeakingService::new(talks, Duration::from_secs(60))),
            youtube: None,
        }
    }

    #[tokio::test]
    async fn test_latest_posts_respects_count() {
        let value = call(&app(), "blog-get-latest-posts", &Params::new().with("count", "2"))
            .await
            .unwrap();
        let ids: Vec<&str> = value
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[tokio::test]
    async fn test_keyword_search_requires_keyword() {
        let app = app();
        let err = call(&app, "blog-search-posts-by-keyword", &Params::new().with("keyword", "  "))
            .await
            .unwrap_err();
        assert!(matches!(err, ShowcaseError::Validation(_)));

        let value = call(&app, "blog-search-posts-by-keyword", &Params::new().with("keyword", "spring"))
            .await
            .unwrap();
        assert_eq!(value["total_matches"], 2);
        assert_eq!(value["description"], "keyword search for 'spring'");
    }

    #[tokio::test]
    async fn test_date_range_errors_are_validation() {
        let err = call(&app(), "blog-get-posts-by-date-range", &Params::new().with("dateRange", "soon"))
            .await
            .unwrap_err();
        assert!(matches!(err, ShowcaseError::Validation(_)));
    }

    #[tokio::test]
    async fn test_engagements_carry_classification() {
        let value = call(&app(), "speaking-get-past-events", &Params::new()).await.unwrap();
        let talk = &value["items"][0];
        assert_eq!(talk["title"], "Spring AI");
        assert_eq!(talk["event_type"], "conference");
        assert_eq!(talk["status"], "past");
    }

    #[tokio::test]
    async fn test_disabled_and_unknown_tools() {
        let app = app();
        let err = call(&app, "youtube-get-latest-videos", &Params::new()).await.unwrap_err();
        assert!(matches!(err, ShowcaseError::FeatureDisabled(f) if f == "youtube"));

        let err = call(&app, "blog-delete-everything", &Params::new()).await.unwrap_err();
        assert!(matches!(err, ShowcaseError::UnknownTool(_)));
    }

    #[tokio::test]
    async fn test_list_tools() {
        let value = call(&App::default(), "list-tools", &Params::new()).await.unwrap();
        assert_eq!(value.as_array().unwrap().len(), TOOLS.len());
        assert_eq!(value[1]["params"][0]["name"], "keyword");
    }

    #[test]
    fn test_params_from_json() {
        let map = json!({"count": 5, "keyword": "java", "dateRange": null})
            .as_object()
            .unwrap()
            .clone();
        let params = Params::from_json(map);
        assert_eq!(params.get("count"), Some("5"));
        assert_eq!(params.get("keyword"), Some("java"));
        assert_eq!(params.get("dateRange"), None);
    }
}
