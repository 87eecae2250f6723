use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cache::{Freshness, RefreshableCache};
use crate::error::ShowcaseResult;
use crate::query::{self, SearchResult};
use crate::source::Source;
use crate::speaking::engagement::{DEFAULT_EVENT_DURATION, Engagement};
use crate::stats::{self, GroupCount, PostingFrequency, Timeline};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeakingStats {
    #[serde(flatten)]
    pub timeline: Timeline,
    pub upcoming: usize,
    pub ongoing: usize,
    pub past: usize,
    pub next_event: Option<DateTime<Utc>>,
    pub most_common_location: Option<String>,
    pub most_common_event_type: Option<String>,
    /// Most frequent first; ties keep first-seen order.
    pub location_counts: Vec<GroupCount>,
    pub event_type_counts: Vec<GroupCount>,
    pub speaking_frequency: PostingFrequency,
}

impl SpeakingStats {
    pub fn compute(engagements: &[Engagement], now: DateTime<Utc>) -> Self {
        let timeline = Timeline::of(engagements, now);

        let upcoming = engagements.iter().filter(|e| query::is_upcoming(*e, now)).count();
        let past = engagements.iter().filter(|e| query::is_past(*e, now)).count();
        let ongoing = engagements
            .iter()
            .filter(|e| e.status(now) == Some(query::Phase::Ongoing))
            .count();

        let next_event = engagements
            .iter()
            .filter_map(|e| e.start)
            .filter(|start| *start > now)
            .min();

        let locations: Vec<String> = engagements
            .iter()
            .filter_map(|e| e.trimmed_location())
            .map(String::from)
            .collect();
        let event_types: Vec<String> = engagements
            .iter()
            .map(|e| e.event_type().label().to_string())
            .collect();

        SpeakingStats {
            upcoming,
            ongoing,
            past,
            next_event,
            most_common_location: stats::most_common(locations.iter().cloned()).map(|(l, _)| l),
            most_common_event_type: stats::most_common(event_types.iter().cloned()).map(|(t, _)| t),
            location_counts: ranked(locations),
            event_type_counts: ranked(event_types),
            speaking_frequency: timeline.frequency(),
            timeline,
        }
    }
}

fn ranked(keys: Vec<String>) -> Vec<GroupCount> {
    let mut counts = stats::group_counts(keys);
    counts.sort_by_key(|(_, count)| std::cmp::Reverse(*count));
    stats::to_group_counts(counts)
}

/// Cached access to one speaking-engagements endpoint.
pub struct SpeakingService<S: Source<Item = Engagement>> {
    cache: RefreshableCache<S>,
}

impl<S: Source<Item = Engagement>> SpeakingService<S> {
    pub fn new(source: S, cache_duration: Duration) -> Self {
        SpeakingService {
            cache: RefreshableCache::new(source, cache_duration),
        }
    }

    pub async fn all_engagements(&self) -> Vec<Engagement> {
        self.cache.get().await.to_vec()
    }

    pub async fn latest_engagements(&self, count: usize) -> Vec<Engagement> {
        query::latest(&self.cache.get().await, count)
    }

    pub async fn upcoming_engagements(&self, count: usize) -> SearchResult<Engagement> {
        self.upcoming_at(Utc::now(), count).await
    }

    pub async fn upcoming_at(&self, now: DateTime<Utc>, count: usize) -> SearchResult<Engagement> {
        query::upcoming(&self.cache.get().await, now, count)
    }

    pub async fn past_engagements(&self, count: usize) -> SearchResult<Engagement> {
        self.past_at(Utc::now(), count).await
    }

    pub async fn past_at(&self, now: DateTime<Utc>, count: usize) -> SearchResult<Engagement> {
        query::past(&self.cache.get().await, now, count)
    }

    pub async fn ongoing_engagements(&self, count: usize) -> SearchResult<Engagement> {
        query::ongoing(&self.cache.get().await, Utc::now(), DEFAULT_EVENT_DURATION, count)
    }

    /// Matches title, description, event name and location.
    pub async fn search_by_topic(&self, topic: &str, count: usize) -> SearchResult<Engagement> {
        query::search(&self.cache.get().await, topic, count)
    }

    pub async fn engagements_by_date_range(
        &self,
        range: &str,
        count: usize,
    ) -> ShowcaseResult<SearchResult<Engagement>> {
        query::in_range_text(&self.cache.get().await, range, count)
    }

    pub async fn engagements_by_year(
        &self,
        year: i32,
        count: usize,
    ) -> ShowcaseResult<SearchResult<Engagement>> {
        query::in_year(&self.cache.get().await, year, count)
    }

    pub async fn stats(&self) -> SpeakingStats {
        SpeakingStats::compute(&self.cache.get().await, Utc::now())
    }

    pub fn freshness(&self) -> Freshness {
        self.cache.status()
    }

    pub fn cache(&self) -> &RefreshableCache<S> {
        &self.cache
    }
}
