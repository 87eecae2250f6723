//! Query engine: pure functions over an immutable snapshot.
//!
//! Every function borrows the snapshot's items and returns new owned lists;
//! nothing here mutates or locks anything. Result sizes are always clamped
//! to `1..=MAX_RESULTS`.

use std::cmp::Reverse;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::date_range::DateRange;
use crate::error::ShowcaseResult;
use crate::item::Item;
use crate::params::clamp_count;

/// What produced a [`SearchResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SearchKind {
    Latest,
    Keyword { keyword: String },
    DateRange { range: String },
    Upcoming,
    Ongoing,
    Past,
    TopViewed { range: String },
}

impl SearchKind {
    pub fn description(&self) -> String {
        match self {
            SearchKind::Latest => "latest items".to_string(),
            SearchKind::Keyword { keyword } => format!("keyword search for '{}'", keyword),
            SearchKind::DateRange { range } => format!("date range {}", range),
            SearchKind::Upcoming => "upcoming events".to_string(),
            SearchKind::Ongoing => "ongoing events".to_string(),
            SearchKind::Past => "past events".to_string(),
            SearchKind::TopViewed { range } => format!("most viewed ({})", range),
        }
    }
}

/// A filtered, sorted and truncated view of a snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult<T> {
    pub kind: SearchKind,
    pub description: String,
    /// Matches before truncation to the requested count.
    pub total_matches: usize,
    pub items: Vec<T>,
}

impl<T> SearchResult<T> {
    pub fn new(kind: SearchKind, total_matches: usize, items: Vec<T>) -> Self {
        SearchResult {
            description: kind.description(),
            kind,
            total_matches,
            items,
        }
    }

    pub fn has_results(&self) -> bool {
        !self.items.is_empty()
    }

    /// Convert the items, keeping kind and counts.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> SearchResult<U> {
        SearchResult {
            kind: self.kind,
            description: self.description,
            total_matches: self.total_matches,
            items: self.items.into_iter().map(f).collect(),
        }
    }
}

/// Stable sort, newest first. Undated items go last, keeping their order.
pub fn sort_newest_first<T: Item>(items: &mut [T]) {
    items.sort_by_key(|item| Reverse(item.timestamp()));
}

/// Stable sort, oldest first. Undated items go last.
pub fn sort_oldest_first<T: Item>(items: &mut [T]) {
    items.sort_by_key(|item| (item.timestamp().is_none(), item.timestamp()));
}

fn newest_first<T: Item>(mut matches: Vec<T>, n: usize) -> (usize, Vec<T>) {
    let total = matches.len();
    sort_newest_first(&mut matches);
    matches.truncate(clamp_count(n));
    (total, matches)
}

/// The `n` most recent items.
pub fn latest<T: Item>(items: &[T], n: usize) -> Vec<T> {
    newest_first(items.to_vec(), n).1
}

/// Case-insensitive substring search over each item's searchable fields.
/// A blank term matches nothing.
pub fn search<T: Item>(items: &[T], term: &str, n: usize) -> SearchResult<T> {
    let kind = SearchKind::Keyword {
        keyword: term.trim().to_string(),
    };

    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return SearchResult::new(kind, 0, Vec::new());
    }

    let matches = items
        .iter()
        .filter(|item| item.matches_keyword(&needle))
        .cloned()
        .collect();
    let (total, items) = newest_first(matches, n);
    SearchResult::new(kind, total, items)
}

/// Items whose timestamp falls inside `range` (inclusive). Undated items
/// never match.
pub fn in_range<T: Item>(items: &[T], range: &DateRange, n: usize) -> SearchResult<T> {
    let matches = items
        .iter()
        .filter(|item| item.timestamp().is_some_and(|at| range.contains(at)))
        .cloned()
        .collect();
    let (total, items) = newest_first(matches, n);
    SearchResult::new(
        SearchKind::DateRange {
            range: range.description.clone(),
        },
        total,
        items,
    )
}

pub fn in_year<T: Item>(items: &[T], year: i32, n: usize) -> ShowcaseResult<SearchResult<T>> {
    Ok(in_range(items, &DateRange::year(year)?, n))
}

/// Parse `text` with [`DateRange::parse`] and filter by it.
pub fn in_range_text<T: Item>(items: &[T], text: &str, n: usize) -> ShowcaseResult<SearchResult<T>> {
    let range = DateRange::parse(text)?;
    Ok(in_range(items, &range, n))
}

/// Where an item sits relative to a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Upcoming,
    Ongoing,
    Past,
}

/// Classify an item against `now`. Items without an end are treated as
/// lasting `default_duration`. Undated items have no phase.
pub fn phase<T: Item>(item: &T, now: DateTime<Utc>, default_duration: Duration) -> Option<Phase> {
    let start = item.timestamp()?;
    let end = item.end_timestamp().unwrap_or(start + default_duration);

    if start > now {
        Some(Phase::Upcoming)
    } else if end >= now {
        Some(Phase::Ongoing)
    } else {
        Some(Phase::Past)
    }
}

/// Has not started yet.
pub fn is_upcoming<T: Item>(item: &T, now: DateTime<Utc>) -> bool {
    item.timestamp().is_some_and(|start| start > now)
}

/// Finished before `now`, judged by the end timestamp when present and the
/// start otherwise.
pub fn is_past<T: Item>(item: &T, now: DateTime<Utc>) -> bool {
    item.end_timestamp()
        .or_else(|| item.timestamp())
        .is_some_and(|end| end < now)
}

/// Items that have not started, soonest first.
pub fn upcoming<T: Item>(items: &[T], now: DateTime<Utc>, n: usize) -> SearchResult<T> {
    let mut matches: Vec<T> = items
        .iter()
        .filter(|item| is_upcoming(*item, now))
        .cloned()
        .collect();
    let total = matches.len();
    sort_oldest_first(&mut matches);
    matches.truncate(clamp_count(n));
    SearchResult::new(SearchKind::Upcoming, total, matches)
}

/// Items that are over, most recent first.
pub fn past<T: Item>(items: &[T], now: DateTime<Utc>, n: usize) -> SearchResult<T> {
    let matches = items
        .iter()
        .filter(|item| is_past(*item, now))
        .cloned()
        .collect();
    let (total, items) = newest_first(matches, n);
    SearchResult::new(SearchKind::Past, total, items)
}

/// Items in progress at `now`.
pub fn ongoing<T: Item>(
    items: &[T],
    now: DateTime<Utc>,
    default_duration: Duration,
    n: usize,
) -> SearchResult<T> {
    let matches = items
        .iter()
        .filter(|item| phase(*item, now, default_duration) == Some(Phase::Ongoing))
        .cloned()
        .collect();
    let (total, items) = newest_first(matches, n);
    SearchResult::new(SearchKind::Ongoing, total, items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Note, at, note, spanning};
    use proptest::prelude::*;

    fn ids<T: Item>(items: &[T]) -> Vec<&str> {
        items.iter().map(|i| i.id()).collect()
    }

    #[test]
    fn test_latest_sorts_descending_then_truncates() {
        let items = vec![
            note("jan", "January", Some("2024-01-01")),
            note("jun", "June", Some("2024-06-01")),
            note("dec", "December", Some("2023-12-01")),
        ];

        assert_eq!(ids(&latest(&items, 2)), vec!["jun", "jan"]);
    }

    #[test]
    fn test_latest_puts_undated_last_and_clamps() {
        let items = vec![
            note("undated", "Someday", None),
            note("old", "Old", Some("2020-01-01")),
            note("new", "New", Some("2024-01-01")),
        ];

        assert_eq!(ids(&latest(&items, 10)), vec!["new", "old", "undated"]);
        assert_eq!(latest(&items, 0).len(), 1, "counts below 1 are raised to 1");
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let items = vec![
            note("a", "Spring Boot Basics", Some("2024-01-01")),
            note("b", "Java Fundamentals", Some("2024-02-01")),
        ];

        let result = search(&items, "spring", 10);
        assert_eq!(ids(&result.items), vec!["a"]);
        assert_eq!(result.total_matches, 1);
        assert_eq!(result.description, "keyword search for 'spring'");
    }

    #[test]
    fn test_search_reports_total_before_truncation() {
        let items: Vec<Note> = (1..=5)
            .map(|d| note(&format!("n{d}"), "Spring tip", Some(format!("2024-01-0{d}").as_str())))
            .collect();

        let result = search(&items, "SPRING", 2);
        assert_eq!(result.total_matches, 5);
        assert_eq!(ids(&result.items), vec!["n5", "n4"]);

        let titles = result.map(|n| n.title);
        assert_eq!(titles.total_matches, 5);
        assert_eq!(titles.items, vec!["Spring tip", "Spring tip"]);
    }

    #[test]
    fn test_in_range_includes_bounds_and_skips_undated() {
        let items = vec![
            note("inside", "Mid year", Some("2023-06-15T00:00:00")),
            note("outside", "New year", Some("2024-01-01T00:00:01")),
            note("undated", "Unknown", None),
        ];

        let result = in_range_text(&items, "2023-01-01 to 2023-12-31", 10).unwrap();
        assert_eq!(ids(&result.items), vec!["inside"]);
        assert_eq!(result.description, "date range 2023-01-01 to 2023-12-31");
    }

    #[test]
    fn test_in_range_rejects_bad_text() {
        let items = vec![note("a", "A", Some("2023-06-15"))];
        assert!(in_range_text(&items, "yesterday", 10).is_err());
    }

    #[test]
    fn test_year_matches_explicit_bounds() {
        let items = vec![
            note("a", "A", Some("2023-01-01T00:00:00")),
            note("b", "B", Some("2023-12-31T23:59:00")),
            note("c", "C", Some("2023-12-31T23:59:30")),
            note("d", "D", Some("2022-12-31T23:59:59")),
        ];

        let by_year = in_year(&items, 2023, 50).unwrap();
        let range = DateRange::new(at("2023-01-01T00:00:00"), at("2023-12-31T23:59:00")).unwrap();
        let explicit = in_range(&items, &range, 50);

        assert_eq!(ids(&by_year.items), ids(&explicit.items));
        assert_eq!(ids(&by_year.items), vec!["b", "a"]);
        assert_eq!(by_year.description, "date range 2023");
    }

    #[test]
    fn test_upcoming_past_and_ongoing_partition() {
        let now = at("2024-05-01T12:00:00");
        let two_hours = Duration::hours(2);
        let items = vec![
            note("later", "Later", Some("2024-07-01")),
            note("soon", "Soon", Some("2024-05-02")),
            spanning("conf", "Three day conf", "2024-04-30", "2024-05-02"),
            note("talk", "Talk an hour ago", Some("2024-05-01T11:00:00")),
            note("done", "Done", Some("2024-01-01")),
            note("undated", "TBD", None),
        ];

        assert_eq!(ids(&upcoming(&items, now, 10).items), vec!["soon", "later"]);
        assert_eq!(ids(&past(&items, now, 10).items), vec!["talk", "done"]);
        assert_eq!(ids(&ongoing(&items, now, two_hours, 10).items), vec!["talk", "conf"]);

        assert_eq!(phase(&items[2], now, two_hours), Some(Phase::Ongoing));
        assert_eq!(phase(&items[4], now, two_hours), Some(Phase::Past));
        assert_eq!(phase(&items[5], now, two_hours), None);
    }

    fn arb_notes() -> impl Strategy<Value = Vec<Note>> {
        prop::collection::vec(
            (prop::option::of(0i64..2_000_000_000), "[a-z ]{0,12}"),
            0..80,
        )
        .prop_map(|rows| {
            rows.into_iter()
                .enumerate()
                .map(|(i, (secs, title))| {
                    let mut n = note(&i.to_string(), &title, None);
                    n.at = secs.and_then(|s| DateTime::from_timestamp(s, 0));
                    n
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_latest_is_sorted_and_bounded(items in arb_notes(), n in 0usize..120) {
            let result = latest(&items, n);
            prop_assert!(result.len() <= n.clamp(1, 50).min(items.len()));
            for pair in result.windows(2) {
                prop_assert!(pair[0].timestamp() >= pair[1].timestamp());
            }
        }

        #[test]
        fn prop_blank_keyword_matches_nothing(items in arb_notes(), blank in "[ \t]{0,4}") {
            prop_assert!(search(&items, &blank, 50).items.is_empty());
        }
    }
}
