//! Statistics aggregator: descriptive numbers over a snapshot.
//!
//! All functions are pure and take "now" as an argument so results are
//! reproducible. Nothing divides by zero: empty inputs produce zeroes,
//! `None` and `"0%"`.

use std::collections::HashMap;
use std::hash::Hash;

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;

use crate::item::Item;

/// Counts and dates shared by every domain's statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Timeline {
    pub total: usize,
    pub first: Option<DateTime<Utc>>,
    pub last: Option<DateTime<Utc>>,
    pub this_year: usize,
    pub this_month: usize,
    pub average_per_month: f64,
}

impl Timeline {
    pub fn of<T: Item>(items: &[T], now: DateTime<Utc>) -> Self {
        let dated: Vec<DateTime<Utc>> = items.iter().filter_map(T::timestamp).collect();
        let first = dated.iter().min().copied();
        let last = dated.iter().max().copied();

        let this_year = dated.iter().filter(|at| at.year() == now.year()).count();
        let this_month = dated
            .iter()
            .filter(|at| at.year() == now.year() && at.month() == now.month())
            .count();

        let average_per_month = match (first, last) {
            (Some(first), Some(last)) => average_per_month(items.len(), first, last),
            _ => 0.0,
        };

        Timeline {
            total: items.len(),
            first,
            last,
            this_year,
            this_month,
            average_per_month,
        }
    }

    pub fn frequency(&self) -> PostingFrequency {
        PostingFrequency::from_average(self.average_per_month)
    }

    /// e.g. "Started in 2021" or "3 years (2021 - 2024)".
    pub fn timespan(&self) -> String {
        match (self.first, self.last) {
            (Some(first), Some(last)) if last.year() > first.year() => format!(
                "{} years ({} - {})",
                last.year() - first.year(),
                first.year(),
                last.year()
            ),
            (Some(first), Some(_)) => format!("Started in {}", first.year()),
            _ => "Unknown timespan".to_string(),
        }
    }
}

/// Whole calendar months from `from` to `to`, ignoring the day of month.
pub fn months_between(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    let from_index = i64::from(from.year()) * 12 + i64::from(from.month0());
    let to_index = i64::from(to.year()) * 12 + i64::from(to.month0());
    to_index - from_index
}

/// `count / (months_between + 1)`, or 0 when everything falls in a single
/// calendar month.
pub fn average_per_month(count: usize, first: DateTime<Utc>, last: DateTime<Utc>) -> f64 {
    let months = months_between(first, last);
    if months < 1 {
        return 0.0;
    }
    count as f64 / (months + 1) as f64
}

/// Share of `part` in `total` formatted like "12.5%". Always "0%" when
/// `total` is zero.
pub fn percentage(part: usize, total: usize) -> String {
    if total == 0 {
        return "0%".to_string();
    }
    format!("{:.1}%", part as f64 * 100.0 / total as f64)
}

/// Occurrences per distinct key, in first-seen order.
pub fn group_counts<K, I>(keys: I) -> Vec<(K, usize)>
where
    K: Eq + Hash + Clone,
    I: IntoIterator<Item = K>,
{
    let mut positions: HashMap<K, usize> = HashMap::new();
    let mut counts: Vec<(K, usize)> = Vec::new();

    for key in keys {
        match positions.get(&key) {
            Some(&i) => counts[i].1 += 1,
            None => {
                positions.insert(key.clone(), counts.len());
                counts.push((key, 1));
            }
        }
    }

    counts
}

/// The key with the highest count. Ties go to the key seen first.
pub fn most_common<K, I>(keys: I) -> Option<(K, usize)>
where
    K: Eq + Hash + Clone,
    I: IntoIterator<Item = K>,
{
    group_counts(keys)
        .into_iter()
        .fold(None, |best, (key, count)| match best {
            Some((_, best_count)) if best_count >= count => best,
            _ => Some((key, count)),
        })
}

/// A serializable `(value, count)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupCount {
    pub value: String,
    pub count: usize,
}

pub fn to_group_counts(counts: Vec<(String, usize)>) -> Vec<GroupCount> {
    counts
        .into_iter()
        .map(|(value, count)| GroupCount { value, count })
        .collect()
}

/// Classification of how often new items appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PostingFrequency {
    VeryActive,
    Active,
    Regular,
    Occasional,
}

impl PostingFrequency {
    pub fn from_average(per_month: f64) -> Self {
        if per_month >= 4.0 {
            PostingFrequency::VeryActive
        } else if per_month >= 2.0 {
            PostingFrequency::Active
        } else if per_month >= 1.0 {
            PostingFrequency::Regular
        } else {
            PostingFrequency::Occasional
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PostingFrequency::VeryActive => "Very active (4+ per month)",
            PostingFrequency::Active => "Active (2-4 per month)",
            PostingFrequency::Regular => "Regular (1-2 per month)",
            PostingFrequency::Occasional => "Occasional (less than 1 per month)",
        }
    }
}
