//! Core types for the showcase content aggregator.
//!
//! This crate provides everything except the network adapters:
//! - `RefreshableCache`, a refresh-on-read snapshot cache over any `Source`
//! - `query` and `stats`, pure functions over cached snapshots
//! - `blog`, `speaking` and `video`, the per-domain items and services
//! - `config`, loading and validating the per-domain settings

pub mod blog;
pub mod cache;
pub mod config;
pub mod date_range;
pub mod error;
pub mod item;
pub mod params;
pub mod query;
pub mod snapshot;
pub mod source;
pub mod speaking;
pub mod stats;
pub mod text;
pub mod video;

#[cfg(test)]
mod test_support;

pub use cache::{CacheRead, Freshness, RefreshableCache};
pub use date_range::DateRange;
pub use error::{ShowcaseError, ShowcaseResult};
pub use item::Item;
pub use query::{SearchKind, SearchResult};
pub use snapshot::Snapshot;
pub use source::{BoxedSource, Source};
