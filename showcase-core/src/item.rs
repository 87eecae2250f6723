//! Source-neutral item model.
//!
//! Every domain (blog posts, speaking engagements, videos) implements
//! [`Item`], and the cache, query engine and statistics work exclusively
//! against it.

use chrono::{DateTime, Utc};

/// A single entry of a cached collection.
pub trait Item: Clone + Send + Sync + 'static {
    fn id(&self) -> &str;

    fn title(&self) -> &str;

    /// When the item happened or was published. `None` means "date unknown":
    /// such items sort as least recent and never match a date filter.
    fn timestamp(&self) -> Option<DateTime<Utc>>;

    /// End of the item's time span, for items that have one.
    fn end_timestamp(&self) -> Option<DateTime<Utc>> {
        None
    }

    /// Free-text fields that keyword search looks at.
    fn search_fields(&self) -> Vec<&str>;

    /// Case-insensitive substring match against [`Item::search_fields`].
    /// `needle` must already be lowercased.
    fn matches_keyword(&self, needle: &str) -> bool {
        self.search_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}
