//! The contract every external source adapter implements.
//!
//! Adapters own their transport (HTTP client, timeouts, parsing). The cache
//! only knows that `fetch` either yields a full ordered collection or fails.

use async_trait::async_trait;

use crate::error::ShowcaseResult;
use crate::item::Item;

#[async_trait]
pub trait Source: Send + Sync {
    type Item: Item;

    /// Short label used in logs, e.g. "blog feed".
    fn name(&self) -> &str;

    /// Fetch the complete current collection from the external system.
    ///
    /// Calls must be read-only and idempotent: the cache may issue
    /// overlapping calls when several readers observe staleness at once.
    async fn fetch(&self) -> ShowcaseResult<Vec<Self::Item>>;
}

/// A boxed adapter, for callers that pick the concrete source at runtime.
pub type BoxedSource<T> = Box<dyn Source<Item = T>>;

#[async_trait]
impl<S: Source + ?Sized> Source for Box<S> {
    type Item = S::Item;

    fn name(&self) -> &str {
        (**self).name()
    }

    async fn fetch(&self) -> ShowcaseResult<Vec<Self::Item>> {
        (**self).fetch().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeSource, Note, note};

    #[tokio::test]
    async fn test_boxed_source_delegates() {
        let boxed: BoxedSource<Note> = Box::new(FakeSource::with_items(vec![note("a", "A", Some("2024-01-01"))]));
        assert_eq!(boxed.name(), "fake source");
        assert_eq!(boxed.fetch().await.unwrap().len(), 1);
    }
}
