//! Immutable, timestamped item collections.

use std::ops::Deref;
use std::sync::Arc;

use chrono::{DateTime, Utc};

/// The result of one successful source fetch.
///
/// Snapshots are handed out as `Arc<Snapshot<T>>` and never mutated after
/// construction, so queries always see one consistent collection even while
/// a refresh is replacing it.
#[derive(Debug)]
pub struct Snapshot<T> {
    items: Vec<T>,
    produced_at: Option<DateTime<Utc>>,
}

impl<T> Snapshot<T> {
    pub fn new(items: Vec<T>, produced_at: DateTime<Utc>) -> Self {
        Snapshot {
            items,
            produced_at: Some(produced_at),
        }
    }

    /// The placeholder served before any fetch has succeeded.
    pub fn empty() -> Self {
        Snapshot {
            items: Vec::new(),
            produced_at: None,
        }
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// `None` for the empty placeholder.
    pub fn produced_at(&self) -> Option<DateTime<Utc>> {
        self.produced_at
    }
}

impl<T> Deref for Snapshot<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.items
    }
}

impl<T> Default for Snapshot<T> {
    fn default() -> Self {
        Self::empty()
    }
}
