//! Refresh-on-read snapshot cache.
//!
//! A [`RefreshableCache`] wraps one [`Source`] and keeps the last snapshot it
//! produced. Staleness is only checked when somebody reads: there is no
//! background timer, and the reader that notices an expired entry pays for
//! the refresh. A failed refresh is logged and the previous snapshot keeps
//! being served.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, error, info};

use crate::snapshot::Snapshot;
use crate::source::Source;

/// Shortest TTL a cache accepts.
pub const MIN_TTL: Duration = Duration::from_secs(60);

/// TTL used when the configuration does not set one.
pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);

enum CacheState<T> {
    Empty,
    Holding {
        snapshot: Arc<Snapshot<T>>,
        refreshed_at: Instant,
    },
}

/// How current the data returned by [`RefreshableCache::read`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Freshness {
    /// No fetch has ever succeeded; the snapshot is empty.
    Empty,
    /// Produced within the TTL window.
    Fresh,
    /// Older than the TTL; the last refresh attempt failed.
    Stale,
}

impl fmt::Display for Freshness {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let label = match self {
            Freshness::Empty => "empty",
            Freshness::Fresh => "fresh",
            Freshness::Stale => "stale",
        };
        write!(f, "{}", label)
    }
}

/// A snapshot together with its freshness at the moment it was read.
#[derive(Debug)]
pub struct CacheRead<T> {
    pub snapshot: Arc<Snapshot<T>>,
    pub freshness: Freshness,
}

pub struct RefreshableCache<S: Source> {
    source: S,
    ttl: Duration,
    state: RwLock<CacheState<S::Item>>,
    empty: Arc<Snapshot<S::Item>>,
}

impl<S: Source> RefreshableCache<S> {
    /// Create an empty cache. Nothing is fetched until the first read.
    ///
    /// The TTL is validated by the configuration layer; values below
    /// [`MIN_TTL`] are raised to it here so a cache can never hammer its
    /// source.
    pub fn new(source: S, ttl: Duration) -> Self {
        RefreshableCache {
            source,
            ttl: ttl.max(MIN_TTL),
            state: RwLock::new(CacheState::Empty),
            empty: Snapshot::empty().shared(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Current snapshot, refreshing first if the entry is empty or expired.
    ///
    /// Never fails: source errors are logged and the previous snapshot (or an
    /// empty one) is returned instead.
    pub async fn get(&self) -> Arc<Snapshot<S::Item>> {
        self.read().await.snapshot
    }

    /// Like [`get`](Self::get), but also reports whether the returned data is
    /// fresh or a stale fallback.
    pub async fn read(&self) -> CacheRead<S::Item> {
        if let Some(snapshot) = self.current_if_fresh() {
            return CacheRead {
                snapshot,
                freshness: Freshness::Fresh,
            };
        }

        debug!("Refreshing {} (ttl {:?})", self.source.name(), self.ttl);

        match self.source.fetch().await {
            Ok(items) => {
                let count = items.len();
                let snapshot = Snapshot::new(items, Utc::now()).shared();
                self.publish(snapshot.clone());
                info!("{} cache refreshed with {} items", self.source.name(), count);
                CacheRead {
                    snapshot,
                    freshness: Freshness::Fresh,
                }
            }
            Err(e) => {
                error!("Failed to refresh {}: {}", self.source.name(), e);
                self.fallback()
            }
        }
    }

    /// State of the entry without triggering a refresh.
    pub fn status(&self) -> Freshness {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        match &*state {
            CacheState::Empty => Freshness::Empty,
            CacheState::Holding { refreshed_at, .. } if refreshed_at.elapsed() < self.ttl => {
                Freshness::Fresh
            }
            CacheState::Holding { .. } => Freshness::Stale,
        }
    }

    fn current_if_fresh(&self) -> Option<Arc<Snapshot<S::Item>>> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        match &*state {
            CacheState::Holding {
                snapshot,
                refreshed_at,
            } if refreshed_at.elapsed() < self.ttl => Some(snapshot.clone()),
            _ => None,
        }
    }

    /// Swap in a new snapshot. Snapshot and timestamp change under one write
    /// lock, so readers never see one without the other.
    fn publish(&self, snapshot: Arc<Snapshot<S::Item>>) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        *state = CacheState::Holding {
            snapshot,
            refreshed_at: Instant::now(),
        };
    }

    fn fallback(&self) -> CacheRead<S::Item> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        match &*state {
            CacheState::Empty => CacheRead {
                snapshot: self.empty.clone(),
                freshness: Freshness::Empty,
            },
            // Another reader may have refreshed while our fetch was failing.
            CacheState::Holding {
                snapshot,
                refreshed_at,
            } => CacheRead {
                snapshot: snapshot.clone(),
                freshness: if refreshed_at.elapsed() < self.ttl {
                    Freshness::Fresh
                } else {
                    Freshness::Stale
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::error::ShowcaseResult;
    use crate::test_support::{FakeSource, Note, note};

    /// Answers call `n` after a short delay with `n + 2` items, all ids
    /// prefixed by `n`, so a mixed snapshot is detectable.
    struct SlowSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Source for SlowSource {
        type Item = Note;

        fn name(&self) -> &str {
            "slow source"
        }

        async fn fetch(&self) -> ShowcaseResult<Vec<Note>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok((0..call + 2)
                .map(|i| note(&format!("{call}-{i}"), "Batch", None))
                .collect())
        }
    }

    fn assert_one_batch(snapshot: &Snapshot<Note>) {
        let prefix = snapshot[0].id.split('-').next().unwrap_or_default().to_string();
        let call: usize = prefix.parse().unwrap();
        assert_eq!(snapshot.len(), call + 2, "snapshot from call {} is incomplete", call);
        for (i, item) in snapshot.iter().enumerate() {
            assert_eq!(item.id, format!("{prefix}-{i}"));
        }
        assert!(snapshot.produced_at().is_some());
    }

    fn ttl_one_minute() -> Duration {
        Duration::from_secs(60)
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetches_only_when_ttl_expires() {
        let source = FakeSource::new();
        source.push_ok(vec![note("a", "First", Some("2024-01-01"))]);
        source.push_ok(vec![note("b", "Second", Some("2024-02-01"))]);
        let cache = RefreshableCache::new(source, ttl_one_minute());

        let first = cache.get().await;
        assert_eq!(cache.source().calls(), 1);
        assert_eq!(first[0].id, "a");

        tokio::time::advance(Duration::from_secs(30)).await;
        let second = cache.get().await;
        assert_eq!(cache.source().calls(), 1, "no fetch inside the TTL window");
        assert!(Arc::ptr_eq(&first, &second));

        tokio::time::advance(Duration::from_secs(31)).await;
        let third = cache.get().await;
        assert_eq!(cache.source().calls(), 2);
        assert_eq!(third[0].id, "b");
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_refresh_serves_previous_snapshot() {
        let source = FakeSource::new();
        source.push_ok(vec![note("a", "Kept", Some("2024-01-01"))]);
        source.push_err("connection refused");
        let cache = RefreshableCache::new(source, ttl_one_minute());

        let first = cache.get().await;
        tokio::time::advance(Duration::from_secs(61)).await;

        let read = cache.read().await;
        assert_eq!(cache.source().calls(), 2);
        assert_eq!(read.freshness, Freshness::Stale);
        assert!(Arc::ptr_eq(&first, &read.snapshot));
        assert_eq!(cache.status(), Freshness::Stale);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_before_first_success_yields_empty() {
        let source = FakeSource::new();
        source.push_err("timeout");
        source.push_ok(vec![note("a", "Late", None)]);
        let cache = RefreshableCache::new(source, ttl_one_minute());

        let read = cache.read().await;
        assert_eq!(read.freshness, Freshness::Empty);
        assert!(read.snapshot.is_empty());
        assert!(read.snapshot.produced_at().is_none());
        assert_eq!(cache.status(), Freshness::Empty);

        // Empty entries are retried on the very next read.
        let read = cache.read().await;
        assert_eq!(read.freshness, Freshness::Fresh);
        assert_eq!(read.snapshot.len(), 1);
        assert_eq!(cache.source().calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_entry_recovers_on_later_success() {
        let source = FakeSource::new();
        source.push_ok(vec![note("a", "Old", None)]);
        source.push_err("502");
        source.push_ok(vec![note("b", "New", None), note("c", "Newer", None)]);
        let cache = RefreshableCache::new(source, ttl_one_minute());

        cache.get().await;
        tokio::time::advance(Duration::from_secs(60)).await;
        assert_eq!(cache.get().await[0].id, "a");

        // Still stale after the failure, so the next read tries again.
        let snapshot = cache.get().await;
        assert_eq!(cache.source().calls(), 3);
        assert_eq!(snapshot.len(), 2);
        assert_eq!(cache.status(), Freshness::Fresh);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_racing_refreshes_publish_whole_snapshots() {
        let cache = Arc::new(RefreshableCache::new(
            SlowSource {
                calls: AtomicUsize::new(0),
            },
            ttl_one_minute(),
        ));

        let readers: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                tokio::spawn(async move { cache.read().await })
            })
            .collect();

        for reader in readers {
            let read = reader.await.unwrap();
            assert_eq!(read.freshness, Freshness::Fresh);
            assert_one_batch(&read.snapshot);
        }

        // Whatever won the race is served whole, and with a matching status.
        let calls = cache.source().calls.load(Ordering::SeqCst);
        let settled = cache.get().await;
        assert_one_batch(&settled);
        assert_eq!(cache.status(), Freshness::Fresh);
        assert!(settled.produced_at() <= Some(Utc::now()));
        assert!(Arc::ptr_eq(&settled, &cache.get().await));
        assert_eq!(cache.source().calls.load(Ordering::SeqCst), calls, "settled entry is not refetched");
    }

    #[test]
    fn test_ttl_is_floored_at_one_minute() {
        let cache = RefreshableCache::new(FakeSource::<Note>::new(), Duration::from_secs(5));
        assert_eq!(cache.ttl(), MIN_TTL);
    }
}
