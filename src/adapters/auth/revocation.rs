//! Revocation cache and its periodic refresher.
//!
//! Token validation checks `jti` claims against a local snapshot so no
//! network call sits on the connection path. A background task replaces the
//! snapshot on an interval; a failed refresh keeps the previous snapshot.
//!
//! # Failure Semantics
//!
//! Refresh failures fail *open*: a token revoked after the last successful
//! refresh keeps working until the authority is reachable again. Until the
//! first successful refresh the cache is empty and revokes nothing.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, RwLock};
use tokio::time::{self, MissedTickBehavior};

use crate::ports::{RevocationError, RevocationSource};

/// Default refresh interval.
pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_secs(30);

/// Shortest refresh interval accepted; shorter requests are raised to this.
pub const MIN_SYNC_INTERVAL: Duration = Duration::from_secs(5);

/// Snapshot of revoked token identifiers.
///
/// Readers clone an `Arc` to the current set; a refresh swaps the whole set
/// in one write, so readers never observe a partially updated list.
#[derive(Debug, Default)]
pub struct RevocationCache {
    revoked: RwLock<Arc<HashSet<String>>>,
}

impl RevocationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `jti` is in the current snapshot. Blank ids are never revoked.
    pub async fn is_revoked(&self, jti: &str) -> bool {
        let jti = jti.trim();
        if jti.is_empty() {
            return false;
        }
        self.revoked.read().await.contains(jti)
    }

    /// Replace the snapshot wholesale. Entries are trimmed and blanks dropped.
    ///
    /// Returns the size of the new snapshot.
    pub async fn replace<I>(&self, ids: I) -> usize
    where
        I: IntoIterator<Item = String>,
    {
        let next: HashSet<String> = ids
            .into_iter()
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .collect();
        let size = next.len();

        *self.revoked.write().await = Arc::new(next);
        size
    }
}

/// Clamp a requested interval to the supported floor.
pub fn sync_interval(requested: Duration) -> Duration {
    requested.max(MIN_SYNC_INTERVAL)
}

/// Background task that keeps a [`RevocationCache`] fresh.
pub struct RevocationSync {
    source: Arc<dyn RevocationSource>,
    cache: Arc<RevocationCache>,
    interval: Duration,
}

impl RevocationSync {
    /// Create a refresher. `interval` is raised to [`MIN_SYNC_INTERVAL`] if shorter.
    pub fn new(source: Arc<dyn RevocationSource>, cache: Arc<RevocationCache>, interval: Duration) -> Self {
        Self {
            source,
            cache,
            interval: sync_interval(interval),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Fetch once and swap the snapshot on success.
    ///
    /// On failure the previous snapshot stays in place and the error is returned.
    pub async fn refresh_once(&self) -> Result<usize, RevocationError> {
        let ids = self.source.fetch_revoked().await?;
        let size = self.cache.replace(ids).await;
        tracing::debug!(revoked = size, "Revocation list refreshed");
        Ok(size)
    }

    /// Refresh immediately, then on every interval until shutdown.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(interval_secs = self.interval.as_secs(), "Revocation sync started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.refresh_once().await {
                        tracing::warn!("Revocation refresh failed, keeping previous list: {}", e);
                    }
                }

                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!("Revocation sync stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::auth::StaticRevocationSource;

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn empty_cache_revokes_nothing() {
        let cache = RevocationCache::new();
        assert!(!cache.is_revoked("abc").await);
    }

    #[tokio::test]
    async fn replace_trims_and_drops_blank_entries() {
        let cache = RevocationCache::new();
        let size = cache.replace(ids(&[" a ", "", "   ", "b", "b"])).await;

        assert_eq!(size, 2);
        assert!(cache.is_revoked("a").await);
        assert!(cache.is_revoked("b").await);
        assert!(!cache.is_revoked("").await);
        assert!(!cache.is_revoked("   ").await);
    }

    #[tokio::test]
    async fn replace_discards_previous_snapshot() {
        let cache = RevocationCache::new();
        cache.replace(ids(&["old"])).await;
        let size = cache.replace(ids(&["new"])).await;

        assert!(!cache.is_revoked("old").await);
        assert!(cache.is_revoked("new").await);
        assert_eq!(size, 1);
    }

    #[test]
    fn interval_is_floored_at_five_seconds() {
        assert_eq!(sync_interval(Duration::from_secs(1)), MIN_SYNC_INTERVAL);
        assert_eq!(sync_interval(Duration::ZERO), MIN_SYNC_INTERVAL);
        assert_eq!(sync_interval(Duration::from_secs(45)), Duration::from_secs(45));
    }

    #[tokio::test]
    async fn refresh_once_swaps_snapshot() {
        let source = Arc::new(StaticRevocationSource::new(ids(&["jti-1", "jti-2"])));
        let cache = Arc::new(RevocationCache::new());
        let sync = RevocationSync::new(source, cache.clone(), DEFAULT_SYNC_INTERVAL);

        assert_eq!(sync.refresh_once().await, Ok(2));
        assert!(cache.is_revoked("jti-1").await);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_snapshot() {
        let source = Arc::new(StaticRevocationSource::new(ids(&["jti-1"])));
        let cache = Arc::new(RevocationCache::new());
        let sync = RevocationSync::new(source.clone(), cache.clone(), DEFAULT_SYNC_INTERVAL);
        sync.refresh_once().await.unwrap();

        source.fail_with(RevocationError::Unavailable("connection refused".to_string()));
        assert!(sync.refresh_once().await.is_err());

        assert!(cache.is_revoked("jti-1").await);
    }

    #[tokio::test(start_paused = true)]
    async fn run_refreshes_immediately_then_on_interval() {
        let source = Arc::new(StaticRevocationSource::new(ids(&["first"])));
        let cache = Arc::new(RevocationCache::new());
        let sync = RevocationSync::new(source.clone(), cache.clone(), Duration::from_secs(5));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(sync.run(shutdown_rx));

        time::sleep(Duration::from_millis(10)).await;
        assert!(cache.is_revoked("first").await);

        source.set(ids(&["second"]));
        time::sleep(Duration::from_secs(5)).await;
        assert!(cache.is_revoked("second").await);
        assert!(!cache.is_revoked("first").await);
        assert!(source.fetch_count() >= 2);

        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();
    }
}
