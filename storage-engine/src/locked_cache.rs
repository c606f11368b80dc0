use async_trait::async_trait;
use banner::clock::{Clock, SystemClock};
use banner::domain::{Banner, CacheKey};
use banner::ports::BannerCache;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Clone, Debug)]
struct CacheEntry {
    banner: Banner,
    stored_at: Instant,
}

/// Map behind one reader/writer lock with expiry checked on access.
///
/// Readers share the lock. A reader that finds a stale entry takes the write
/// lock and evicts it, unless a `put` refreshed the entry in between.
/// Entries nobody reads again stay resident; there is no sweeper and no size
/// bound.
pub struct LockedBannerCache {
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl LockedBannerCache {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_CACHE_TTL, Arc::new(SystemClock))
    }

    /// Resident entries, stale ones included.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    fn is_fresh(&self, entry: &CacheEntry, now: Instant) -> bool {
        now.saturating_duration_since(entry.stored_at) < self.ttl
    }
}

#[async_trait]
impl BannerCache for LockedBannerCache {
    async fn get(&self, key: CacheKey) -> Option<Banner> {
        {
            let entries = self.entries.read().await;
            let entry = entries.get(&key)?;
            if self.is_fresh(entry, self.clock.now()) {
                return Some(entry.banner.clone());
            }
        }

        let mut entries = self.entries.write().await;
        let now = self.clock.now();
        match entries.get(&key) {
            Some(entry) if self.is_fresh(entry, now) => Some(entry.banner.clone()),
            Some(_) => {
                entries.remove(&key);
                tracing::debug!("Evicted stale cache entry '{}'", key);
                None
            }
            None => None,
        }
    }

    async fn put(&self, key: CacheKey, banner: Banner) {
        let stored_at = self.clock.now();
        self.entries
            .write()
            .await
            .insert(key, CacheEntry { banner, stored_at });
    }

    async fn invalidate(&self, key: CacheKey) -> bool {
        self.entries.write().await.remove(&key).is_some()
    }
}

impl Debug for LockedBannerCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockedBannerCache")
            .field("ttl", &self.ttl)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}
