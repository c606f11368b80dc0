use async_trait::async_trait;
use banner::domain::{Banner, CacheKey};
use banner::ports::BannerCache;
use moka::future::Cache;
use std::fmt::Debug;
use std::time::Duration;

/// Moka-backed freshness cache.
/// Expiry is moka's time-to-live, measured from the last insert of a key.
pub struct MokaBannerCache {
    cache: Cache<CacheKey, Banner>,
}

impl MokaBannerCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: Cache::builder()
                .name("banners")
                .time_to_live(ttl)
                .build(),
        }
    }
}

#[async_trait]
impl BannerCache for MokaBannerCache {
    async fn get(&self, key: CacheKey) -> Option<Banner> {
        self.cache.get(&key).await
    }

    async fn put(&self, key: CacheKey, banner: Banner) {
        self.cache.insert(key, banner).await;
    }

    async fn invalidate(&self, key: CacheKey) -> bool {
        self.cache.remove(&key).await.is_some()
    }
}

impl Debug for MokaBannerCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaBannerCache")
            .field("entry_count", &self.cache.entry_count())
            .finish()
    }
}
