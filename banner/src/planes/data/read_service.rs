use crate::domain::{Banner, BannerContent, CacheKey, FeatureId, TagId, ensure_positive};
use crate::planes::data::operation::BannerReadOperations;
use crate::ports::{BannerCache, BannerStore};
use async_trait::async_trait;
use shared::{Error, Result};
use std::sync::Arc;

/// Cache-aside orchestration for the user banner read.
///
/// A cache hit is served as-is until its TTL lapses; nothing on the write
/// side evicts it unless the control plane is configured to refresh.
/// Concurrent misses for one key each go to the store and each republish.
#[derive(Clone)]
pub struct BannerReadService {
    store: Arc<dyn BannerStore>,
    cache: Arc<dyn BannerCache>,
}

impl BannerReadService {
    pub fn new(store: Arc<dyn BannerStore>, cache: Arc<dyn BannerCache>) -> Self {
        Self { store, cache }
    }

    /// Reads through to the store and republishes the cache on success.
    /// A store miss is returned as `NotFound` and leaves the cache untouched.
    async fn load_and_publish(&self, key: CacheKey) -> Result<Banner> {
        let banner = self
            .store
            .find_by_feature_and_tag(key.feature_id, key.tag_id)
            .await?
            .ok_or_else(|| {
                tracing::debug!("No banner stored for key '{}'", key);
                Error::NotFound
            })?;

        self.cache.put(key, banner.clone()).await;
        Ok(banner)
    }
}

impl std::fmt::Debug for BannerReadService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BannerReadService").finish_non_exhaustive()
    }
}

#[async_trait]
impl BannerReadOperations for BannerReadService {
    async fn get_user_banner(
        &self,
        feature_id: FeatureId,
        tag_id: TagId,
        force_fresh: bool,
    ) -> Result<BannerContent> {
        ensure_positive("feature_id", feature_id)?;
        ensure_positive("tag_id", tag_id)?;

        let key = CacheKey::new(feature_id, tag_id);

        if force_fresh {
            tracing::debug!("Fresh read requested for key '{}', bypassing cache", key);
            return Ok(self.load_and_publish(key).await?.content);
        }

        if let Some(banner) = self.cache.get(key).await {
            tracing::debug!("Banner for key '{}' served from cache", key);
            return Ok(banner.content);
        }

        tracing::debug!("Cache miss for key '{}', reading store", key);
        Ok(self.load_and_publish(key).await?.content)
    }
}
