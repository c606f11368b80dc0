use crate::domain::{
    Banner, BannerFilter, BannerId, Feature, NewBanner, Tag, ensure_positive, normalize_name,
};
use crate::planes::control::operation::BannerAdminOperations;
use crate::ports::{BannerCache, BannerStore, BannerTransaction, CatalogStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::{Error, Result};
use std::sync::Arc;

/// What a committed write does to cached copies of the banner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CacheWritePolicy {
    /// Cached copies stay servable until their TTL lapses.
    #[default]
    Untouched,
    /// Updates evict the pairs the banner had when the write transaction
    /// read it and publish the new ones. Deletes evict the pairs read just
    /// before the delete.
    Refresh,
}

/// Application service for the administrative side: listing, banner writes
/// and the feature/tag catalog. Every banner write runs in one store
/// transaction and is rolled back on the first failing step.
pub struct BannerAdminService {
    store: Arc<dyn BannerStore>,
    catalog: Arc<dyn CatalogStore>,
    cache: Arc<dyn BannerCache>,
    cache_policy: CacheWritePolicy,
}

impl BannerAdminService {
    pub fn new(
        store: Arc<dyn BannerStore>,
        catalog: Arc<dyn CatalogStore>,
        cache: Arc<dyn BannerCache>,
    ) -> Self {
        Self {
            store,
            catalog,
            cache,
            cache_policy: CacheWritePolicy::default(),
        }
    }

    pub fn with_cache_policy(mut self, cache_policy: CacheWritePolicy) -> Self {
        self.cache_policy = cache_policy;
        self
    }

    pub fn cache_policy(&self) -> CacheWritePolicy {
        self.cache_policy
    }

    async fn apply_create(
        tx: &mut dyn BannerTransaction,
        banner: &NewBanner,
        now: DateTime<Utc>,
    ) -> Result<BannerId> {
        let id = tx.insert_banner(banner, now).await?;
        for tag_id in &banner.tag_ids {
            tx.insert_tag_association(id, *tag_id).await?;
        }
        Ok(id)
    }

    async fn apply_update(tx: &mut dyn BannerTransaction, banner: &Banner) -> Result<bool> {
        tx.delete_tag_associations_for_banner(banner.id).await?;
        for tag_id in &banner.tag_ids {
            tx.insert_tag_association(banner.id, *tag_id).await?;
        }
        tx.update_banner_fields(banner).await
    }

    /// Rolls back after a failed step. The step's error is what the caller sees.
    async fn abort(tx: Box<dyn BannerTransaction>, cause: &Error) {
        tracing::warn!("Rolling back banner write: {}", cause);
        if let Err(e) = tx.rollback().await {
            tracing::error!("Rollback failed: {}", e);
        }
    }

    async fn evict(&self, banner: &Banner) {
        for key in banner.cache_keys() {
            self.cache.invalidate(key).await;
        }
    }

    async fn publish(&self, banner: &Banner) {
        for key in banner.cache_keys() {
            self.cache.put(key, banner.clone()).await;
        }
    }
}

impl std::fmt::Debug for BannerAdminService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BannerAdminService")
            .field("cache_policy", &self.cache_policy)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl BannerAdminOperations for BannerAdminService {
    async fn list_banners(&self, filter: BannerFilter) -> Result<Vec<Banner>> {
        filter.validate()?;
        self.store.list_filtered(&filter).await
    }

    async fn create_banner(&self, banner: NewBanner) -> Result<Banner> {
        banner.validate()?;

        let now = Utc::now();
        let mut tx = self.store.begin().await?;
        let id = match Self::apply_create(tx.as_mut(), &banner, now).await {
            Ok(id) => id,
            Err(e) => {
                Self::abort(tx, &e).await;
                return Err(e);
            }
        };
        tx.commit().await?;

        tracing::info!(
            "Created banner {} for feature {} with {} tag(s)",
            id,
            banner.feature_id,
            banner.tag_ids.len()
        );
        Ok(banner.into_banner(id, now, now))
    }

    async fn update_banner(&self, id: BannerId, banner: NewBanner) -> Result<Banner> {
        ensure_positive("id", id)?;
        banner.validate()?;

        // Cheap existence check before taking any lock.
        self.store.find_by_id(id).await?.ok_or(Error::NotFound)?;

        let mut tx = self.store.begin().await?;
        // Keys to evict come from this read, not the one above.
        let current = match tx.find_banner(id).await {
            Ok(Some(current)) => current,
            Ok(None) => {
                Self::abort(tx, &Error::NotFound).await;
                return Err(Error::NotFound);
            }
            Err(e) => {
                Self::abort(tx, &e).await;
                return Err(e);
            }
        };
        let updated = banner.into_banner(id, current.created_at, Utc::now());

        match Self::apply_update(tx.as_mut(), &updated).await {
            Ok(true) => tx.commit().await?,
            Ok(false) => {
                Self::abort(tx, &Error::NotFound).await;
                return Err(Error::NotFound);
            }
            Err(e) => {
                Self::abort(tx, &e).await;
                return Err(e);
            }
        }

        tracing::info!("Updated banner {}", id);

        if self.cache_policy == CacheWritePolicy::Refresh {
            self.evict(&current).await;
            self.publish(&updated).await;
        }

        Ok(updated)
    }

    async fn delete_banner(&self, id: BannerId) -> Result<()> {
        ensure_positive("id", id)?;

        let existing = match self.cache_policy {
            CacheWritePolicy::Refresh => self.store.find_by_id(id).await?,
            CacheWritePolicy::Untouched => None,
        };

        if !self.store.delete_banner(id).await? {
            return Err(Error::NotFound);
        }
        tracing::info!("Deleted banner {}", id);

        if let Some(banner) = existing {
            self.evict(&banner).await;
        }
        Ok(())
    }

    async fn create_feature(&self, name: &str) -> Result<Feature> {
        let name = normalize_name("name", name)?;
        self.catalog.create_feature(&name).await
    }

    async fn create_tag(&self, name: &str) -> Result<Tag> {
        let name = normalize_name("name", name)?;
        self.catalog.create_tag(&name).await
    }
}
