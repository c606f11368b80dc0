#![deny(clippy::all)]

use crate::domain::{
    Banner, BannerFilter, BannerId, CacheKey, Feature, FeatureId, NewBanner, Tag, TagId,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::Result;

// Ports are the pluggable extension points for storage and caching backends

/// Port for the freshness cache sitting in front of the store.
/// Implementations never fail: a broken backend behaves as a miss.
#[async_trait]
pub trait BannerCache: Send + Sync + 'static {
    /// Returns the cached banner only while it is younger than the TTL.
    async fn get(&self, key: CacheKey) -> Option<Banner>;
    /// Unconditionally replaces the entry and restarts its age.
    async fn put(&self, key: CacheKey, banner: Banner);
    /// Drops the entry, reporting whether one was present.
    async fn invalidate(&self, key: CacheKey) -> bool;
}

/// Port for the durable banner store (source of truth).
#[async_trait]
pub trait BannerStore: Send + Sync + 'static {
    /// Current banner addressed by (feature, tag). When several match, the
    /// most recently updated one wins.
    async fn find_by_feature_and_tag(
        &self,
        feature_id: FeatureId,
        tag_id: TagId,
    ) -> Result<Option<Banner>>;

    async fn find_by_id(&self, id: BannerId) -> Result<Option<Banner>>;

    async fn list_filtered(&self, filter: &BannerFilter) -> Result<Vec<Banner>>;

    /// Deletes the banner row; associations follow by cascade.
    async fn delete_banner(&self, id: BannerId) -> Result<bool>;

    /// Opens a unit of work. Dropping it without `commit` discards every step.
    async fn begin(&self) -> Result<Box<dyn BannerTransaction>>;
}

/// Steps of a banner write, applied atomically on `commit`.
#[async_trait]
pub trait BannerTransaction: Send {
    /// The banner as this transaction sees it. Holds the row until the
    /// transaction finishes.
    async fn find_banner(&mut self, id: BannerId) -> Result<Option<Banner>>;

    async fn insert_banner(&mut self, banner: &NewBanner, now: DateTime<Utc>) -> Result<BannerId>;

    async fn insert_tag_association(&mut self, banner_id: BannerId, tag_id: TagId) -> Result<()>;

    async fn delete_tag_associations_for_banner(&mut self, banner_id: BannerId) -> Result<u64>;

    /// Writes feature/content/active/updated_at. Returns false when no row matched.
    async fn update_banner_fields(&mut self, banner: &Banner) -> Result<bool>;

    async fn commit(self: Box<Self>) -> Result<()>;

    async fn rollback(self: Box<Self>) -> Result<()>;
}

/// Port for the named feature and tag dimensions.
#[async_trait]
pub trait CatalogStore: Send + Sync + 'static {
    async fn create_feature(&self, name: &str) -> Result<Feature>;
    async fn create_tag(&self, name: &str) -> Result<Tag>;
}
