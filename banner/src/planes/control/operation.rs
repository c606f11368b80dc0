use async_trait::async_trait;

use shared::Result;

use crate::domain::{Banner, BannerFilter, BannerId, Feature, NewBanner, Tag};

/// Administrative banner management: listing, writes and the catalog
#[async_trait]
pub trait BannerAdminOperations: Send + Sync + 'static {
    async fn list_banners(&self, filter: BannerFilter) -> Result<Vec<Banner>>;
    async fn create_banner(&self, banner: NewBanner) -> Result<Banner>;
    async fn update_banner(&self, id: BannerId, banner: NewBanner) -> Result<Banner>;
    async fn delete_banner(&self, id: BannerId) -> Result<()>;
    async fn create_feature(&self, name: &str) -> Result<Feature>;
    async fn create_tag(&self, name: &str) -> Result<Tag>;
}
