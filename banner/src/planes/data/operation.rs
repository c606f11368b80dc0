use crate::domain::{BannerContent, FeatureId, TagId};
use async_trait::async_trait;
use shared::Result;

/// User-facing read path: content addressed by (feature, tag)
#[async_trait]
pub trait BannerReadOperations: Send + Sync + 'static {
    /// `force_fresh` skips the cache and reads the store, then republishes.
    async fn get_user_banner(
        &self,
        feature_id: FeatureId,
        tag_id: TagId,
        force_fresh: bool,
    ) -> Result<BannerContent>;
}
