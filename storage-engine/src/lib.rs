use banner::clock::Clock;
use banner::ports::BannerCache;
use shared::config::CacheBackendKind;
use std::sync::Arc;

pub mod locked_cache;
pub mod memory_store;
pub mod moka_cache;
pub mod postgres;

pub use locked_cache::{DEFAULT_CACHE_TTL, LockedBannerCache};
pub use memory_store::{MemoryBannerStore, MemoryUserRepository};
pub use moka_cache::MokaBannerCache;

/// Builds the freshness cache selected by configuration.
pub fn build_cache(kind: CacheBackendKind, clock: Arc<dyn Clock>) -> Arc<dyn BannerCache> {
    match kind {
        CacheBackendKind::Locked => {
            tracing::info!("Using lock-guarded banner cache (ttl {:?})", DEFAULT_CACHE_TTL);
            Arc::new(LockedBannerCache::new(DEFAULT_CACHE_TTL, clock))
        }
        CacheBackendKind::Moka => {
            tracing::info!("Using moka banner cache (ttl {:?})", DEFAULT_CACHE_TTL);
            Arc::new(MokaBannerCache::new(DEFAULT_CACHE_TTL))
        }
    }
}
