use banner::auth::{AuthService, TokenIssuer, UserRepository};
use banner::planes::control::{BannerAdminOperations, BannerAdminService, CacheWritePolicy};
use banner::planes::data::{BannerReadOperations, BannerReadService};
use banner::ports::{BannerCache, BannerStore, CatalogStore};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub reads: Arc<dyn BannerReadOperations>,
    pub admin: Arc<dyn BannerAdminOperations>,
    pub auth: Arc<AuthService>,
}

impl AppState {
    pub fn new(
        reads: Arc<dyn BannerReadOperations>,
        admin: Arc<dyn BannerAdminOperations>,
        auth: Arc<AuthService>,
    ) -> Self {
        Self { reads, admin, auth }
    }

    /// Wires both planes over one store and one cache.
    pub fn from_components<S>(
        store: Arc<S>,
        users: Arc<dyn UserRepository>,
        cache: Arc<dyn BannerCache>,
        tokens: TokenIssuer,
        cache_policy: CacheWritePolicy,
    ) -> Self
    where
        S: BannerStore + CatalogStore,
    {
        let banners: Arc<dyn BannerStore> = store.clone();
        let catalog: Arc<dyn CatalogStore> = store;

        let reads = BannerReadService::new(banners.clone(), cache.clone());
        let admin =
            BannerAdminService::new(banners, catalog, cache).with_cache_policy(cache_policy);
        let auth = AuthService::new(users, tokens);

        Self::new(Arc::new(reads), Arc::new(admin), Arc::new(auth))
    }
}
