use async_trait::async_trait;
use banner::auth::{AuthError, NewUser, User, UserRepository};
use banner::domain::{
    Banner, BannerFilter, BannerId, Feature, FeatureId, NewBanner, Tag, TagId,
};
use banner::ports::{BannerStore, BannerTransaction, CatalogStore};
use chrono::{DateTime, Utc};
use shared::{Error, Result};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Clone, Debug)]
struct MemoryState {
    banners: BTreeMap<BannerId, Banner>,
    features: BTreeMap<FeatureId, Feature>,
    tags: BTreeMap<TagId, Tag>,
    next_banner_id: BannerId,
    next_feature_id: FeatureId,
    next_tag_id: TagId,
}

impl Default for MemoryState {
    fn default() -> Self {
        Self {
            banners: BTreeMap::new(),
            features: BTreeMap::new(),
            tags: BTreeMap::new(),
            next_banner_id: 1,
            next_feature_id: 1,
            next_tag_id: 1,
        }
    }
}

impl MemoryState {
    fn ensure_feature(&self, feature_id: FeatureId) -> Result<()> {
        if self.features.contains_key(&feature_id) {
            Ok(())
        } else {
            Err(Error::validation(format!("feature {} does not exist", feature_id)))
        }
    }

    fn ensure_tag(&self, tag_id: TagId) -> Result<()> {
        if self.tags.contains_key(&tag_id) {
            Ok(())
        } else {
            Err(Error::validation(format!("tag {} does not exist", tag_id)))
        }
    }
}

/// Process-local banner store with the same referential rules as the
/// PostgreSQL schema. Used by development setups and tests. Tag ids are
/// kept ascending, as the SQL aggregate returns them.
///
/// A transaction holds the state lock from `begin` until it finishes and
/// works on a private copy, so writes are serialized and a dropped or
/// rolled-back transaction leaves no trace.
#[derive(Clone, Default)]
pub struct MemoryBannerStore {
    state: Arc<Mutex<MemoryState>>,
    fail_tag_insert_at: Arc<AtomicUsize>,
}

impl MemoryBannerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the `n`-th tag association insert (1-based) of every following
    /// transaction fail with a store error. `0` disables the fault.
    pub fn fail_nth_tag_insert(&self, n: usize) {
        self.fail_tag_insert_at.store(n, Ordering::SeqCst);
    }

    pub fn clear_faults(&self) {
        self.fail_nth_tag_insert(0);
    }

    pub async fn banner_count(&self) -> usize {
        self.state.lock().await.banners.len()
    }

    /// Total rows the association relation would hold.
    pub async fn association_count(&self) -> usize {
        self.state
            .lock()
            .await
            .banners
            .values()
            .map(|b| b.tag_ids.len())
            .sum()
    }
}

impl std::fmt::Debug for MemoryBannerStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryBannerStore").finish_non_exhaustive()
    }
}

#[async_trait]
impl BannerStore for MemoryBannerStore {
    async fn find_by_feature_and_tag(
        &self,
        feature_id: FeatureId,
        tag_id: TagId,
    ) -> Result<Option<Banner>> {
        let state = self.state.lock().await;
        Ok(state
            .banners
            .values()
            .filter(|b| b.feature_id == feature_id && b.tag_ids.contains(&tag_id))
            .max_by_key(|b| (b.updated_at, b.id))
            .cloned())
    }

    async fn find_by_id(&self, id: BannerId) -> Result<Option<Banner>> {
        Ok(self.state.lock().await.banners.get(&id).cloned())
    }

    async fn list_filtered(&self, filter: &BannerFilter) -> Result<Vec<Banner>> {
        let state = self.state.lock().await;
        Ok(filter.apply(state.banners.values()))
    }

    async fn delete_banner(&self, id: BannerId) -> Result<bool> {
        Ok(self.state.lock().await.banners.remove(&id).is_some())
    }

    async fn begin(&self) -> Result<Box<dyn BannerTransaction>> {
        let guard = self.state.clone().lock_owned().await;
        let working = (*guard).clone();
        Ok(Box::new(MemoryTransaction {
            guard,
            working,
            fail_tag_insert_at: self.fail_tag_insert_at.load(Ordering::SeqCst),
            tag_inserts: 0,
        }))
    }
}

#[async_trait]
impl CatalogStore for MemoryBannerStore {
    async fn create_feature(&self, name: &str) -> Result<Feature> {
        let mut state = self.state.lock().await;
        if state.features.values().any(|f| f.name == name) {
            return Err(Error::AlreadyExists(format!("feature '{}'", name)));
        }

        let feature = Feature {
            id: state.next_feature_id,
            name: name.to_string(),
        };
        state.next_feature_id += 1;
        state.features.insert(feature.id, feature.clone());
        Ok(feature)
    }

    async fn create_tag(&self, name: &str) -> Result<Tag> {
        let mut state = self.state.lock().await;
        if state.tags.values().any(|t| t.name == name) {
            return Err(Error::AlreadyExists(format!("tag '{}'", name)));
        }

        let tag = Tag {
            id: state.next_tag_id,
            name: name.to_string(),
        };
        state.next_tag_id += 1;
        state.tags.insert(tag.id, tag.clone());
        Ok(tag)
    }
}

struct MemoryTransaction {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
    fail_tag_insert_at: usize,
    tag_inserts: usize,
}

#[async_trait]
impl BannerTransaction for MemoryTransaction {
    async fn find_banner(&mut self, id: BannerId) -> Result<Option<Banner>> {
        Ok(self.working.banners.get(&id).cloned())
    }

    async fn insert_banner(&mut self, banner: &NewBanner, now: DateTime<Utc>) -> Result<BannerId> {
        self.working.ensure_feature(banner.feature_id)?;

        let id = self.working.next_banner_id;
        self.working.next_banner_id += 1;

        let row = Banner {
            tag_ids: Vec::new(),
            ..banner.clone().into_banner(id, now, now)
        };
        self.working.banners.insert(id, row);
        Ok(id)
    }

    async fn insert_tag_association(&mut self, banner_id: BannerId, tag_id: TagId) -> Result<()> {
        self.tag_inserts += 1;
        if self.tag_inserts == self.fail_tag_insert_at {
            return Err(Error::store(format!(
                "injected failure on tag insert #{}",
                self.tag_inserts
            )));
        }

        self.working.ensure_tag(tag_id)?;
        let banner = self
            .working
            .banners
            .get_mut(&banner_id)
            .ok_or_else(|| Error::validation(format!("banner {} does not exist", banner_id)))?;

        match banner.tag_ids.binary_search(&tag_id) {
            Ok(_) => Err(Error::AlreadyExists(format!(
                "banner {} already has tag {}",
                banner_id, tag_id
            ))),
            Err(at) => {
                banner.tag_ids.insert(at, tag_id);
                Ok(())
            }
        }
    }

    async fn delete_tag_associations_for_banner(&mut self, banner_id: BannerId) -> Result<u64> {
        Ok(self
            .working
            .banners
            .get_mut(&banner_id)
            .map(|b| std::mem::take(&mut b.tag_ids).len() as u64)
            .unwrap_or(0))
    }

    async fn update_banner_fields(&mut self, banner: &Banner) -> Result<bool> {
        self.working.ensure_feature(banner.feature_id)?;

        let Some(row) = self.working.banners.get_mut(&banner.id) else {
            return Ok(false);
        };
        row.feature_id = banner.feature_id;
        row.content = banner.content.clone();
        row.is_active = banner.is_active;
        row.updated_at = banner.updated_at;
        Ok(true)
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let MemoryTransaction {
            mut guard, working, ..
        } = *self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

/// Account store kept in process memory.
#[derive(Default)]
pub struct MemoryUserRepository {
    users: Mutex<Vec<User>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create(&self, user: NewUser) -> std::result::Result<User, AuthError> {
        let mut users = self.users.lock().await;
        if users.iter().any(|u| u.username == user.username) {
            return Err(AuthError::UserAlreadyExists);
        }

        let user = user.into_user(users.len() as i64 + 1, Utc::now());
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> std::result::Result<Option<User>, AuthError> {
        let users = self.users.lock().await;
        Ok(users.iter().find(|u| u.username == username).cloned())
    }

    async fn username_exists(&self, username: &str) -> std::result::Result<bool, AuthError> {
        Ok(self.find_by_username(username).await?.is_some())
    }
}
