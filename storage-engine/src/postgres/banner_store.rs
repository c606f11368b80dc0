use super::map_sqlx_error;
use super::query::{BANNER_COLUMNS, BannerQuery};
use async_trait::async_trait;
use banner::domain::{
    Banner, BannerContent, BannerFilter, BannerId, Feature, FeatureId, NewBanner, Tag, TagId,
};
use banner::ports::{BannerStore, BannerTransaction, CatalogStore};
use chrono::{DateTime, Utc};
use shared::{Error, Result};
use sqlx::types::Json;
use sqlx::{FromRow, PgConnection, PgPool, Postgres, Transaction};

const FIND_BY_FEATURE_AND_TAG: &str = "SELECT b.id, b.feature_id, b.content, b.is_active, \
     b.created_at, b.updated_at, \
     COALESCE(array_agg(bt.tag_id ORDER BY bt.tag_id) FILTER (WHERE bt.tag_id IS NOT NULL), '{}') \
     AS tag_ids \
     FROM banners b \
     JOIN banner_tags hit ON hit.banner_id = b.id AND hit.tag_id = $2 \
     LEFT JOIN banner_tags bt ON bt.banner_id = b.id \
     WHERE b.feature_id = $1 \
     GROUP BY b.id \
     ORDER BY b.updated_at DESC, b.id DESC \
     LIMIT 1";

#[derive(Debug, FromRow)]
struct BannerRow {
    id: i64,
    feature_id: i64,
    tag_ids: Vec<i64>,
    content: Json<BannerContent>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<BannerRow> for Banner {
    fn from(row: BannerRow) -> Self {
        Banner {
            id: row.id,
            feature_id: row.feature_id,
            tag_ids: row.tag_ids,
            content: row.content.0,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Banner and catalog store backed by PostgreSQL.
#[derive(Clone, Debug)]
pub struct PgBannerStore {
    pool: PgPool,
}

impl PgBannerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BannerStore for PgBannerStore {
    async fn find_by_feature_and_tag(
        &self,
        feature_id: FeatureId,
        tag_id: TagId,
    ) -> Result<Option<Banner>> {
        let row = sqlx::query_as::<_, BannerRow>(FIND_BY_FEATURE_AND_TAG)
            .bind(feature_id)
            .bind(tag_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(row.map(Banner::from))
    }

    async fn find_by_id(&self, id: BannerId) -> Result<Option<Banner>> {
        let sql = format!("{} WHERE b.id = $1 GROUP BY b.id", BANNER_COLUMNS);
        let row = sqlx::query_as::<_, BannerRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(row.map(Banner::from))
    }

    async fn list_filtered(&self, filter: &BannerFilter) -> Result<Vec<Banner>> {
        let built = BannerQuery::for_filter(filter);
        tracing::debug!(sql = %built, params = ?built.params, "Listing banners");

        let mut query = sqlx::query_as::<_, BannerRow>(&built.sql);
        for param in &built.params {
            query = query.bind(*param);
        }

        let rows = query.fetch_all(&self.pool).await.map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(Banner::from).collect())
    }

    async fn delete_banner(&self, id: BannerId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM banners WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn begin(&self) -> Result<Box<dyn BannerTransaction>> {
        let tx = self.pool.begin().await.map_err(map_sqlx_error)?;
        Ok(Box::new(PgBannerTransaction { tx: Some(tx) }))
    }
}

#[async_trait]
impl CatalogStore for PgBannerStore {
    async fn create_feature(&self, name: &str) -> Result<Feature> {
        let id: i64 = sqlx::query_scalar("INSERT INTO features (name) VALUES ($1) RETURNING id")
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(Feature {
            id,
            name: name.to_string(),
        })
    }

    async fn create_tag(&self, name: &str) -> Result<Tag> {
        let id: i64 = sqlx::query_scalar("INSERT INTO tags (name) VALUES ($1) RETURNING id")
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(Tag {
            id,
            name: name.to_string(),
        })
    }
}

/// Open database transaction. sqlx rolls back on drop if neither
/// `commit` nor `rollback` ran.
pub struct PgBannerTransaction {
    tx: Option<Transaction<'static, Postgres>>,
}

impl PgBannerTransaction {
    fn conn(&mut self) -> Result<&mut PgConnection> {
        self.tx
            .as_deref_mut()
            .ok_or_else(|| Error::Internal("transaction already finished".to_string()))
    }
}

#[async_trait]
impl BannerTransaction for PgBannerTransaction {
    async fn find_banner(&mut self, id: BannerId) -> Result<Option<Banner>> {
        // Row lock first; FOR UPDATE is not allowed next to the aggregate.
        let locked: Option<i64> =
            sqlx::query_scalar("SELECT id FROM banners WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(self.conn()?)
                .await
                .map_err(map_sqlx_error)?;
        if locked.is_none() {
            return Ok(None);
        }

        let sql = format!("{} WHERE b.id = $1 GROUP BY b.id", BANNER_COLUMNS);
        let row = sqlx::query_as::<_, BannerRow>(&sql)
            .bind(id)
            .fetch_optional(self.conn()?)
            .await
            .map_err(map_sqlx_error)?;
        Ok(row.map(Banner::from))
    }

    async fn insert_banner(&mut self, banner: &NewBanner, now: DateTime<Utc>) -> Result<BannerId> {
        sqlx::query_scalar(
            "INSERT INTO banners (feature_id, content, is_active, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $4) RETURNING id",
        )
        .bind(banner.feature_id)
        .bind(Json(&banner.content))
        .bind(banner.is_active)
        .bind(now)
        .fetch_one(self.conn()?)
        .await
        .map_err(map_sqlx_error)
    }

    async fn insert_tag_association(&mut self, banner_id: BannerId, tag_id: TagId) -> Result<()> {
        sqlx::query("INSERT INTO banner_tags (banner_id, tag_id) VALUES ($1, $2)")
            .bind(banner_id)
            .bind(tag_id)
            .execute(self.conn()?)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn delete_tag_associations_for_banner(&mut self, banner_id: BannerId) -> Result<u64> {
        let result = sqlx::query("DELETE FROM banner_tags WHERE banner_id = $1")
            .bind(banner_id)
            .execute(self.conn()?)
            .await
            .map_err(map_sqlx_error)?;
        Ok(result.rows_affected())
    }

    async fn update_banner_fields(&mut self, banner: &Banner) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE banners SET feature_id = $2, content = $3, is_active = $4, updated_at = $5 \
             WHERE id = $1",
        )
        .bind(banner.id)
        .bind(banner.feature_id)
        .bind(Json(&banner.content))
        .bind(banner.is_active)
        .bind(banner.updated_at)
        .execute(self.conn()?)
        .await
        .map_err(map_sqlx_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn commit(mut self: Box<Self>) -> Result<()> {
        if let Some(tx) = self.tx.take() {
            tx.commit()
                .await
                .map_err(|e| Error::store(format!("failed to commit transaction: {}", e)))?;
            tracing::debug!("Transaction committed");
        }
        Ok(())
    }

    async fn rollback(mut self: Box<Self>) -> Result<()> {
        if let Some(tx) = self.tx.take() {
            tx.rollback()
                .await
                .map_err(|e| Error::store(format!("failed to roll back transaction: {}", e)))?;
            tracing::debug!("Transaction rolled back");
        }
        Ok(())
    }
}
