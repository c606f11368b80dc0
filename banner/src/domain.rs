use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{Error, Result};
use std::collections::HashSet;
use std::fmt;

pub type BannerId = i64;
pub type FeatureId = i64;
pub type TagId = i64;

/// Opaque banner payload. Stored and served verbatim.
pub type BannerContent = serde_json::Map<String, serde_json::Value>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Banner {
    pub id: BannerId,
    pub feature_id: FeatureId,
    pub tag_ids: Vec<TagId>,
    pub content: BannerContent,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Banner {
    /// Every (feature, tag) address this banner is served under.
    pub fn cache_keys(&self) -> impl Iterator<Item = CacheKey> + '_ {
        self.tag_ids
            .iter()
            .map(move |tag_id| CacheKey::new(self.feature_id, *tag_id))
    }
}

/// Banner fields supplied by a writer. Used for both create and full update.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewBanner {
    pub feature_id: FeatureId,
    pub tag_ids: Vec<TagId>,
    pub content: BannerContent,
    pub is_active: bool,
}

impl NewBanner {
    pub fn validate(&self) -> Result<()> {
        ensure_positive("feature_id", self.feature_id)?;

        if self.tag_ids.is_empty() {
            return Err(Error::validation("tag_ids must contain at least one tag"));
        }

        let mut seen = HashSet::with_capacity(self.tag_ids.len());
        for tag_id in &self.tag_ids {
            ensure_positive("tag_ids", *tag_id)?;
            if !seen.insert(*tag_id) {
                return Err(Error::validation(format!(
                    "tag_ids contains {} more than once",
                    tag_id
                )));
            }
        }

        Ok(())
    }

    pub fn into_banner(
        self,
        id: BannerId,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Banner {
        Banner {
            id,
            feature_id: self.feature_id,
            tag_ids: self.tag_ids,
            content: self.content,
            is_active: self.is_active,
            created_at,
            updated_at,
        }
    }
}

/// Optional predicates for the administrative listing. `None` means the
/// clause is left out entirely, never filtered on a default value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BannerFilter {
    pub feature_id: Option<FeatureId>,
    pub tag_id: Option<TagId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl BannerFilter {
    pub fn validate(&self) -> Result<()> {
        if let Some(feature_id) = self.feature_id {
            ensure_positive("feature_id", feature_id)?;
        }
        if let Some(tag_id) = self.tag_id {
            ensure_positive("tag_id", tag_id)?;
        }
        if let Some(limit) = self.limit {
            ensure_non_negative("limit", limit)?;
        }
        if let Some(offset) = self.offset {
            ensure_non_negative("offset", offset)?;
        }
        Ok(())
    }

    /// In-process rendition of the listing semantics: feature equality, tag
    /// membership, id order, then offset and limit.
    pub fn apply<'a, I>(&self, banners: I) -> Vec<Banner>
    where
        I: IntoIterator<Item = &'a Banner>,
    {
        let mut matched: Vec<Banner> = banners
            .into_iter()
            .filter(|b| self.feature_id.is_none_or(|f| b.feature_id == f))
            .filter(|b| self.tag_id.is_none_or(|t| b.tag_ids.contains(&t)))
            .cloned()
            .collect();
        matched.sort_by_key(|b| b.id);

        let offset = self.offset.unwrap_or(0).max(0) as usize;
        let limit = self.limit.map(|l| l.max(0) as usize).unwrap_or(usize::MAX);

        matched.into_iter().skip(offset).take(limit).collect()
    }
}

/// Address of a cached banner. Both halves are kept as separate integers so
/// (1, 23) and (12, 3) can never alias.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    pub feature_id: FeatureId,
    pub tag_id: TagId,
}

impl CacheKey {
    pub fn new(feature_id: FeatureId, tag_id: TagId) -> Self {
        Self { feature_id, tag_id }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.feature_id, self.tag_id)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    pub id: FeatureId,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
}

/// Trims a catalog name and rejects blanks.
pub fn normalize_name(field: &'static str, name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(format!("{} cannot be empty", field)));
    }
    Ok(trimmed.to_string())
}

pub fn ensure_positive(field: &'static str, value: i64) -> Result<()> {
    if value <= 0 {
        return Err(Error::validation(format!(
            "{} must be a positive integer, got {}",
            field, value
        )));
    }
    Ok(())
}

fn ensure_non_negative(field: &'static str, value: i64) -> Result<()> {
    if value < 0 {
        return Err(Error::validation(format!(
            "{} must not be negative, got {}",
            field, value
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn content(title: &str) -> BannerContent {
        match json!({ "title": title }) {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    fn banner(id: BannerId, feature_id: FeatureId, tag_ids: &[TagId]) -> Banner {
        let now = Utc::now();
        Banner {
            id,
            feature_id,
            tag_ids: tag_ids.to_vec(),
            content: content("x"),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_cache_keys_do_not_alias() {
        let a = CacheKey::new(1, 23);
        let b = CacheKey::new(12, 3);

        assert_ne!(a, b);
        assert_ne!(a.to_string(), b.to_string());
        assert_eq!(a.to_string(), "1-23");
    }

    #[test]
    fn test_new_banner_validation() {
        let ok = NewBanner {
            feature_id: 1,
            tag_ids: vec![1, 2],
            content: content("a"),
            is_active: true,
        };
        assert!(ok.validate().is_ok());

        let no_tags = NewBanner {
            tag_ids: vec![],
            ..ok.clone()
        };
        assert!(matches!(no_tags.validate(), Err(Error::Validation(_))));

        let duplicate = NewBanner {
            tag_ids: vec![3, 3],
            ..ok.clone()
        };
        assert!(matches!(duplicate.validate(), Err(Error::Validation(_))));

        let bad_feature = NewBanner {
            feature_id: 0,
            ..ok
        };
        assert!(matches!(bad_feature.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_filter_validation_rejects_negative_paging() {
        let filter = BannerFilter {
            limit: Some(-1),
            ..Default::default()
        };
        assert!(filter.validate().is_err());

        let filter = BannerFilter {
            offset: Some(0),
            limit: Some(0),
            ..Default::default()
        };
        assert!(filter.validate().is_ok());
    }

    #[test]
    fn test_filter_apply() {
        let banners = vec![
            banner(3, 5, &[9]),
            banner(1, 5, &[1, 2]),
            banner(2, 6, &[9, 4]),
            banner(4, 7, &[8]),
        ];

        let by_feature = BannerFilter {
            feature_id: Some(5),
            ..Default::default()
        }
        .apply(&banners);
        assert_eq!(by_feature.iter().map(|b| b.id).collect::<Vec<_>>(), vec![1, 3]);

        let by_tag = BannerFilter {
            tag_id: Some(9),
            ..Default::default()
        }
        .apply(&banners);
        assert_eq!(by_tag.iter().map(|b| b.id).collect::<Vec<_>>(), vec![2, 3]);

        let paged = BannerFilter {
            limit: Some(2),
            offset: Some(1),
            ..Default::default()
        }
        .apply(&banners);
        assert_eq!(paged.iter().map(|b| b.id).collect::<Vec<_>>(), vec![2, 3]);

        assert_eq!(BannerFilter::default().apply(&banners).len(), 4);
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("name", "  promo ").unwrap(), "promo");
        assert!(normalize_name("name", "   ").is_err());
    }
}
