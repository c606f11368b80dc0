//! Query-string parsing for the banner endpoints.

use crate::api::requests::{ListBannersQuery, UserBannerQuery};
use banner::domain::{BannerFilter, BannerId, FeatureId, TagId};

#[derive(Debug, PartialEq, Eq)]
pub enum ValidationError {
    MissingParameter(&'static str),
    NotAnInteger { field: &'static str, value: String },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::MissingParameter(field) => {
                write!(f, "Missing required parameter '{}'", field)
            }
            ValidationError::NotAnInteger { field, value } => {
                write!(f, "Parameter '{}' must be an integer, got '{}'", field, value)
            }
        }
    }
}

/// Validated input of `GET /user_banner`. Range checks stay with the
/// read service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserBannerParams {
    pub feature_id: FeatureId,
    pub tag_id: TagId,
    pub use_last_revision: bool,
}

impl TryFrom<UserBannerQuery> for UserBannerParams {
    type Error = ValidationError;

    fn try_from(query: UserBannerQuery) -> Result<Self, Self::Error> {
        let feature_id = optional_integer("feature_id", query.feature_id.as_deref())?
            .ok_or(ValidationError::MissingParameter("feature_id"))?;
        let tag_id = optional_integer("tag_id", query.tag_id.as_deref())?
            .ok_or(ValidationError::MissingParameter("tag_id"))?;

        Ok(Self {
            feature_id,
            tag_id,
            use_last_revision: parse_use_last_revision(query.use_last_revision.as_deref()),
        })
    }
}

impl TryFrom<ListBannersQuery> for BannerFilter {
    type Error = ValidationError;

    fn try_from(query: ListBannersQuery) -> Result<Self, Self::Error> {
        Ok(BannerFilter {
            feature_id: optional_integer("feature_id", query.feature_id.as_deref())?,
            tag_id: optional_integer("tag_id", query.tag_id.as_deref())?,
            limit: optional_integer("limit", query.limit.as_deref())?,
            offset: optional_integer("offset", query.offset.as_deref())?,
        })
    }
}

pub fn parse_banner_id(raw: &str) -> Result<BannerId, ValidationError> {
    raw.trim()
        .parse()
        .map_err(|_| ValidationError::NotAnInteger {
            field: "id",
            value: raw.to_string(),
        })
}

/// `true`/`1` request a fresh read; anything else, absence included, does not.
pub fn parse_use_last_revision(raw: Option<&str>) -> bool {
    match raw.map(str::trim) {
        Some(value) => value.eq_ignore_ascii_case("true") || value == "1",
        None => false,
    }
}

/// An empty value counts as absent.
fn optional_integer(field: &'static str, raw: Option<&str>) -> Result<Option<i64>, ValidationError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| ValidationError::NotAnInteger {
                field,
                value: value.to_string(),
            }),
    }
}
