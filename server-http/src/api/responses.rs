use banner::auth::{Session, User};
use banner::domain::{Banner, BannerContent, BannerId, Feature, FeatureId, Tag, TagId};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user_id: i64,
    pub name: String,
    pub role: String,
}

impl From<User> for RegisterResponse {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id,
            name: user.username,
            role: user.role.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user_id: i64,
    pub name: String,
    pub role: String,
}

impl From<Session> for LoginResponse {
    fn from(session: Session) -> Self {
        Self {
            token: session.token.token,
            token_type: "Bearer".to_string(),
            expires_in: session.token.expires_in,
            user_id: session.user.id,
            name: session.user.username,
            role: session.user.role.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BannerResponse {
    pub banner_id: BannerId,
    pub feature_id: FeatureId,
    pub tag_ids: Vec<TagId>,
    pub content: BannerContent,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Banner> for BannerResponse {
    fn from(banner: Banner) -> Self {
        Self {
            banner_id: banner.id,
            feature_id: banner.feature_id,
            tag_ids: banner.tag_ids,
            content: banner.content,
            is_active: banner.is_active,
            created_at: banner.created_at,
            updated_at: banner.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BannerCreatedResponse {
    pub banner_id: BannerId,
}

#[derive(Debug, Serialize)]
pub struct FeatureResponse {
    pub feature_id: FeatureId,
    pub name: String,
}

impl From<Feature> for FeatureResponse {
    fn from(feature: Feature) -> Self {
        Self {
            feature_id: feature.id,
            name: feature.name,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TagResponse {
    pub tag_id: TagId,
    pub name: String,
}

impl From<Tag> for TagResponse {
    fn from(tag: Tag) -> Self {
        Self {
            tag_id: tag.id,
            name: tag.name,
        }
    }
}

// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
