use banner::domain::{BannerContent, FeatureId, NewBanner, TagId};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

/// Body for both `POST /banner` and `PATCH /banner/{id}`.
#[derive(Debug, Deserialize)]
pub struct BannerRequest {
    pub feature_id: FeatureId,
    pub tag_ids: Vec<TagId>,
    pub content: BannerContent,
    #[serde(default = "default_is_active")]
    pub is_active: bool,
}

fn default_is_active() -> bool {
    true
}

impl From<BannerRequest> for NewBanner {
    fn from(request: BannerRequest) -> Self {
        NewBanner {
            feature_id: request.feature_id,
            tag_ids: request.tag_ids,
            content: request.content,
            is_active: request.is_active,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct NameRequest {
    pub name: String,
}

// === Query strings ===
// Kept as raw strings so malformed numbers get our own 400 body.

#[derive(Debug, Default, Deserialize)]
pub struct UserBannerQuery {
    pub feature_id: Option<String>,
    pub tag_id: Option<String>,
    pub use_last_revision: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListBannersQuery {
    pub feature_id: Option<String>,
    pub tag_id: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banner_request_defaults_to_active() {
        let request: BannerRequest = serde_json::from_str(
            r#"{"feature_id": 1, "tag_ids": [2, 3], "content": {"title": "hi"}}"#,
        )
        .unwrap();

        assert!(request.is_active);
        let banner = NewBanner::from(request);
        assert_eq!(banner.tag_ids, vec![2, 3]);
        assert_eq!(banner.content["title"], "hi");
    }

    #[test]
    fn test_banner_request_rejects_non_object_content() {
        let result = serde_json::from_str::<BannerRequest>(
            r#"{"feature_id": 1, "tag_ids": [2], "content": "text"}"#,
        );
        assert!(result.is_err());
    }
}
