use crate::api::requests::UserBannerQuery;
use crate::api::ApiError;
use crate::state::AppState;
use crate::validation::UserBannerParams;
use axum::{
    extract::{Query, State},
    Json,
};
use banner::domain::BannerContent;

/// GET /user_banner?feature_id=&tag_id=&use_last_revision=
///
/// Returns the stored content object only. Served from cache unless
/// `use_last_revision` asks for a fresh read.
pub async fn get_user_banner(
    State(state): State<AppState>,
    Query(query): Query<UserBannerQuery>,
) -> Result<Json<BannerContent>, ApiError> {
    let params = UserBannerParams::try_from(query)?;

    let content = state
        .reads
        .get_user_banner(params.feature_id, params.tag_id, params.use_last_revision)
        .await?;

    Ok(Json(content))
}
