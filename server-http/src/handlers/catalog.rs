use crate::api::requests::NameRequest;
use crate::api::responses::{FeatureResponse, TagResponse};
use crate::api::ApiError;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};

/// POST /feature
pub async fn create_feature(
    State(state): State<AppState>,
    body: Result<Json<NameRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<FeatureResponse>), ApiError> {
    let Json(request) = body?;
    let feature = state.admin.create_feature(&request.name).await?;
    Ok((StatusCode::CREATED, Json(feature.into())))
}

/// POST /tag
pub async fn create_tag(
    State(state): State<AppState>,
    body: Result<Json<NameRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TagResponse>), ApiError> {
    let Json(request) = body?;
    let tag = state.admin.create_tag(&request.name).await?;
    Ok((StatusCode::CREATED, Json(tag.into())))
}
