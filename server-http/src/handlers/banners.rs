use crate::api::requests::{BannerRequest, ListBannersQuery};
use crate::api::responses::{BannerCreatedResponse, BannerResponse};
use crate::api::ApiError;
use crate::state::AppState;
use crate::validation::parse_banner_id;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use banner::auth::Principal;
use banner::domain::BannerFilter;
use tracing::info;

/// GET /banner?feature_id=&tag_id=&limit=&offset=
pub async fn list_banners(
    State(state): State<AppState>,
    Query(query): Query<ListBannersQuery>,
) -> Result<Json<Vec<BannerResponse>>, ApiError> {
    let filter = BannerFilter::try_from(query)?;
    let banners = state.admin.list_banners(filter).await?;

    Ok(Json(banners.into_iter().map(BannerResponse::from).collect()))
}

/// POST /banner
pub async fn create_banner(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    body: Result<Json<BannerRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<BannerCreatedResponse>), ApiError> {
    let Json(request) = body?;

    let banner = state.admin.create_banner(request.into()).await?;

    info!(user_id = principal.user_id, banner_id = banner.id, "Banner created");
    Ok((
        StatusCode::CREATED,
        Json(BannerCreatedResponse {
            banner_id: banner.id,
        }),
    ))
}

/// PATCH /banner/{id}
///
/// Full replacement of the banner fields and its tag set.
pub async fn update_banner(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    body: Result<Json<BannerRequest>, JsonRejection>,
) -> Result<Json<BannerResponse>, ApiError> {
    let id = parse_banner_id(&id)?;
    let Json(request) = body?;

    let banner = state.admin.update_banner(id, request.into()).await?;

    info!(user_id = principal.user_id, banner_id = banner.id, "Banner updated");
    Ok(Json(BannerResponse::from(banner)))
}

/// DELETE /banner/{id}
pub async fn delete_banner(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_banner_id(&id)?;

    state.admin.delete_banner(id).await?;

    info!(user_id = principal.user_id, banner_id = id, "Banner deleted");
    Ok(StatusCode::NO_CONTENT)
}
