use crate::api::requests::CredentialsRequest;
use crate::api::responses::{LoginResponse, RegisterResponse};
use crate::api::ApiError;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Json,
};
use tracing::info;

/// POST /register
///
/// Creates a `user`-role account: {"username": "...", "password": "..."}
pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let Json(request) = body?;

    let user = state
        .auth
        .register(&request.username, &request.password)
        .await?;

    info!(user_id = user.id, "Registered user '{}'", user.username);
    Ok((StatusCode::CREATED, Json(RegisterResponse::from(user))))
}

/// POST /login
///
/// Exchanges credentials for a bearer token.
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(request) = body?;

    let session = state
        .auth
        .login(&request.username, &request.password)
        .await?;

    info!(user_id = session.user.id, "User '{}' logged in", session.user.username);
    Ok(Json(LoginResponse::from(session)))
}
