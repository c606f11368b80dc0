use crate::api::ApiError;
use crate::middleware::authentication::get_principal;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use banner::auth::{AuthService, Role};
use std::sync::Arc;

/// Admit only admin principals. Must run after `auth_middleware`.
pub async fn require_admin(
    State(auth_service): State<Arc<AuthService>>,
    request: Request,
    next: Next,
) -> Result<Response, Response> {
    let principal = get_principal(&request)
        .ok_or_else(|| ApiError::unauthorized("Authentication required").into_response())?;

    if let Err(e) = auth_service.authorize(principal, Role::Admin) {
        tracing::warn!(user_id = principal.user_id, "Admin route refused");
        return Err(ApiError::from(e).into_response());
    }

    Ok(next.run(request).await)
}
