use crate::api::ApiError;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use banner::auth::{AuthError, AuthService, Principal};
use std::sync::Arc;

/// Extract the token from `Authorization: Bearer <token>`
fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    let mut parts = auth_header.split_whitespace();
    let scheme = parts.next()?;
    let token = parts.next()?;

    if !scheme.eq_ignore_ascii_case("Bearer") || parts.next().is_some() {
        return None;
    }
    Some(token)
}

/// Authentication middleware. Verifies the bearer token and attaches the
/// resulting `Principal` to the request.
pub async fn auth_middleware(
    State(auth_service): State<Arc<AuthService>>,
    mut request: Request,
    next: Next,
) -> Result<Response, Response> {
    let principal = {
        let auth_header = request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| ApiError::from(AuthError::MissingToken).into_response())?;

        let token = extract_bearer_token(auth_header).ok_or_else(|| {
            ApiError::unauthorized("Invalid Authorization header format").into_response()
        })?;

        auth_service
            .verify(token)
            .map_err(|e| ApiError::from(e).into_response())?
    };

    tracing::debug!(user_id = principal.user_id, role = %principal.role, "Request authenticated");
    request.extensions_mut().insert(principal);

    Ok(next.run(request).await)
}

/// Extract the verified principal from request extensions
pub fn get_principal(request: &Request) -> Option<&Principal> {
    request.extensions().get::<Principal>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(extract_bearer_token("bearer abc"), Some("abc"));

        assert!(extract_bearer_token("Basic YWRtaW46cGFzcw==").is_none());
        assert!(extract_bearer_token("Bearer").is_none());
        assert!(extract_bearer_token("Bearer a b").is_none());
        assert!(extract_bearer_token("abc").is_none());
    }
}
