use crate::api::responses::ErrorResponse;
use crate::validation::ValidationError;
use axum::{
    extract::rejection::JsonRejection,
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use banner::auth::AuthError;
use tracing::{error, warn};

const INTERNAL_MESSAGE: &str = "Internal server error";

/// Handler failure rendered as `{"error": "..."}` with a matching status.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    fn internal(detail: impl std::fmt::Display) -> Self {
        error!("Request failed: {}", detail);
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse::new(self.message));
        if self.status == StatusCode::UNAUTHORIZED {
            return (self.status, [(header::WWW_AUTHENTICATE, "Bearer")], body).into_response();
        }
        (self.status, body).into_response()
    }
}

impl From<shared::Error> for ApiError {
    fn from(err: shared::Error) -> Self {
        match err {
            shared::Error::NotFound => Self::new(StatusCode::NOT_FOUND, "Banner not found"),
            shared::Error::Validation(message) => Self::bad_request(message),
            shared::Error::AlreadyExists(what) => {
                Self::new(StatusCode::CONFLICT, format!("Already exists: {}", what))
            }
            shared::Error::Store(_) | shared::Error::Internal(_) => Self::internal(err),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials
            | AuthError::MissingToken
            | AuthError::InvalidToken(_)
            | AuthError::TokenExpired => {
                warn!("Authentication failed: {}", err);
                Self::unauthorized(err.to_string())
            }
            AuthError::PermissionDenied => Self::forbidden(err.to_string()),
            AuthError::UserAlreadyExists => Self::new(StatusCode::CONFLICT, err.to_string()),
            AuthError::InvalidUsername(_) | AuthError::WeakPassword => {
                Self::bad_request(err.to_string())
            }
            AuthError::StorageError(_)
            | AuthError::PasswordHashError(_)
            | AuthError::TokenSigningError(_) => Self::internal(err),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}
