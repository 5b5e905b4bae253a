use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use chirpy_auth::{CredentialError, TokenError};
use chirpy_db::StoreError;
use chirpy_types::api::ErrorResponse;

/// What a handler can fail with. Rendered as `{"error": "..."}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("{0}")]
    Forbidden(&'static str),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Something went wrong")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(msg) => ApiError::BadRequest(msg),
            StoreError::Conflict(msg) => ApiError::Conflict(msg),
            StoreError::NotFound(what) => ApiError::NotFound(format!("{} not found", what)),
            StoreError::Forbidden => {
                ApiError::Forbidden("You are not authorized to modify this resource")
            }
            StoreError::InvalidToken | StoreError::ExpiredToken => {
                ApiError::Unauthorized("Invalid or expired refresh token")
            }
            StoreError::CredentialsChanged => ApiError::Unauthorized("Invalid email or password"),
            e @ (StoreError::Read(_)
            | StoreError::Write(_)
            | StoreError::Hash
            | StoreError::IdsExhausted(_)
            | StoreError::Io(_)) => {
                error!("Store failure: {}", e);
                ApiError::Internal
            }
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid | TokenError::Expired => {
                ApiError::Unauthorized("Invalid or expired token")
            }
            TokenError::Sign(e) => {
                error!("Token signing failed: {}", e);
                ApiError::Internal
            }
        }
    }
}

impl From<CredentialError> for ApiError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::NoMatch => ApiError::Unauthorized("Invalid email or password"),
            CredentialError::Hash => {
                error!("Password hashing failed");
                ApiError::Internal
            }
        }
    }
}
