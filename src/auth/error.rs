// Authentication and account error types

use axum::response::{IntoResponse, Response};

use crate::error::ApiError;
use crate::store::StoreError;

/// Authentication and user-account error types
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Incorrect email or password")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token has expired")]
    ExpiredToken,

    #[error("Missing authentication token")]
    MissingToken,

    #[error("Email already exists")]
    EmailAlreadyExists,

    #[error("User {0} not found")]
    UserNotFound(String),

    #[error("Password hashing error: {0}")]
    PasswordHashError(String),

    #[error("Token generation error: {0}")]
    TokenGenerationError(String),

    #[error(transparent)]
    StorageError(#[from] StoreError),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}
