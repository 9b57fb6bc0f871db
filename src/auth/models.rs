// Authentication data models and DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// User record as stored in the document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub hashed_password: String,
    #[serde(default)]
    pub is_chirpy_red: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<StoredRefreshToken>,
}

/// The single live refresh token of a user.
/// Only the SHA-256 digest of the token is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRefreshToken {
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
}

/// Refresh token handed to the client at login
#[derive(Debug, Clone)]
pub struct IssuedRefreshToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// User response model (excludes password and token material)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "walt@breakingbad.com")]
    pub email: String,
    #[schema(example = false)]
    pub is_chirpy_red: bool,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            is_chirpy_red: user.is_chirpy_red,
        }
    }
}

/// Registration request DTO
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(email(message = "Email must be a valid address"))]
    #[schema(example = "walt@breakingbad.com")]
    pub email: String,
    #[validate(length(min = 1, message = "Password must not be empty"))]
    #[schema(example = "04234")]
    pub password: String,
}

/// Profile update request DTO (PUT /api/users)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[validate(email(message = "Email must be a valid address"))]
    #[schema(example = "walter@breakingbad.com")]
    pub email: String,
    #[validate(length(min = 1, message = "Password must not be empty"))]
    #[schema(example = "losPollosHermanos")]
    pub password: String,
}

/// Login request DTO
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Email must not be empty"))]
    pub email: String,
    pub password: String,
    /// Requested access token lifetime; values above one hour are clamped
    #[serde(default)]
    #[schema(example = 3600)]
    pub expires_in_seconds: Option<i64>,
}

/// Login response DTO
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub id: i32,
    pub email: String,
    pub is_chirpy_red: bool,
    /// Signed access token (JWT)
    pub token: String,
    /// Opaque refresh token, valid for 60 days
    pub refresh_token: String,
}

/// Response of POST /api/refresh
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RefreshResponse {
    pub token: String,
}
