// HTTP handlers for account and session endpoints

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::auth::{
    AuthenticatedUser, BearerToken, LoginRequest, LoginResponse, RefreshResponse, RegisterRequest,
    UpdateUserRequest, UserResponse,
};
use crate::error::ApiError;
use crate::AppState;

/// Register a new user
/// POST /api/users
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid email or password", body = crate::error::ErrorResponse),
        (status = 409, description = "Email already registered", body = crate::error::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::error::ErrorResponse)
    ),
    tag = "users"
)]
pub async fn register_handler(
    State(state): State<AppState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let Json(request) = body?;
    request.validate()?;

    let user = state.auth.register(&request.email, &request.password).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Login a user
/// POST /api/login
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Access and refresh tokens issued", body = LoginResponse),
        (status = 400, description = "Malformed request", body = crate::error::ErrorResponse),
        (status = 401, description = "Incorrect email or password", body = crate::error::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::error::ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login_handler(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(request) = body?;
    request.validate()?;

    let response = state
        .auth
        .login(&request.email, &request.password, request.expires_in_seconds)
        .await?;
    Ok(Json(response))
}

/// Exchange a refresh token for a new access token
/// POST /api/refresh
#[utoipa::path(
    post,
    path = "/api/refresh",
    responses(
        (status = 200, description = "New access token", body = RefreshResponse),
        (status = 401, description = "Missing, unknown or expired refresh token", body = crate::error::ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn refresh_handler(
    State(state): State<AppState>,
    BearerToken(refresh_token): BearerToken,
) -> Result<Json<RefreshResponse>, ApiError> {
    let token = state.auth.refresh_access_token(&refresh_token).await?;
    Ok(Json(RefreshResponse { token }))
}

/// Revoke a refresh token
/// POST /api/revoke
#[utoipa::path(
    post,
    path = "/api/revoke",
    responses(
        (status = 204, description = "Refresh token revoked"),
        (status = 401, description = "Missing or unknown refresh token", body = crate::error::ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn revoke_handler(
    State(state): State<AppState>,
    BearerToken(refresh_token): BearerToken,
) -> Result<StatusCode, ApiError> {
    state.auth.revoke(&refresh_token).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Update the authenticated user's email and password
/// PUT /api/users
#[utoipa::path(
    put,
    path = "/api/users",
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Invalid email or password", body = crate::error::ErrorResponse),
        (status = 401, description = "Missing or invalid access token", body = crate::error::ErrorResponse),
        (status = 404, description = "User no longer exists", body = crate::error::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::error::ErrorResponse)
    ),
    tag = "users"
)]
pub async fn update_user_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    body: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, ApiError> {
    let Json(request) = body?;
    request.validate()?;

    let updated = state
        .auth
        .update_user(user.user_id, &request.email, &request.password)
        .await?;
    Ok(Json(updated))
}
