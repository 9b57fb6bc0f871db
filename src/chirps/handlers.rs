// HTTP handlers for chirp endpoints

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};

use crate::auth::AuthenticatedUser;
use crate::chirps::{Chirp, CreateChirpRequest, ListChirpsQuery};
use crate::error::ApiError;
use crate::AppState;

/// Handler for POST /api/chirps
/// Creates a chirp authored by the authenticated user
#[utoipa::path(
    post,
    path = "/api/chirps",
    request_body = CreateChirpRequest,
    responses(
        (status = 201, description = "Chirp created", body = Chirp),
        (status = 400, description = "Body missing or longer than 140 characters", body = crate::error::ErrorResponse),
        (status = 401, description = "Missing or invalid access token", body = crate::error::ErrorResponse),
        (status = 404, description = "Author no longer exists", body = crate::error::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::error::ErrorResponse)
    ),
    tag = "chirps"
)]
pub async fn create_chirp_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    body: Result<Json<CreateChirpRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Chirp>), ApiError> {
    let Json(request) = body?;

    let chirp = state.chirps.create(&request.body, user.user_id).await?;
    Ok((StatusCode::CREATED, Json(chirp)))
}

/// Handler for GET /api/chirps
/// Lists chirps, optionally filtered by author and sorted by id
#[utoipa::path(
    get,
    path = "/api/chirps",
    params(ListChirpsQuery),
    responses(
        (status = 200, description = "Chirps ordered by id", body = Vec<Chirp>),
        (status = 400, description = "Invalid author_id or sort", body = crate::error::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::error::ErrorResponse)
    ),
    tag = "chirps"
)]
pub async fn list_chirps_handler(
    State(state): State<AppState>,
    query: Result<Query<ListChirpsQuery>, QueryRejection>,
) -> Result<Json<Vec<Chirp>>, ApiError> {
    let Query(query) = query?;
    let (filter, order) = query.into_parts()?;

    let chirps = state.chirps.list(filter, order).await?;
    Ok(Json(chirps))
}

/// Handler for GET /api/chirps/{chirp_id}
#[utoipa::path(
    get,
    path = "/api/chirps/{chirp_id}",
    params(
        ("chirp_id" = i32, Path, description = "Chirp ID")
    ),
    responses(
        (status = 200, description = "Chirp found", body = Chirp),
        (status = 400, description = "Chirp ID is not an integer", body = crate::error::ErrorResponse),
        (status = 404, description = "Chirp not found", body = crate::error::ErrorResponse)
    ),
    tag = "chirps"
)]
pub async fn get_chirp_handler(
    State(state): State<AppState>,
    chirp_id: Result<Path<i32>, PathRejection>,
) -> Result<Json<Chirp>, ApiError> {
    let Path(chirp_id) = chirp_id?;

    let chirp = state.chirps.get(chirp_id).await?;
    Ok(Json(chirp))
}

/// Handler for DELETE /api/chirps/{chirp_id}
/// Only the author may delete a chirp
#[utoipa::path(
    delete,
    path = "/api/chirps/{chirp_id}",
    params(
        ("chirp_id" = i32, Path, description = "Chirp ID")
    ),
    responses(
        (status = 204, description = "Chirp deleted"),
        (status = 400, description = "Chirp ID is not an integer", body = crate::error::ErrorResponse),
        (status = 401, description = "Missing or invalid access token", body = crate::error::ErrorResponse),
        (status = 403, description = "Requester is not the author", body = crate::error::ErrorResponse),
        (status = 404, description = "Chirp not found", body = crate::error::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::error::ErrorResponse)
    ),
    tag = "chirps"
)]
pub async fn delete_chirp_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    chirp_id: Result<Path<i32>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(chirp_id) = chirp_id?;

    state.chirps.delete(chirp_id, user.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
