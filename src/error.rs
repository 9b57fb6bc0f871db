// Error handling module for the Chirpy API
// Provides the HTTP-facing error type and its JSON response format

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, error, warn};
use utoipa::ToSchema;

use crate::auth::AuthError;
use crate::chirps::ChirpError;
use crate::store::StoreError;

/// Main error type for the API
/// All handlers return Result<T, ApiError>
///
/// Each variant maps to a fixed HTTP status code. Domain errors
/// (`AuthError`, `ChirpError`, `StoreError`) convert into it with `?`.
#[derive(Debug)]
pub enum ApiError {
    /// Request DTO validation failures
    /// Maps to HTTP 400 Bad Request
    ValidationError(validator::ValidationErrors),

    /// Undecodable body, path or query, and domain validation failures
    /// Maps to HTTP 400 Bad Request
    BadRequest(String),

    /// Resource not found by ID
    /// Maps to HTTP 404 Not Found
    NotFound { resource: String, id: String },

    /// Duplicate resource conflict
    /// Maps to HTTP 409 Conflict
    Conflict { message: String },

    /// Document store read/write/parse failures
    /// Maps to HTTP 500; details are only logged
    StorageError(StoreError),

    /// Internal server errors
    /// Maps to HTTP 500; details are only logged
    InternalError(String),

    /// Authentication failures
    /// Maps to HTTP 401 Unauthorized
    Unauthorized(String),

    /// Authorization failures
    /// Maps to HTTP 403 Forbidden
    Forbidden(String),
}

/// Consistent error response structure
///
/// Machine-readable `error_code` plus a human-readable `message`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Machine-readable error code (e.g., "VALIDATION_ERROR", "NOT_FOUND")
    #[schema(example = "NOT_FOUND")]
    pub error_code: String,

    /// Human-readable error message
    #[schema(example = "Chirp with id 7 not found")]
    pub message: String,

    /// Optional additional details (e.g., field-level validation errors)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,

    /// RFC 3339 timestamp of when the error occurred
    pub timestamp: String,
}

impl ErrorResponse {
    fn new(error_code: &str, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.to_string(),
            message: message.into(),
            details: None,
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_response) = self.to_error_response();
        (status, Json(error_response)).into_response()
    }
}

impl ApiError {
    /// Convert ApiError to HTTP status code and ErrorResponse
    ///
    /// Logging level follows severity: error! for 500s, warn! for
    /// 401/403/409, debug! for 400/404.
    fn to_error_response(&self) -> (StatusCode, ErrorResponse) {
        let response = match self {
            ApiError::ValidationError(errors) => {
                debug!("Validation error: {:?}", errors);

                let mut response = ErrorResponse::new("VALIDATION_ERROR", "Request validation failed");
                response.details =
                    Some(serde_json::to_value(errors).unwrap_or(serde_json::json!({})));
                response
            }
            ApiError::BadRequest(message) => {
                debug!("Bad request: {}", message);
                ErrorResponse::new("BAD_REQUEST", message.clone())
            }
            ApiError::NotFound { resource, id } => {
                debug!("Resource not found: {} with id {}", resource, id);
                ErrorResponse::new("NOT_FOUND", format!("{} with id {} not found", resource, id))
            }
            ApiError::Conflict { message } => {
                warn!("Conflict error: {}", message);
                ErrorResponse::new("CONFLICT", message.clone())
            }
            ApiError::StorageError(store_error) => {
                // Paths and parser output stay in the log
                error!("Storage error: {:?}", store_error);
                ErrorResponse::new("STORAGE_ERROR", "A storage error occurred")
            }
            ApiError::InternalError(internal_msg) => {
                error!("Internal error: {}", internal_msg);
                ErrorResponse::new("INTERNAL_ERROR", "An internal server error occurred")
            }
            ApiError::Unauthorized(message) => {
                warn!("Unauthorized access attempt: {}", message);
                ErrorResponse::new("UNAUTHORIZED", message.clone())
            }
            ApiError::Forbidden(message) => {
                warn!("Forbidden access attempt: {}", message);
                ErrorResponse::new("FORBIDDEN", message.clone())
            }
        };

        (self.status_code(), response)
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::ValidationError(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::StorageError(_) | ApiError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(error: StoreError) -> Self {
        ApiError::StorageError(error)
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::ValidationError(errors)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        debug!("Rejected request body: {}", rejection.body_text());
        ApiError::BadRequest("Couldn't decode parameters".to_string())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        debug!("Rejected query string: {}", rejection.body_text());
        ApiError::BadRequest("Invalid query parameters".to_string())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        debug!("Rejected path parameter: {}", rejection.body_text());
        ApiError::BadRequest("Invalid path parameter".to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::InvalidCredentials
            | AuthError::InvalidToken
            | AuthError::ExpiredToken
            | AuthError::MissingToken => ApiError::Unauthorized(error.to_string()),
            AuthError::EmailAlreadyExists => ApiError::Conflict {
                message: error.to_string(),
            },
            AuthError::UserNotFound(id) => ApiError::NotFound {
                resource: "User".to_string(),
                id,
            },
            AuthError::PasswordHashError(_) | AuthError::TokenGenerationError(_) => {
                ApiError::InternalError(error.to_string())
            }
            AuthError::StorageError(e) => ApiError::StorageError(e),
        }
    }
}

impl From<ChirpError> for ApiError {
    fn from(error: ChirpError) -> Self {
        match error {
            ChirpError::Validation(message) => ApiError::BadRequest(message),
            ChirpError::NotFound(id) => ApiError::NotFound {
                resource: "Chirp".to_string(),
                id: id.to_string(),
            },
            ChirpError::AuthorNotFound(id) => ApiError::NotFound {
                resource: "User".to_string(),
                id: id.to_string(),
            },
            ChirpError::Forbidden { .. } => ApiError::Forbidden(error.to_string()),
            ChirpError::Storage(e) => ApiError::StorageError(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn body_json(error: ApiError) -> (StatusCode, serde_json::Value) {
        let (status, response) = error.to_error_response();
        (status, serde_json::to_value(response).unwrap())
    }

    #[test]
    fn test_error_codes() {
        let cases = vec![
            (ApiError::BadRequest("bad".to_string()), StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            (
                ApiError::Conflict {
                    message: "dup".to_string(),
                },
                StatusCode::CONFLICT,
                "CONFLICT",
            ),
            (
                ApiError::InternalError("boom".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
            ),
            (ApiError::Unauthorized("no".to_string()), StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            (ApiError::Forbidden("nope".to_string()), StatusCode::FORBIDDEN, "FORBIDDEN"),
        ];

        for (error, expected_status, expected_code) in cases {
            let (status, json) = body_json(error);
            assert_eq!(status, expected_status);
            assert_eq!(json["error_code"], expected_code);
        }
    }

    #[test]
    fn test_internal_error_message_is_generic() {
        let (_, json) = body_json(ApiError::InternalError("argon2 salt failure".to_string()));
        assert_eq!(json["message"], "An internal server error occurred");
    }

    #[test]
    fn test_storage_error_details_are_not_exposed() {
        let error = ApiError::from(StoreError::io(
            "read",
            PathBuf::from("/var/lib/chirpy/database.json"),
            std::io::Error::other("disk on fire"),
        ));
        let (status, json) = body_json(error);

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error_code"], "STORAGE_ERROR");
        let text = json.to_string();
        assert!(!text.contains("database.json"));
        assert!(!text.contains("disk on fire"));
    }

    #[test]
    fn test_auth_errors_map_to_statuses() {
        assert_eq!(ApiError::from(AuthError::InvalidCredentials).status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::from(AuthError::ExpiredToken).status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::from(AuthError::MissingToken).status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::from(AuthError::EmailAlreadyExists).status_code(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::from(AuthError::UserNotFound("3".to_string())).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(AuthError::PasswordHashError("salt".to_string())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_chirp_errors_map_to_statuses() {
        assert_eq!(
            ApiError::from(ChirpError::Validation("Chirp is too long".to_string())).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::from(ChirpError::NotFound(4)).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::from(ChirpError::AuthorNotFound(4)).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::from(ChirpError::Forbidden { chirp_id: 1, requester: 2 }).status_code(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_not_found_message() {
        let (_, json) = body_json(ApiError::from(ChirpError::NotFound(7)));
        assert_eq!(json["error_code"], "NOT_FOUND");
        assert_eq!(json["message"], "Chirp with id 7 not found");
        assert!(json.get("details").is_none());
        assert!(json["timestamp"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_rejection_detail_is_not_echoed() {
        use axum::extract::{FromRequestParts, Query};
        use axum::http::Request;

        #[derive(Debug, serde::Deserialize)]
        struct Params {
            #[allow(dead_code)]
            page: i32,
        }

        let (mut parts, _) = Request::builder()
            .uri("/things?page=")
            .body(())
            .unwrap()
            .into_parts();
        let rejection = Query::<Params>::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();

        let (status, json) = body_json(ApiError::from(rejection));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "Invalid query parameters");
        assert!(!json.to_string().contains("integer"));
    }
}
