// Request extractors for bearer-token and API-key protected routes

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use tracing::{debug, warn};

use crate::auth::{error::AuthError, token::TokenService};

/// Read the Authorization header and strip `scheme` from it
///
/// A missing header is `MissingToken`; any other shape is `InvalidToken`.
fn authorization_credential<'a>(parts: &'a Parts, scheme: &str) -> Result<&'a str, AuthError> {
    let endpoint = parts.uri.path();

    let auth_header = parts
        .headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| {
            debug!("Missing Authorization header for endpoint: {}", endpoint);
            AuthError::MissingToken
        })?
        .to_str()
        .map_err(|_| {
            warn!("Invalid Authorization header encoding for endpoint: {}", endpoint);
            AuthError::InvalidToken
        })?;

    let credential = auth_header
        .strip_prefix(scheme)
        .and_then(|rest| rest.strip_prefix(' '))
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| {
            warn!(
                "Authorization header missing '{}' scheme for endpoint: {}",
                scheme, endpoint
            );
            AuthError::InvalidToken
        })?;

    Ok(credential)
}

/// Raw bearer credential, used for refresh tokens
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        authorization_credential(parts, "Bearer").map(|token| BearerToken(token.to_string()))
    }
}

/// Key presented as `Authorization: ApiKey <key>`
#[derive(Debug, Clone)]
pub struct ApiKey(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for ApiKey
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        authorization_credential(parts, "ApiKey").map(|key| ApiKey(key.to_string()))
    }
}

/// Authenticated user extractor for protected routes
///
/// Validates the bearer access token with the application's `TokenService`.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: i32,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    TokenService: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = authorization_credential(parts, "Bearer")?;
        let token_service = TokenService::from_ref(state);

        let user_id = token_service.validate_access_token(token).map_err(|e| {
            warn!("Rejected access token for endpoint {}: {}", parts.uri.path(), e);
            e
        })?;

        Ok(AuthenticatedUser { user_id })
    }
}
