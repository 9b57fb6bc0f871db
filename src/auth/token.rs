// JWT access tokens and opaque refresh token generation

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::auth::error::AuthError;

/// `iss` claim stamped on every access token
pub const TOKEN_ISSUER: &str = "chirpy";

/// Upper bound (and default) for access token lifetime, in seconds
pub const MAX_ACCESS_TOKEN_TTL_SECS: i64 = 60 * 60;

/// Refresh tokens live for 60 days
pub const REFRESH_TOKEN_TTL_DAYS: i64 = 60;

const REFRESH_TOKEN_BYTES: usize = 32;

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub sub: String, // user id, stringified
    pub iat: i64,
    pub exp: i64,
}

/// Token service for JWT operations
#[derive(Clone)]
pub struct TokenService {
    secret: Arc<str>,
}

impl TokenService {
    pub fn new(secret: impl Into<String>) -> Self {
        let secret: String = secret.into();
        Self {
            secret: Arc::from(secret),
        }
    }

    /// Requested lifetime clamped to (0, 1 hour]; absent or non-positive means one hour
    pub fn clamp_ttl(expires_in_seconds: Option<i64>) -> Duration {
        let seconds = match expires_in_seconds {
            Some(s) if s > 0 => s.min(MAX_ACCESS_TOKEN_TTL_SECS),
            _ => MAX_ACCESS_TOKEN_TTL_SECS,
        };
        Duration::seconds(seconds)
    }

    /// Generate an access token whose subject is `user_id`
    pub fn generate_access_token(
        &self,
        user_id: i32,
        expires_in_seconds: Option<i64>,
    ) -> Result<String, AuthError> {
        self.generate_access_token_at(user_id, Self::clamp_ttl(expires_in_seconds), Utc::now())
    }

    fn generate_access_token_at(
        &self,
        user_id: i32,
        ttl: Duration,
        issued_at: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let claims = Claims {
            iss: TOKEN_ISSUER.to_string(),
            sub: user_id.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
        };
        self.sign(&claims)
    }

    pub fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenGenerationError(e.to_string()))
    }

    /// Validate an access token and return the user id it was issued for
    pub fn validate_access_token(&self, token: &str) -> Result<i32, AuthError> {
        let claims = self.decode_claims(token)?;
        claims.sub.parse::<i32>().map_err(|_| AuthError::InvalidToken)
    }

    /// Verify signature, issuer and expiry (no leeway) and return the claims
    pub fn decode_claims(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[TOKEN_ISSUER]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
            _ => AuthError::InvalidToken,
        })
    }

    /// 32 bytes from the thread-local CSPRNG, hex encoded
    pub fn generate_refresh_token() -> String {
        let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }

    pub fn refresh_token_expiry(issued_at: DateTime<Utc>) -> DateTime<Utc> {
        issued_at + Duration::days(REFRESH_TOKEN_TTL_DAYS)
    }
}
