// Polka payment-provider webhooks

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};
use utoipa::ToSchema;

use crate::auth::ApiKey;
use crate::error::ApiError;
use crate::AppState;

/// The only event that changes state
pub const USER_UPGRADED_EVENT: &str = "user.upgraded";

/// Webhook payload sent by Polka
#[derive(Debug, Deserialize, ToSchema)]
pub struct PolkaWebhook {
    #[schema(example = "user.upgraded")]
    pub event: String,
    pub data: PolkaWebhookData,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PolkaWebhookData {
    #[schema(example = 3)]
    pub user_id: i32,
}

/// Compares SHA-256 digests so neither the content nor the length of the
/// configured key shows up in timing.
fn api_key_matches(presented: &str, expected: &str) -> bool {
    let presented = Sha256::digest(presented.as_bytes());
    let expected = Sha256::digest(expected.as_bytes());
    constant_time_eq(&presented, &expected)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

/// Handler for POST /api/polka/webhooks
/// Marks a user as Chirpy Red after a successful payment
#[utoipa::path(
    post,
    path = "/api/polka/webhooks",
    request_body = PolkaWebhook,
    responses(
        (status = 204, description = "Event processed or ignored"),
        (status = 400, description = "Malformed webhook body", body = crate::error::ErrorResponse),
        (status = 401, description = "Missing or wrong API key", body = crate::error::ErrorResponse),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::error::ErrorResponse)
    ),
    tag = "webhooks"
)]
pub async fn polka_webhook_handler(
    State(state): State<AppState>,
    ApiKey(key): ApiKey,
    body: Result<Json<PolkaWebhook>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    if !api_key_matches(&key, &state.polka_key) {
        warn!("Polka webhook presented an unknown API key");
        return Err(ApiError::Unauthorized("Invalid API key".to_string()));
    }

    let Json(webhook) = body?;

    if webhook.event != USER_UPGRADED_EVENT {
        debug!("Ignoring Polka event '{}'", webhook.event);
        return Ok(StatusCode::NO_CONTENT);
    }

    state.auth.upgrade_user(webhook.data.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
