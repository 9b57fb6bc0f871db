// Chirp repository error types

use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum ChirpError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Chirp {0} not found")]
    NotFound(i32),

    #[error("Author {0} does not exist")]
    AuthorNotFound(i32),

    #[error("User {requester} is not the author of chirp {chirp_id}")]
    Forbidden { chirp_id: i32, requester: i32 },

    #[error(transparent)]
    Storage(#[from] StoreError),
}
