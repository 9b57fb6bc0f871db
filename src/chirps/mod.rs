// Chirps module
// Short text posts: creation with profanity masking, listing, lookup and author-only deletion

pub mod error;
pub mod handlers;
pub mod models;
pub mod profanity;
pub mod repository;

pub use error::ChirpError;
pub use models::{Chirp, CreateChirpRequest, ListChirpsQuery};
pub use repository::ChirpRepository;
