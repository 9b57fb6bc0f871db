// Authentication module
// Argon2 password hashing, JWT access tokens, and opaque refresh tokens stored on the user record

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod password;
pub mod repository;
pub mod service;
pub mod token;

// Re-export commonly used types
pub use error::AuthError;
pub use middleware::{ApiKey, AuthenticatedUser, BearerToken};
pub use models::{
    LoginRequest, LoginResponse, RefreshResponse, RegisterRequest, UpdateUserRequest, UserResponse,
};
pub use repository::UserRepository;
pub use service::AuthService;
pub use token::TokenService;
