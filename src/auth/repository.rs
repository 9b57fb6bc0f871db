// User repository: accounts and refresh tokens, stored in the document

use chrono::Utc;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::auth::{
    error::AuthError,
    models::{IssuedRefreshToken, StoredRefreshToken, User},
    password::PasswordService,
    token::TokenService,
};
use crate::store::DocumentStore;

/// User repository for document store operations
#[derive(Clone)]
pub struct UserRepository {
    store: DocumentStore,
}

impl UserRepository {
    pub fn new(store: DocumentStore) -> Self {
        Self { store }
    }

    /// Hash a token using SHA-256
    fn hash_token(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Create a new user with a hashed password
    ///
    /// Hashing runs before the write lock is taken; the email check and id
    /// allocation run under it.
    pub async fn create(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let hashed_password = PasswordService::hash_password(password)?;

        let user = self
            .store
            .with_write_lock(|doc| {
                if doc.user_by_email(email).is_some() {
                    return Err(AuthError::EmailAlreadyExists);
                }

                let id = doc.allocate_user_id()?;
                let user = User {
                    id,
                    email: email.to_string(),
                    hashed_password,
                    is_chirpy_red: false,
                    refresh_token: None,
                };
                doc.users.insert(id, user.clone());
                Ok(user)
            })
            .await?;

        info!("Created user {}", user.id);
        Ok(user)
    }

    pub async fn get_by_id(&self, id: i32) -> Result<User, AuthError> {
        self.store
            .with_read_lock(|doc| {
                doc.users
                    .get(&id)
                    .cloned()
                    .ok_or_else(|| AuthError::UserNotFound(id.to_string()))
            })
            .await
    }

    pub async fn get_by_email(&self, email: &str) -> Result<User, AuthError> {
        self.store
            .with_read_lock(|doc| {
                doc.user_by_email(email)
                    .cloned()
                    .ok_or_else(|| AuthError::UserNotFound(email.to_string()))
            })
            .await
    }

    /// Replace email and password; premium status and refresh token are kept.
    /// The new email is not checked for uniqueness.
    pub async fn update(&self, id: i32, email: &str, password: &str) -> Result<User, AuthError> {
        let hashed_password = PasswordService::hash_password(password)?;

        let user = self
            .store
            .with_write_lock(|doc| {
                let user = doc
                    .users
                    .get_mut(&id)
                    .ok_or_else(|| AuthError::UserNotFound(id.to_string()))?;
                user.email = email.to_string();
                user.hashed_password = hashed_password;
                Ok::<_, AuthError>(user.clone())
            })
            .await?;

        info!("Updated user {}", id);
        Ok(user)
    }

    pub async fn set_red_status(&self, id: i32, is_chirpy_red: bool) -> Result<User, AuthError> {
        let user = self
            .store
            .with_write_lock(|doc| {
                let user = doc
                    .users
                    .get_mut(&id)
                    .ok_or_else(|| AuthError::UserNotFound(id.to_string()))?;
                user.is_chirpy_red = is_chirpy_red;
                Ok::<_, AuthError>(user.clone())
            })
            .await?;

        info!("Set Chirpy Red for user {} to {}", id, is_chirpy_red);
        Ok(user)
    }

    /// Issue a fresh refresh token, replacing whatever token the user held
    pub async fn issue_refresh_token(&self, user_id: i32) -> Result<IssuedRefreshToken, AuthError> {
        let token = TokenService::generate_refresh_token();
        let expires_at = TokenService::refresh_token_expiry(Utc::now());
        let stored = StoredRefreshToken {
            token_hash: Self::hash_token(&token),
            expires_at,
        };

        self.store
            .with_write_lock(|doc| {
                let user = doc
                    .users
                    .get_mut(&user_id)
                    .ok_or_else(|| AuthError::UserNotFound(user_id.to_string()))?;
                user.refresh_token = Some(stored);
                Ok::<_, AuthError>(())
            })
            .await?;

        debug!("Issued refresh token for user {}", user_id);
        Ok(IssuedRefreshToken { token, expires_at })
    }

    /// Find the user holding `token`
    ///
    /// Linear scan over all users. Unknown and expired tokens are both
    /// unauthorized.
    pub async fn find_by_refresh_token(&self, token: &str) -> Result<User, AuthError> {
        let token_hash = Self::hash_token(token);
        let now = Utc::now();

        self.store
            .with_read_lock(|doc| {
                let user = doc
                    .users
                    .values()
                    .find(|user| {
                        user.refresh_token
                            .as_ref()
                            .is_some_and(|stored| stored.token_hash == token_hash)
                    })
                    .ok_or(AuthError::InvalidToken)?;

                let expired = user
                    .refresh_token
                    .as_ref()
                    .is_some_and(|stored| stored.expires_at <= now);
                if expired {
                    warn!("Expired refresh token presented for user {}", user.id);
                    return Err(AuthError::ExpiredToken);
                }

                Ok(user.clone())
            })
            .await
    }

    /// Clear the refresh token of whichever user holds `token`.
    /// Only the token field changes; the account and its chirps stay.
    pub async fn revoke_refresh_token(&self, token: &str) -> Result<(), AuthError> {
        let token_hash = Self::hash_token(token);

        let user_id = self
            .store
            .with_write_lock(|doc| {
                let user = doc
                    .users
                    .values_mut()
                    .find(|user| {
                        user.refresh_token
                            .as_ref()
                            .is_some_and(|stored| stored.token_hash == token_hash)
                    })
                    .ok_or(AuthError::InvalidToken)?;
                user.refresh_token = None;
                Ok::<_, AuthError>(user.id)
            })
            .await?;

        info!("Revoked refresh token of user {}", user_id);
        Ok(())
    }
}
