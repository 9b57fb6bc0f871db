// Authentication service - business logic layer

use tracing::{debug, info, warn};

use crate::auth::{
    error::AuthError,
    models::{LoginResponse, UserResponse},
    password::PasswordService,
    repository::UserRepository,
    token::TokenService,
};

/// Authentication service coordinating all auth operations
pub struct AuthService {
    user_repo: UserRepository,
    token_service: TokenService,
}

impl AuthService {
    /// Create a new AuthService
    pub fn new(user_repo: UserRepository, token_service: TokenService) -> Self {
        Self {
            user_repo,
            token_service,
        }
    }

    /// Register a new user
    pub async fn register(&self, email: &str, password: &str) -> Result<UserResponse, AuthError> {
        let user = self.user_repo.create(email, password).await?;
        Ok(UserResponse::from(user))
    }

    /// Login a user, issuing an access token and a fresh refresh token
    ///
    /// Unknown email and wrong password are indistinguishable to the caller.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        expires_in_seconds: Option<i64>,
    ) -> Result<LoginResponse, AuthError> {
        let user = match self.user_repo.get_by_email(email).await {
            Ok(user) => user,
            Err(AuthError::UserNotFound(_)) => {
                warn!("Login attempt for unknown email");
                return Err(AuthError::InvalidCredentials);
            }
            Err(e) => return Err(e),
        };

        if !PasswordService::verify_password(password, &user.hashed_password)? {
            warn!("Failed login for user {}", user.id);
            return Err(AuthError::InvalidCredentials);
        }

        let token = self
            .token_service
            .generate_access_token(user.id, expires_in_seconds)?;
        let refresh = self.user_repo.issue_refresh_token(user.id).await?;

        info!("User {} logged in", user.id);
        debug!("Refresh token for user {} expires at {}", user.id, refresh.expires_at);
        Ok(LoginResponse {
            id: user.id,
            email: user.email,
            is_chirpy_red: user.is_chirpy_red,
            token,
            refresh_token: refresh.token,
        })
    }

    /// Exchange a live refresh token for a one-hour access token
    pub async fn refresh_access_token(&self, refresh_token: &str) -> Result<String, AuthError> {
        let user = self.user_repo.find_by_refresh_token(refresh_token).await?;
        self.token_service.generate_access_token(user.id, None)
    }

    pub async fn revoke(&self, refresh_token: &str) -> Result<(), AuthError> {
        self.user_repo.revoke_refresh_token(refresh_token).await
    }

    pub async fn update_user(
        &self,
        user_id: i32,
        email: &str,
        password: &str,
    ) -> Result<UserResponse, AuthError> {
        let user = self.user_repo.update(user_id, email, password).await?;
        Ok(UserResponse::from(user))
    }

    /// Grant Chirpy Red membership; repeated upgrades leave the store untouched
    pub async fn upgrade_user(&self, user_id: i32) -> Result<UserResponse, AuthError> {
        let user = self.user_repo.get_by_id(user_id).await?;
        if user.is_chirpy_red {
            debug!("User {} is already Chirpy Red", user_id);
            return Ok(UserResponse::from(user));
        }

        let user = self.user_repo.set_red_status(user_id, true).await?;
        Ok(UserResponse::from(user))
    }
}
