use crate::models::user::{User, UserProfile};
use crate::repositories::user_repository::{RepositoryError, UserRepository};
use crate::services::session_token_service::{SessionTokenError, SessionTokenService};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    #[error("Invalid session token: {0}")]
    InvalidToken(#[from] SessionTokenError),
    #[error("User not found")]
    UserNotFound,
    #[error("Repository error: {0}")]
    RepositoryError(#[from] RepositoryError),
}

impl AuthServiceError {
    /// Whether the failure means "caller is not authenticated" rather than a
    /// server-side fault.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, Self::InvalidToken(_) | Self::UserNotFound)
    }
}

/// Resolves session credentials to directory users.
pub struct AuthService {
    user_repository: Arc<dyn UserRepository>,
    session_tokens: Arc<SessionTokenService>,
}

impl AuthService {
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        session_tokens: Arc<SessionTokenService>,
    ) -> Self {
        Self {
            user_repository,
            session_tokens,
        }
    }

    /// Checks signature and expiry, then confirms the user still exists.
    pub async fn authenticate(&self, credential: &str) -> Result<User, AuthServiceError> {
        let claims = self.session_tokens.decode(credential)?;

        self.user_repository
            .find_by_id(claims.user_id)
            .await?
            .ok_or(AuthServiceError::UserNotFound)
    }

    pub async fn whoami(&self, credential: &str) -> Result<UserProfile, AuthServiceError> {
        self.authenticate(credential).await.map(UserProfile::from)
    }
}
