use crate::models::{MagicLinkToken, User};
use crate::repositories::magic_link_store::{MagicLinkStore, StoreError};
use crate::repositories::user_repository::{RepositoryError, UserRepository};
use crate::services::email_service::{EmailError, EmailService};
use crate::services::session_token_service::{SessionTokenError, SessionTokenService};
use crate::validation::is_valid_email;
use chrono::{Duration, Utc};
use rand::{rngs::OsRng, RngCore};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum MagicLinkError {
    #[error("Please enter a valid email address")]
    InvalidEmail,
    #[error("Token missing")]
    MissingToken,
    #[error("Invalid or expired token")]
    InvalidOrExpired,
    #[error("Token store error: {0}")]
    Store(#[from] StoreError),
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
    #[error("Email error: {0}")]
    Email(#[from] EmailError),
    #[error("Session token error: {0}")]
    SessionToken(#[from] SessionTokenError),
}

#[derive(Debug, Clone)]
pub struct IssuedMagicLink {
    pub link: String,
    pub token: String,
    pub expires_at: i64,
}

#[derive(Debug, Clone)]
pub struct Redemption {
    pub session_token: String,
    pub user: User,
    /// Whether the user row was created by this redemption.
    pub created: bool,
}

pub struct MagicLinkService {
    store: Arc<dyn MagicLinkStore>,
    user_repository: Arc<dyn UserRepository>,
    session_tokens: Arc<SessionTokenService>,
    email_service: Box<dyn EmailService>,
    link_base_url: String,
    ttl: Duration,
}

impl MagicLinkService {
    pub fn new(
        store: Arc<dyn MagicLinkStore>,
        user_repository: Arc<dyn UserRepository>,
        session_tokens: Arc<SessionTokenService>,
        email_service: Box<dyn EmailService>,
        link_base_url: impl Into<String>,
        ttl: Duration,
    ) -> Self {
        Self {
            store,
            user_repository,
            session_tokens,
            email_service,
            link_base_url: link_base_url.into(),
            ttl,
        }
    }

    fn generate_token() -> String {
        let mut bytes = [0u8; 32];
        OsRng.fill_bytes(&mut bytes);
        hex::encode(bytes)
    }

    fn link_for(&self, token: &str) -> String {
        format!("{}/verify?token={}", self.link_base_url, token)
    }

    /// Creates a one-time token for `email` and hands the link to the email sink.
    ///
    /// Every call yields an independent token; earlier links for the same
    /// address stay valid until they expire or are redeemed.
    pub async fn issue(&self, email: &str) -> Result<IssuedMagicLink, MagicLinkError> {
        let email = email.trim();
        if !is_valid_email(email) {
            return Err(MagicLinkError::InvalidEmail);
        }

        let token = Self::generate_token();
        let expires_at = (Utc::now() + self.ttl).timestamp();
        self.store
            .insert(MagicLinkToken::new(token.clone(), email, expires_at))
            .await?;

        let link = self.link_for(&token);
        if let Err(e) = self.email_service.send_magic_link(email, &link).await {
            tracing::error!("❌ Failed to deliver magic link to {}: {:?}", email, e);
            // Nobody can hold a link that was never delivered.
            self.store.consume(&token, Utc::now().timestamp()).await?;
            return Err(e.into());
        }

        tracing::debug!("Issued magic link for {} expiring at {}", email, expires_at);

        Ok(IssuedMagicLink {
            link,
            token,
            expires_at,
        })
    }

    /// Redeems `token` exactly once and returns a fresh session credential.
    ///
    /// Unknown, expired and already-used tokens all fail with
    /// [`MagicLinkError::InvalidOrExpired`].
    pub async fn redeem(&self, token: &str) -> Result<Redemption, MagicLinkError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(MagicLinkError::MissingToken);
        }

        let record = self
            .store
            .consume(token, Utc::now().timestamp())
            .await?
            .ok_or(MagicLinkError::InvalidOrExpired)?;

        let (user, created) = self.user_repository.get_or_create(&record.email).await?;
        if created {
            tracing::info!("Created user {} for {}", user.id, user.email);
        }

        let session_token = self.session_tokens.issue(&user)?;

        Ok(Redemption {
            session_token,
            user,
            created,
        })
    }

    pub async fn cleanup_expired_tokens(&self) -> Result<u64, MagicLinkError> {
        let purged = self.store.purge_expired(Utc::now().timestamp()).await?;
        if purged > 0 {
            tracing::debug!("Purged {} expired magic links", purged);
        }
        Ok(purged)
    }
}
