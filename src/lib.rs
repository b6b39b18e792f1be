pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod validation;

// Make test_utils available for both unit tests and integration tests
pub mod test_utils;

use config::{AppConfig, MagicLinkStoreKind};
use repositories::{
    InMemoryMagicLinkStore, MagicLinkStore, SqliteMagicLinkStore, SqliteUserRepository,
    UserRepository,
};
use services::{AuthService, EmailService, MagicLinkService, SessionTokenService};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub auth_service: Arc<AuthService>,
    pub magic_link_service: Arc<MagicLinkService>,
    pub session_token_service: Arc<SessionTokenService>,
    pub pool: sqlx::SqlitePool,
}

impl AppState {
    /// Wire repositories and services from `config` on top of `pool`.
    pub fn new(config: AppConfig, pool: sqlx::SqlitePool, email_service: Box<dyn EmailService>) -> Self {
        let user_repository: Arc<dyn UserRepository> =
            Arc::new(SqliteUserRepository::new(pool.clone()));
        let magic_link_store: Arc<dyn MagicLinkStore> = match config.magic_link_store {
            MagicLinkStoreKind::Memory => Arc::new(InMemoryMagicLinkStore::new()),
            MagicLinkStoreKind::Sqlite => Arc::new(SqliteMagicLinkStore::new(pool.clone())),
        };

        Self::with_store(config, pool, magic_link_store, user_repository, email_service)
    }

    pub fn with_store(
        config: AppConfig,
        pool: sqlx::SqlitePool,
        magic_link_store: Arc<dyn MagicLinkStore>,
        user_repository: Arc<dyn UserRepository>,
        email_service: Box<dyn EmailService>,
    ) -> Self {
        let session_token_service = Arc::new(SessionTokenService::new(
            config.jwt_secret.clone(),
            config.session_ttl,
        ));
        let auth_service = Arc::new(AuthService::new(
            user_repository.clone(),
            session_token_service.clone(),
        ));
        let magic_link_service = Arc::new(MagicLinkService::new(
            magic_link_store,
            user_repository,
            session_token_service.clone(),
            email_service,
            config.frontend_url.clone(),
            config.magic_link_ttl,
        ));

        Self {
            config: Arc::new(config),
            auth_service,
            magic_link_service,
            session_token_service,
            pool,
        }
    }
}
