use std::env;
use std::str::FromStr;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Duration;
use rand::RngCore;
use tracing::warn;

pub const DEFAULT_MAGIC_LINK_TTL_SECS: i64 = 300;
pub const DEFAULT_SESSION_TTL_SECS: i64 = 3600;
pub const DEFAULT_CLEANUP_INTERVAL_SECS: u64 = 600;
const MIN_PRODUCTION_SECRET_LEN: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
    #[error("Insecure configuration: {0}")]
    Insecure(String),
}

/// Where issued magic links are kept until they are redeemed or expire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MagicLinkStoreKind {
    Memory,
    Sqlite,
}

impl FromStr for MagicLinkStoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "sqlite" => Ok(Self::Sqlite),
            other => Err(other.to_string()),
        }
    }
}

/// Process configuration, resolved once at startup and passed down explicitly.
#[derive(Clone)]
pub struct AppConfig {
    pub environment: String,
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: Vec<u8>,
    pub frontend_url: String,
    pub magic_link_ttl: Duration,
    pub session_ttl: Duration,
    pub magic_link_store: MagicLinkStoreKind,
    pub cleanup_interval: std::time::Duration,
    pub cors_allowed_origins: Vec<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("environment", &self.environment)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database_url", &self.database_url)
            .field("jwt_secret", &"[REDACTED]")
            .field("frontend_url", &self.frontend_url)
            .field("magic_link_ttl", &self.magic_link_ttl)
            .field("session_ttl", &self.session_ttl)
            .field("magic_link_store", &self.magic_link_store)
            .field("cleanup_interval", &self.cleanup_interval)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .finish()
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = current_environment();
        let database_url = env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        Ok(Self {
            environment,
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_env("PORT", 5000)?,
            database_url,
            jwt_secret: load_jwt_secret(),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string())
                .trim_end_matches('/')
                .to_string(),
            magic_link_ttl: Duration::seconds(parse_positive_env(
                "MAGIC_LINK_TTL_SECS",
                DEFAULT_MAGIC_LINK_TTL_SECS,
            )?),
            session_ttl: Duration::seconds(parse_positive_env(
                "SESSION_TTL_SECS",
                DEFAULT_SESSION_TTL_SECS,
            )?),
            magic_link_store: parse_env("MAGIC_LINK_STORE", MagicLinkStoreKind::Memory)?,
            cleanup_interval: std::time::Duration::from_secs(parse_positive_env(
                "MAGIC_LINK_CLEANUP_INTERVAL_SECS",
                DEFAULT_CLEANUP_INTERVAL_SECS,
            )?),
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .map(|value| {
                    value
                        .split(',')
                        .map(|origin| origin.trim().to_string())
                        .filter(|origin| !origin.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
        })
    }

    /// Development defaults with a caller-supplied database URL and secret.
    pub fn for_database(database_url: impl Into<String>, jwt_secret: impl Into<Vec<u8>>) -> Self {
        Self {
            environment: "development".to_string(),
            host: "127.0.0.1".to_string(),
            port: 5000,
            database_url: database_url.into(),
            jwt_secret: jwt_secret.into(),
            frontend_url: "http://localhost:3000".to_string(),
            magic_link_ttl: Duration::seconds(DEFAULT_MAGIC_LINK_TTL_SECS),
            session_ttl: Duration::seconds(DEFAULT_SESSION_TTL_SECS),
            magic_link_store: MagicLinkStoreKind::Memory,
            cleanup_interval: std::time::Duration::from_secs(DEFAULT_CLEANUP_INTERVAL_SECS),
            cors_allowed_origins: Vec::new(),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// Refuse to run in production with a missing or guessable signing secret.
pub fn validate_production_config() -> Result<(), ConfigError> {
    if current_environment() != "production" {
        return Ok(());
    }

    let secret = env::var("JWT_SECRET").map_err(|_| ConfigError::Missing("JWT_SECRET"))?;
    if decode_secret_bytes(&secret).len() < MIN_PRODUCTION_SECRET_LEN {
        return Err(ConfigError::Insecure(format!(
            "JWT_SECRET must be at least {} bytes in production",
            MIN_PRODUCTION_SECRET_LEN
        )));
    }

    let lowered = secret.to_ascii_lowercase();
    if lowered.contains("dev-secret")
        || lowered.contains("example")
        || lowered.contains("changeme")
        || lowered.contains("default")
    {
        return Err(ConfigError::Insecure(
            "JWT_SECRET appears to be a default value".to_string(),
        ));
    }

    Ok(())
}

fn current_environment() -> String {
    env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string())
}

fn parse_env<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value }),
        Err(_) => Ok(default),
    }
}

/// Durations and intervals: zero or negative values are configuration errors.
fn parse_positive_env<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr + PartialOrd + Default,
{
    let value = parse_env(key, default)?;
    if value <= T::default() {
        return Err(ConfigError::InvalidValue {
            key,
            value: env::var(key).unwrap_or_default(),
        });
    }
    Ok(value)
}

fn load_jwt_secret() -> Vec<u8> {
    match env::var("JWT_SECRET") {
        Ok(secret) if !secret.is_empty() => decode_secret_bytes(&secret),
        _ => {
            warn!("JWT_SECRET not set; generating ephemeral signing key (development only)");
            let mut key = vec![0u8; 64];
            rand::rngs::OsRng.fill_bytes(&mut key);
            key
        }
    }
}

fn decode_secret_bytes(secret: &str) -> Vec<u8> {
    STANDARD
        .decode(secret.as_bytes())
        .unwrap_or_else(|_| secret.as_bytes().to_vec())
}
