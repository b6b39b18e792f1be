use crate::models::MagicLinkToken;
use async_trait::async_trait;
use sqlx::SqlitePool;
use std::collections::HashMap;
use tokio::sync::Mutex;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Transient storage for issued magic links.
#[async_trait]
pub trait MagicLinkStore: Send + Sync {
    async fn insert(&self, record: MagicLinkToken) -> StoreResult<()>;

    /// Atomically removes the record for `token` and returns it if it was
    /// still valid at `now`. Unknown and expired tokens both yield `None`.
    async fn consume(&self, token: &str, now: i64) -> StoreResult<Option<MagicLinkToken>>;

    /// Drops every record that expired at or before `now`.
    async fn purge_expired(&self, now: i64) -> StoreResult<u64>;
}

/// Process-local store. Contents do not survive a restart.
#[derive(Default)]
pub struct InMemoryMagicLinkStore {
    tokens: Mutex<HashMap<String, MagicLinkToken>>,
}

impl InMemoryMagicLinkStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.tokens.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tokens.lock().await.is_empty()
    }
}

#[async_trait]
impl MagicLinkStore for InMemoryMagicLinkStore {
    async fn insert(&self, record: MagicLinkToken) -> StoreResult<()> {
        let mut tokens = self.tokens.lock().await;
        tokens.insert(record.token.clone(), record);
        Ok(())
    }

    async fn consume(&self, token: &str, now: i64) -> StoreResult<Option<MagicLinkToken>> {
        let mut tokens = self.tokens.lock().await;
        Ok(tokens
            .remove(token)
            .filter(|record| !record.is_expired_at(now)))
    }

    async fn purge_expired(&self, now: i64) -> StoreResult<u64> {
        let mut tokens = self.tokens.lock().await;
        let before = tokens.len();
        tokens.retain(|_, record| !record.is_expired_at(now));
        Ok((before - tokens.len()) as u64)
    }
}

/// Store backed by the `magic_link_tokens` table.
pub struct SqliteMagicLinkStore {
    pool: SqlitePool,
}

impl SqliteMagicLinkStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MagicLinkStore for SqliteMagicLinkStore {
    async fn insert(&self, record: MagicLinkToken) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO magic_link_tokens (token, email, expires_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(&record.token)
        .bind(&record.email)
        .bind(record.expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn consume(&self, token: &str, now: i64) -> StoreResult<Option<MagicLinkToken>> {
        let record = sqlx::query_as::<_, MagicLinkToken>(
            r#"
            DELETE FROM magic_link_tokens
            WHERE token = ?
            RETURNING token, email, expires_at
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record.filter(|record| !record.is_expired_at(now)))
    }

    async fn purge_expired(&self, now: i64) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM magic_link_tokens WHERE expires_at <= ?")
            .bind(now)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
