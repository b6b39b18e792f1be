use crate::models::user::User;
use async_trait::async_trait;
use sqlx::SqlitePool;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("User not found")]
    NotFound,
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Persistent user directory keyed by email.
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>>;
    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<User>>;
    /// Returns the user for `email`, creating an active one if none exists.
    ///
    /// The boolean is `true` when this call inserted the row. Uniqueness is
    /// enforced by the `users.email` constraint, so concurrent callers for the
    /// same new email converge on a single row.
    async fn get_or_create(&self, email: &str) -> RepositoryResult<(User, bool)>;
}

pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT
                id,
                email,
                is_active,
                CAST(created_at AS TEXT) AS created_at
            FROM users
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT
                id,
                email,
                is_active,
                CAST(created_at AS TEXT) AS created_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn get_or_create(&self, email: &str) -> RepositoryResult<(User, bool)> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (email, is_active)
            VALUES (?, TRUE)
            ON CONFLICT(email) DO NOTHING
            "#,
        )
        .bind(email)
        .execute(&self.pool)
        .await?;

        let created = result.rows_affected() == 1;
        let user = self
            .find_by_email(email)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        Ok((user, created))
    }
}
