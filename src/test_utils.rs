pub mod test_helpers {
    use crate::config::AppConfig;
    use crate::services::LogEmailService;
    use crate::AppState;
    use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
    use tempfile::NamedTempFile;

    pub const TEST_JWT_SECRET: &[u8] = b"integration-test-signing-key-0123456789";

    /// Create a new in-memory SQLite database for testing
    pub async fn create_test_db() -> Result<SqlitePool, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(":memory:")
            .await?;

        // Run migrations
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(pool)
    }

    /// Create a temporary file-based SQLite database for testing
    /// Useful when several connections must hit the same database concurrently
    pub async fn create_test_db_file(
        max_connections: u32,
    ) -> Result<(SqlitePool, NamedTempFile), sqlx::Error> {
        let temp_file = NamedTempFile::new().map_err(sqlx::Error::Io)?;
        let db_path = temp_file
            .path()
            .to_str()
            .ok_or_else(|| sqlx::Error::Configuration("Invalid database path".into()))?;
        let database_url = format!("sqlite://{}", db_path);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(&database_url)
            .await?;

        // Run migrations
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok((pool, temp_file))
    }

    /// Development config pointing at an in-memory database with a fixed secret
    pub fn test_config() -> AppConfig {
        AppConfig::for_database(":memory:", TEST_JWT_SECRET.to_vec())
    }

    /// Fully wired application state over `pool`
    pub fn create_test_state(pool: SqlitePool) -> AppState {
        AppState::new(test_config(), pool, Box::new(LogEmailService::new()))
    }

    /// Insert a user directly, bypassing the magic-link flow
    pub async fn insert_test_user(
        pool: &SqlitePool,
        email: &str,
        is_active: bool,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query("INSERT INTO users (email, is_active) VALUES (?, ?)")
            .bind(email)
            .bind(is_active)
            .execute(pool)
            .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn count_users(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await
    }

    pub async fn count_users_with_email(pool: &SqlitePool, email: &str) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(pool)
            .await
    }
}

// Re-export commonly used test functions at module level for convenience
// Note: This is test-only code. Panic on error is acceptable in tests.
#[cfg(test)]
pub async fn create_test_pool() -> sqlx::SqlitePool {
    match test_helpers::create_test_db().await {
        Ok(pool) => pool,
        Err(e) => panic!("Failed to create test pool: {}", e),
    }
}
