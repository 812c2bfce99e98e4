//! PostgreSQL adapter for the rate-limit counter port.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use vantage_application::{AttemptInfo, RateLimitRepository};
use vantage_core::{AppError, AppResult};

/// PostgreSQL-backed attempt counters, one row per key.
#[derive(Clone)]
pub struct PostgresRateLimitRepository {
    pool: PgPool,
}

impl PostgresRateLimitRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct AttemptRow {
    attempt_count: i32,
    window_started_at: chrono::DateTime<chrono::Utc>,
}

#[async_trait]
impl RateLimitRepository for PostgresRateLimitRepository {
    async fn record_attempt(&self, key: &str, window_seconds: i64) -> AppResult<AttemptInfo> {
        // One upsert both increments and rolls the window: a counter whose
        // window has lapsed restarts at one.
        let row = sqlx::query_as::<_, AttemptRow>(
            r#"
            INSERT INTO auth_rate_limits (key, window_started_at, attempt_count)
            VALUES ($1, now(), 1)
            ON CONFLICT (key) DO UPDATE
            SET
                attempt_count = CASE
                    WHEN auth_rate_limits.window_started_at
                        + make_interval(secs => $2::float8) < now()
                    THEN 1
                    ELSE auth_rate_limits.attempt_count + 1
                END,
                window_started_at = CASE
                    WHEN auth_rate_limits.window_started_at
                        + make_interval(secs => $2::float8) < now()
                    THEN now()
                    ELSE auth_rate_limits.window_started_at
                END
            RETURNING attempt_count, window_started_at
            "#,
        )
        .bind(key)
        .bind(window_seconds as f64)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to record attempt: {error}")))?;

        Ok(AttemptInfo {
            attempts: row.attempt_count.max(0) as u32,
            window_started_at: row.window_started_at,
        })
    }

    async fn clear(&self, key: &str) -> AppResult<()> {
        sqlx::query(
            r#"
            DELETE FROM auth_rate_limits
            WHERE key = $1
            "#,
        )
        .bind(key)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to clear attempts: {error}")))?;

        Ok(())
    }
}
