//! PostgreSQL adapter for the user repository port.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use vantage_application::{UserRecord, UserRepository};
use vantage_core::{AppError, AppResult};
use vantage_domain::UserId;

/// PostgreSQL-backed repository for user accounts.
#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: uuid::Uuid,
    email: String,
    display_name: String,
    password_hash: String,
    is_active: bool,
}

impl From<UserRow> for UserRecord {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId::from_uuid(row.id),
            email: row.email,
            display_name: row.display_name,
            password_hash: row.password_hash,
            is_active: row.is_active,
        }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRecord>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, display_name, password_hash, is_active
            FROM users
            WHERE lower(email) = lower($1)
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to look up user by email: {error}")))?;

        Ok(row.map(UserRecord::from))
    }

    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<UserRecord>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, display_name, password_hash, is_active
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to look up user by id: {error}")))?;

        Ok(row.map(UserRecord::from))
    }

    async fn create(
        &self,
        email: &str,
        display_name: &str,
        password_hash: &str,
    ) -> AppResult<UserId> {
        let id = sqlx::query_scalar::<_, uuid::Uuid>(
            r#"
            INSERT INTO users (email, display_name, password_hash)
            VALUES (lower($1), $2, $3)
            RETURNING id
            "#,
        )
        .bind(email)
        .bind(display_name)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| match error {
            sqlx::Error::Database(db_error) if db_error.is_unique_violation() => {
                AppError::Conflict("registration could not be completed".to_owned())
            }
            other => AppError::Internal(format!("failed to create user: {other}")),
        })?;

        Ok(UserId::from_uuid(id))
    }

    async fn update_password(&self, user_id: UserId, password_hash: &str) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(password_hash)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update password: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("user not found".to_owned()));
        }

        Ok(())
    }

    async fn deactivate(&self, user_id: UserId) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET is_active = FALSE
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to deactivate user: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("user not found".to_owned()));
        }

        Ok(())
    }
}
