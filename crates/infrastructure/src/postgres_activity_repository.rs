//! PostgreSQL adapter for the activity log port.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use vantage_application::{ActivityEntry, ActivityRecord, ActivityRepository};
use vantage_core::{AppError, AppResult};
use vantage_domain::{UserId, VisibilityBoundary};

use crate::scope_binds::BoundaryBinds;

/// PostgreSQL-backed repository for the append-only activity log.
#[derive(Clone)]
pub struct PostgresActivityRepository {
    pool: PgPool,
}

impl PostgresActivityRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ActivityRow {
    id: uuid::Uuid,
    user_id: uuid::Uuid,
    action: String,
    resource_type: String,
    resource_id: String,
    details: Option<serde_json::Value>,
    created_at: chrono::DateTime<chrono::Utc>,
}

#[async_trait]
impl ActivityRepository for PostgresActivityRepository {
    async fn append(&self, entry: ActivityEntry) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO activity_log
                (user_id, action, resource_type, resource_id, company_id, site_id, details)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(entry.user_id.as_uuid())
        .bind(entry.action.as_str())
        .bind(entry.resource_type.as_str())
        .bind(entry.resource_id.as_str())
        .bind(entry.company_id.map(|id| id.as_uuid()))
        .bind(entry.site_id.map(|id| id.as_uuid()))
        .bind(entry.details)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to append activity: {error}")))?;

        Ok(())
    }

    async fn list_visible(
        &self,
        boundary: VisibilityBoundary,
        limit: u32,
        offset: u32,
    ) -> AppResult<Vec<ActivityRecord>> {
        let binds = BoundaryBinds::from(boundary);
        let rows = sqlx::query_as::<_, ActivityRow>(
            r#"
            SELECT id, user_id, action, resource_type, resource_id, details, created_at
            FROM activity_log
            WHERE ($1
                OR company_id = $2
                OR site_id = $3
                OR user_id = $4)
            ORDER BY created_at DESC
            LIMIT $5
            OFFSET $6
            "#,
        )
        .bind(binds.is_global)
        .bind(binds.company)
        .bind(binds.site)
        .bind(binds.owner)
        .bind(i64::from(limit))
        .bind(i64::from(offset))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list activity: {error}")))?;

        Ok(rows
            .into_iter()
            .map(|row| ActivityRecord {
                id: row.id,
                user_id: UserId::from_uuid(row.user_id),
                action: row.action,
                resource_type: row.resource_type,
                resource_id: row.resource_id,
                details: row.details,
                created_at: row.created_at,
            })
            .collect())
    }
}
