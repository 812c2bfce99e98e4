//! PostgreSQL adapter for the role assignment repository port.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use vantage_application::{AssignmentRecord, AssignmentRepository};
use vantage_core::{AppError, AppResult};
use vantage_domain::{
    AssignmentId, CompanyId, RoleAssignment, RoleKind, SiteId, UserId, VisibilityBoundary,
};

use crate::scope_binds::BoundaryBinds;

/// PostgreSQL-backed repository for role assignments.
#[derive(Clone)]
pub struct PostgresAssignmentRepository {
    pool: PgPool,
}

impl PostgresAssignmentRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct AssignmentRow {
    id: uuid::Uuid,
    user_id: uuid::Uuid,
    role_key: String,
    company_id: Option<uuid::Uuid>,
    site_id: Option<uuid::Uuid>,
    assigned_by: uuid::Uuid,
    assigned_at: chrono::DateTime<chrono::Utc>,
    is_active: bool,
}

impl From<AssignmentRow> for RoleAssignment {
    fn from(row: AssignmentRow) -> Self {
        Self {
            id: AssignmentId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            role: RoleKind::parse(row.role_key.as_str()),
            company_id: row.company_id.map(CompanyId::from_uuid),
            site_id: row.site_id.map(SiteId::from_uuid),
            assigned_by: UserId::from_uuid(row.assigned_by),
            assigned_at: row.assigned_at,
            is_active: row.is_active,
        }
    }
}

#[derive(Debug, FromRow)]
struct AssignmentListRow {
    id: uuid::Uuid,
    user_id: uuid::Uuid,
    user_email: String,
    role_key: String,
    company_id: Option<uuid::Uuid>,
    company_name: Option<String>,
    site_id: Option<uuid::Uuid>,
    site_name: Option<String>,
    assigned_by: uuid::Uuid,
    assigned_at: chrono::DateTime<chrono::Utc>,
    is_active: bool,
}

#[async_trait]
impl AssignmentRepository for PostgresAssignmentRepository {
    async fn list_active_for_user(&self, user_id: UserId) -> AppResult<Vec<RoleAssignment>> {
        let rows = sqlx::query_as::<_, AssignmentRow>(
            r#"
            SELECT id, user_id, role_key, company_id, site_id,
                   assigned_by, assigned_at, is_active
            FROM role_assignments
            WHERE user_id = $1 AND is_active
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list assignments: {error}")))?;

        Ok(rows.into_iter().map(RoleAssignment::from).collect())
    }

    async fn list_visible(
        &self,
        boundary: VisibilityBoundary,
    ) -> AppResult<Vec<AssignmentRecord>> {
        let binds = BoundaryBinds::from(boundary);
        let rows = sqlx::query_as::<_, AssignmentListRow>(
            r#"
            SELECT
                assignments.id,
                assignments.user_id,
                users.email AS user_email,
                assignments.role_key,
                assignments.company_id,
                companies.name AS company_name,
                assignments.site_id,
                sites.name AS site_name,
                assignments.assigned_by,
                assignments.assigned_at,
                assignments.is_active
            FROM role_assignments AS assignments
            JOIN users ON users.id = assignments.user_id
            LEFT JOIN companies ON companies.id = assignments.company_id
            LEFT JOIN sites ON sites.id = assignments.site_id
            WHERE assignments.is_active
                AND ($1
                    OR assignments.company_id = $2
                    OR assignments.site_id = $3
                    OR assignments.user_id = $4)
            ORDER BY assignments.assigned_at DESC
            "#,
        )
        .bind(binds.is_global)
        .bind(binds.company)
        .bind(binds.site)
        .bind(binds.owner)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list assignments: {error}")))?;

        Ok(rows
            .into_iter()
            .map(|row| AssignmentRecord {
                id: AssignmentId::from_uuid(row.id),
                user_id: UserId::from_uuid(row.user_id),
                user_email: row.user_email,
                role: RoleKind::parse(row.role_key.as_str()),
                company_id: row.company_id.map(CompanyId::from_uuid),
                company_name: row.company_name,
                site_id: row.site_id.map(SiteId::from_uuid),
                site_name: row.site_name,
                assigned_by: UserId::from_uuid(row.assigned_by),
                assigned_at: row.assigned_at,
                is_active: row.is_active,
            })
            .collect())
    }

    async fn find_by_id(&self, assignment_id: AssignmentId) -> AppResult<Option<RoleAssignment>> {
        let row = sqlx::query_as::<_, AssignmentRow>(
            r#"
            SELECT id, user_id, role_key, company_id, site_id,
                   assigned_by, assigned_at, is_active
            FROM role_assignments
            WHERE id = $1
            "#,
        )
        .bind(assignment_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find assignment: {error}")))?;

        Ok(row.map(RoleAssignment::from))
    }

    async fn insert(&self, assignment: &RoleAssignment) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO role_assignments
                (id, user_id, role_key, company_id, site_id, assigned_by, assigned_at, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(assignment.id.as_uuid())
        .bind(assignment.user_id.as_uuid())
        .bind(assignment.role.as_str())
        .bind(assignment.company_id.map(|id| id.as_uuid()))
        .bind(assignment.site_id.map(|id| id.as_uuid()))
        .bind(assignment.assigned_by.as_uuid())
        .bind(assignment.assigned_at)
        .bind(assignment.is_active)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to insert assignment: {error}")))?;

        Ok(())
    }

    async fn revoke(&self, assignment_id: AssignmentId) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE role_assignments
            SET is_active = FALSE
            WHERE id = $1
            "#,
        )
        .bind(assignment_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to revoke assignment: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("assignment not found".to_owned()));
        }

        Ok(())
    }
}
