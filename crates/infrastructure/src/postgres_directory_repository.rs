//! PostgreSQL adapter for the company/site directory port.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use vantage_application::{CompanyRecord, DirectoryRepository, SiteRecord};
use vantage_core::{AppError, AppResult};
use vantage_domain::{CompanyId, SiteId, VisibilityBoundary};

use crate::scope_binds::BoundaryBinds;

/// PostgreSQL-backed repository for companies and sites.
#[derive(Clone)]
pub struct PostgresDirectoryRepository {
    pool: PgPool,
}

impl PostgresDirectoryRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct CompanyRow {
    id: uuid::Uuid,
    name: String,
    is_active: bool,
    created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, FromRow)]
struct SiteRow {
    id: uuid::Uuid,
    company_id: uuid::Uuid,
    name: String,
    is_active: bool,
    created_at: chrono::DateTime<chrono::Utc>,
}

#[async_trait]
impl DirectoryRepository for PostgresDirectoryRepository {
    async fn list_companies(&self, boundary: VisibilityBoundary) -> AppResult<Vec<CompanyRecord>> {
        let binds = BoundaryBinds::from(boundary);
        // A site-scoped or self-scoped caller still sees the company their
        // own records live in, resolved through their assignments.
        let rows = sqlx::query_as::<_, CompanyRow>(
            r#"
            SELECT DISTINCT companies.id, companies.name, companies.is_active, companies.created_at
            FROM companies
            LEFT JOIN sites ON sites.company_id = companies.id
            LEFT JOIN role_assignments AS assignments
                ON assignments.company_id = companies.id AND assignments.is_active
            WHERE companies.is_active
                AND ($1
                    OR companies.id = $2
                    OR sites.id = $3
                    OR assignments.user_id = $4)
            ORDER BY companies.name
            "#,
        )
        .bind(binds.is_global)
        .bind(binds.company)
        .bind(binds.site)
        .bind(binds.owner)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list companies: {error}")))?;

        Ok(rows
            .into_iter()
            .map(|row| CompanyRecord {
                id: CompanyId::from_uuid(row.id),
                name: row.name,
                is_active: row.is_active,
                created_at: row.created_at,
            })
            .collect())
    }

    async fn create_company(&self, name: &str) -> AppResult<CompanyId> {
        let id = sqlx::query_scalar::<_, uuid::Uuid>(
            r#"
            INSERT INTO companies (name)
            VALUES ($1)
            RETURNING id
            "#,
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to create company: {error}")))?;

        Ok(CompanyId::from_uuid(id))
    }

    async fn company_exists(&self, company_id: CompanyId) -> AppResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM companies WHERE id = $1 AND is_active
            )
            "#,
        )
        .bind(company_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to check company: {error}")))?;

        Ok(exists)
    }

    async fn deactivate_company(&self, company_id: CompanyId) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE companies
            SET is_active = FALSE
            WHERE id = $1 AND is_active
            "#,
        )
        .bind(company_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to deactivate company: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("company not found".to_owned()));
        }

        Ok(())
    }

    async fn list_sites(
        &self,
        boundary: VisibilityBoundary,
        company_id: CompanyId,
    ) -> AppResult<Vec<SiteRecord>> {
        let binds = BoundaryBinds::from(boundary);
        let rows = sqlx::query_as::<_, SiteRow>(
            r#"
            SELECT DISTINCT sites.id, sites.company_id, sites.name, sites.is_active, sites.created_at
            FROM sites
            LEFT JOIN role_assignments AS assignments
                ON (assignments.site_id = sites.id OR assignments.company_id = sites.company_id)
                    AND assignments.is_active
            WHERE sites.is_active
                AND sites.company_id = $5
                AND ($1
                    OR sites.company_id = $2
                    OR sites.id = $3
                    OR assignments.user_id = $4)
            ORDER BY sites.name
            "#,
        )
        .bind(binds.is_global)
        .bind(binds.company)
        .bind(binds.site)
        .bind(binds.owner)
        .bind(company_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list sites: {error}")))?;

        Ok(rows
            .into_iter()
            .map(|row| SiteRecord {
                id: SiteId::from_uuid(row.id),
                company_id: CompanyId::from_uuid(row.company_id),
                name: row.name,
                is_active: row.is_active,
                created_at: row.created_at,
            })
            .collect())
    }

    async fn create_site(&self, company_id: CompanyId, name: &str) -> AppResult<SiteId> {
        let id = sqlx::query_scalar::<_, uuid::Uuid>(
            r#"
            INSERT INTO sites (company_id, name)
            VALUES ($1, $2)
            RETURNING id
            "#,
        )
        .bind(company_id.as_uuid())
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to create site: {error}")))?;

        Ok(SiteId::from_uuid(id))
    }

    async fn deactivate_site(&self, site_id: SiteId) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE sites
            SET is_active = FALSE
            WHERE id = $1 AND is_active
            "#,
        )
        .bind(site_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to deactivate site: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("site not found".to_owned()));
        }

        Ok(())
    }

    async fn site_belongs_to_company(
        &self,
        site_id: SiteId,
        company_id: CompanyId,
    ) -> AppResult<bool> {
        let belongs = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM sites
                WHERE id = $1 AND company_id = $2 AND is_active
            )
            "#,
        )
        .bind(site_id.as_uuid())
        .bind(company_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to check site: {error}")))?;

        Ok(belongs)
    }
}
