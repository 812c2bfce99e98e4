//! PostgreSQL adapter for the client repository port.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use vantage_application::{ClientRecord, ClientRepository, UpdateClient};
use vantage_core::{AppError, AppResult};
use vantage_domain::{ClientId, CompanyId, SiteId, UserId, VisibilityBoundary};

use crate::scope_binds::BoundaryBinds;

// The visibility predicate over `BoundaryBinds`: global flag, company,
// site, then the two owner references a client carries.
const VISIBLE: &str = "($1 \
    OR clients.company_id = $2 \
    OR clients.site_id = $3 \
    OR clients.assigned_to = $4 \
    OR clients.created_by = $4)";

/// PostgreSQL-backed repository for client records.
#[derive(Clone)]
pub struct PostgresClientRepository {
    pool: PgPool,
}

impl PostgresClientRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ClientRow {
    id: uuid::Uuid,
    company_id: uuid::Uuid,
    site_id: Option<uuid::Uuid>,
    assigned_to: Option<uuid::Uuid>,
    name: String,
    contact_email: Option<String>,
    created_by: uuid::Uuid,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<ClientRow> for ClientRecord {
    fn from(row: ClientRow) -> Self {
        Self {
            id: ClientId::from_uuid(row.id),
            company_id: CompanyId::from_uuid(row.company_id),
            site_id: row.site_id.map(SiteId::from_uuid),
            assigned_to: row.assigned_to.map(UserId::from_uuid),
            name: row.name,
            contact_email: row.contact_email,
            created_by: UserId::from_uuid(row.created_by),
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl ClientRepository for PostgresClientRepository {
    async fn list_visible(&self, boundary: VisibilityBoundary) -> AppResult<Vec<ClientRecord>> {
        let binds = BoundaryBinds::from(boundary);
        let query = format!(
            "SELECT id, company_id, site_id, assigned_to, name, contact_email, \
                    created_by, created_at \
             FROM clients \
             WHERE {VISIBLE} \
             ORDER BY created_at DESC"
        );

        let rows = sqlx::query_as::<_, ClientRow>(query.as_str())
            .bind(binds.is_global)
            .bind(binds.company)
            .bind(binds.site)
            .bind(binds.owner)
            .fetch_all(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to list clients: {error}")))?;

        Ok(rows.into_iter().map(ClientRecord::from).collect())
    }

    async fn find_visible(
        &self,
        boundary: VisibilityBoundary,
        client_id: ClientId,
    ) -> AppResult<Option<ClientRecord>> {
        let binds = BoundaryBinds::from(boundary);
        let query = format!(
            "SELECT id, company_id, site_id, assigned_to, name, contact_email, \
                    created_by, created_at \
             FROM clients \
             WHERE id = $5 AND {VISIBLE}"
        );

        let row = sqlx::query_as::<_, ClientRow>(query.as_str())
            .bind(binds.is_global)
            .bind(binds.company)
            .bind(binds.site)
            .bind(binds.owner)
            .bind(client_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to find client: {error}")))?;

        Ok(row.map(ClientRecord::from))
    }

    async fn insert(&self, record: &ClientRecord) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO clients
                (id, company_id, site_id, assigned_to, name, contact_email, created_by, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(record.company_id.as_uuid())
        .bind(record.site_id.map(|id| id.as_uuid()))
        .bind(record.assigned_to.map(|id| id.as_uuid()))
        .bind(record.name.as_str())
        .bind(record.contact_email.as_deref())
        .bind(record.created_by.as_uuid())
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to insert client: {error}")))?;

        Ok(())
    }

    async fn update(&self, client_id: ClientId, changes: UpdateClient) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE clients
            SET
                name = COALESCE($2, name),
                assigned_to = COALESCE($3, assigned_to),
                contact_email = COALESCE($4, contact_email)
            WHERE id = $1
            "#,
        )
        .bind(client_id.as_uuid())
        .bind(changes.name)
        .bind(changes.assigned_to.map(|id| id.as_uuid()))
        .bind(changes.contact_email)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update client: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("client not found".to_owned()));
        }

        Ok(())
    }
}
