//! PostgreSQL adapter for the proposal/sale pipeline port.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use vantage_application::{PipelineRepository, ProposalRecord, SaleRecord};
use vantage_core::{AppError, AppResult};
use vantage_domain::{
    ClientId, CompanyId, ProposalId, ProposalStatus, SaleId, SiteId, UserId, VisibilityBoundary,
};

use crate::scope_binds::BoundaryBinds;

const PROPOSAL_VISIBLE: &str = "($1 \
    OR proposals.company_id = $2 \
    OR proposals.site_id = $3 \
    OR proposals.created_by = $4)";

const SALE_VISIBLE: &str = "($1 \
    OR sales.company_id = $2 \
    OR sales.site_id = $3 \
    OR sales.closed_by = $4)";

/// PostgreSQL-backed repository for proposals and sales.
#[derive(Clone)]
pub struct PostgresPipelineRepository {
    pool: PgPool,
}

impl PostgresPipelineRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ProposalRow {
    id: uuid::Uuid,
    client_id: uuid::Uuid,
    company_id: uuid::Uuid,
    site_id: Option<uuid::Uuid>,
    created_by: uuid::Uuid,
    title: String,
    amount_cents: i64,
    status: String,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<ProposalRow> for ProposalRecord {
    type Error = AppError;

    fn try_from(row: ProposalRow) -> AppResult<Self> {
        Ok(Self {
            id: ProposalId::from_uuid(row.id),
            client_id: ClientId::from_uuid(row.client_id),
            company_id: CompanyId::from_uuid(row.company_id),
            site_id: row.site_id.map(SiteId::from_uuid),
            created_by: UserId::from_uuid(row.created_by),
            title: row.title,
            amount_cents: row.amount_cents,
            status: ProposalStatus::new(row.status)?,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct SaleRow {
    id: uuid::Uuid,
    proposal_id: uuid::Uuid,
    company_id: uuid::Uuid,
    site_id: Option<uuid::Uuid>,
    closed_by: uuid::Uuid,
    amount_cents: i64,
    commission_cents: Option<i64>,
    closed_at: chrono::DateTime<chrono::Utc>,
}

impl From<SaleRow> for SaleRecord {
    fn from(row: SaleRow) -> Self {
        Self {
            id: SaleId::from_uuid(row.id),
            proposal_id: ProposalId::from_uuid(row.proposal_id),
            company_id: CompanyId::from_uuid(row.company_id),
            site_id: row.site_id.map(SiteId::from_uuid),
            closed_by: UserId::from_uuid(row.closed_by),
            amount_cents: row.amount_cents,
            commission_cents: row.commission_cents,
            closed_at: row.closed_at,
        }
    }
}

#[async_trait]
impl PipelineRepository for PostgresPipelineRepository {
    async fn list_proposals(
        &self,
        boundary: VisibilityBoundary,
    ) -> AppResult<Vec<ProposalRecord>> {
        let binds = BoundaryBinds::from(boundary);
        let query = format!(
            "SELECT id, client_id, company_id, site_id, created_by, title, \
                    amount_cents, status, created_at \
             FROM proposals \
             WHERE {PROPOSAL_VISIBLE} \
             ORDER BY created_at DESC"
        );

        let rows = sqlx::query_as::<_, ProposalRow>(query.as_str())
            .bind(binds.is_global)
            .bind(binds.company)
            .bind(binds.site)
            .bind(binds.owner)
            .fetch_all(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to list proposals: {error}")))?;

        rows.into_iter().map(ProposalRecord::try_from).collect()
    }

    async fn find_proposal(
        &self,
        boundary: VisibilityBoundary,
        proposal_id: ProposalId,
    ) -> AppResult<Option<ProposalRecord>> {
        let binds = BoundaryBinds::from(boundary);
        let query = format!(
            "SELECT id, client_id, company_id, site_id, created_by, title, \
                    amount_cents, status, created_at \
             FROM proposals \
             WHERE id = $5 AND {PROPOSAL_VISIBLE}"
        );

        let row = sqlx::query_as::<_, ProposalRow>(query.as_str())
            .bind(binds.is_global)
            .bind(binds.company)
            .bind(binds.site)
            .bind(binds.owner)
            .bind(proposal_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to find proposal: {error}")))?;

        row.map(ProposalRecord::try_from).transpose()
    }

    async fn insert_proposal(&self, record: &ProposalRecord) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO proposals
                (id, client_id, company_id, site_id, created_by, title,
                 amount_cents, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(record.client_id.as_uuid())
        .bind(record.company_id.as_uuid())
        .bind(record.site_id.map(|id| id.as_uuid()))
        .bind(record.created_by.as_uuid())
        .bind(record.title.as_str())
        .bind(record.amount_cents)
        .bind(record.status.as_str())
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to insert proposal: {error}")))?;

        Ok(())
    }

    async fn update_proposal_status(
        &self,
        proposal_id: ProposalId,
        status: &ProposalStatus,
    ) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE proposals
            SET status = $2
            WHERE id = $1
            "#,
        )
        .bind(proposal_id.as_uuid())
        .bind(status.as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to update proposal status: {error}"))
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("proposal not found".to_owned()));
        }

        Ok(())
    }

    async fn list_sales(&self, boundary: VisibilityBoundary) -> AppResult<Vec<SaleRecord>> {
        let binds = BoundaryBinds::from(boundary);
        let query = format!(
            "SELECT id, proposal_id, company_id, site_id, closed_by, \
                    amount_cents, commission_cents, closed_at \
             FROM sales \
             WHERE {SALE_VISIBLE} \
             ORDER BY closed_at DESC"
        );

        let rows = sqlx::query_as::<_, SaleRow>(query.as_str())
            .bind(binds.is_global)
            .bind(binds.company)
            .bind(binds.site)
            .bind(binds.owner)
            .fetch_all(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to list sales: {error}")))?;

        Ok(rows.into_iter().map(SaleRecord::from).collect())
    }

    async fn sale_exists_for_proposal(&self, proposal_id: ProposalId) -> AppResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM sales WHERE proposal_id = $1
            )
            "#,
        )
        .bind(proposal_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to check for a sale: {error}")))?;

        Ok(exists)
    }

    async fn insert_sale(&self, record: &SaleRecord) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO sales
                (id, proposal_id, company_id, site_id, closed_by,
                 amount_cents, commission_cents, closed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(record.proposal_id.as_uuid())
        .bind(record.company_id.as_uuid())
        .bind(record.site_id.map(|id| id.as_uuid()))
        .bind(record.closed_by.as_uuid())
        .bind(record.amount_cents)
        .bind(record.commission_cents)
        .bind(record.closed_at)
        .execute(&self.pool)
        .await
        .map_err(|error| match error {
            sqlx::Error::Database(db_error) if db_error.is_unique_violation() => {
                AppError::Conflict("proposal already has a sale recorded".to_owned())
            }
            other => AppError::Internal(format!("failed to insert sale: {other}")),
        })?;

        Ok(())
    }
}
