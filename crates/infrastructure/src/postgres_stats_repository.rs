//! PostgreSQL adapter for the dashboard aggregate port.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use vantage_application::{ProposalStatusTotal, SaleTotals, StatsRepository};
use vantage_core::{AppError, AppResult};
use vantage_domain::VisibilityBoundary;

use crate::scope_binds::BoundaryBinds;

/// PostgreSQL-backed repository for scoped dashboard aggregates.
#[derive(Clone)]
pub struct PostgresStatsRepository {
    pool: PgPool,
}

impl PostgresStatsRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct StatusTotalRow {
    status: String,
    total: i64,
    amount_cents: i64,
}

#[derive(Debug, FromRow)]
struct SaleTotalsRow {
    total: i64,
    amount_cents: i64,
    commission_cents: i64,
}

#[async_trait]
impl StatsRepository for PostgresStatsRepository {
    async fn count_clients(&self, boundary: VisibilityBoundary) -> AppResult<i64> {
        let binds = BoundaryBinds::from(boundary);
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT count(*)
            FROM clients
            WHERE ($1
                OR company_id = $2
                OR site_id = $3
                OR assigned_to = $4
                OR created_by = $4)
            "#,
        )
        .bind(binds.is_global)
        .bind(binds.company)
        .bind(binds.site)
        .bind(binds.owner)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to count clients: {error}")))
    }

    async fn proposal_totals(
        &self,
        boundary: VisibilityBoundary,
    ) -> AppResult<Vec<ProposalStatusTotal>> {
        let binds = BoundaryBinds::from(boundary);
        let rows = sqlx::query_as::<_, StatusTotalRow>(
            r#"
            SELECT status,
                count(*) AS total,
                COALESCE(sum(amount_cents), 0)::BIGINT AS amount_cents
            FROM proposals
            WHERE ($1
                OR company_id = $2
                OR site_id = $3
                OR created_by = $4)
            GROUP BY status
            ORDER BY total DESC, status
            "#,
        )
        .bind(binds.is_global)
        .bind(binds.company)
        .bind(binds.site)
        .bind(binds.owner)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to group proposals: {error}")))?;

        Ok(rows
            .into_iter()
            .map(|row| ProposalStatusTotal {
                status: row.status,
                count: row.total,
                amount_cents: row.amount_cents,
            })
            .collect())
    }

    async fn sale_totals(&self, boundary: VisibilityBoundary) -> AppResult<SaleTotals> {
        let binds = BoundaryBinds::from(boundary);
        let row = sqlx::query_as::<_, SaleTotalsRow>(
            r#"
            SELECT
                count(*) AS total,
                COALESCE(sum(amount_cents), 0)::BIGINT AS amount_cents,
                COALESCE(sum(commission_cents), 0)::BIGINT AS commission_cents
            FROM sales
            WHERE ($1
                OR company_id = $2
                OR site_id = $3
                OR closed_by = $4)
            "#,
        )
        .bind(binds.is_global)
        .bind(binds.company)
        .bind(binds.site)
        .bind(binds.owner)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to total sales: {error}")))?;

        Ok(SaleTotals {
            count: row.total,
            amount_cents: row.amount_cents,
            commission_cents: row.commission_cents,
        })
    }
}
