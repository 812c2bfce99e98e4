//! Dashboard statistics: scoped aggregates over the whole data set.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use vantage_core::{AppError, AppResult};
use vantage_domain::{ScopeResolution, VisibilityBoundary};

// Upper bound on the aggregate fan-out; a slow store surfaces as a
// retryable failure instead of a view stuck loading forever.
const QUERY_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Ports
// ---------------------------------------------------------------------------

/// Proposal count and pipeline amount for one status value.
#[derive(Debug, Clone, Serialize)]
pub struct ProposalStatusTotal {
    /// Normalized status value.
    pub status: String,
    /// Number of visible proposals with that status.
    pub count: i64,
    /// Sum of their amounts in cents.
    pub amount_cents: i64,
}

/// Aggregate over visible sales.
#[derive(Debug, Clone, Serialize)]
pub struct SaleTotals {
    /// Number of visible sales.
    pub count: i64,
    /// Sum of sale amounts in cents.
    pub amount_cents: i64,
    /// Sum of commissions in cents.
    pub commission_cents: i64,
}

/// The full dashboard payload.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    /// Number of visible clients.
    pub client_count: i64,
    /// Visible proposals grouped by status.
    pub proposals_by_status: Vec<ProposalStatusTotal>,
    /// Totals over visible sales.
    pub sales: SaleTotals,
}

/// Repository port for scoped aggregate queries.
#[async_trait]
pub trait StatsRepository: Send + Sync {
    /// Counts clients visible under the boundary.
    async fn count_clients(&self, boundary: VisibilityBoundary) -> AppResult<i64>;

    /// Groups visible proposals by status.
    async fn proposal_totals(
        &self,
        boundary: VisibilityBoundary,
    ) -> AppResult<Vec<ProposalStatusTotal>>;

    /// Sums visible sales.
    async fn sale_totals(&self, boundary: VisibilityBoundary) -> AppResult<SaleTotals>;
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Application service computing the dashboard view.
#[derive(Clone)]
pub struct StatsService {
    repository: Arc<dyn StatsRepository>,
}

impl StatsService {
    /// Creates a new stats service.
    #[must_use]
    pub fn new(repository: Arc<dyn StatsRepository>) -> Self {
        Self { repository }
    }

    /// Computes the dashboard for the caller's boundary.
    ///
    /// The three aggregates are independent, so they run concurrently and
    /// the view is assembled once all have settled. Returns `None` for an
    /// unassigned caller, who has no dashboard to compute.
    pub async fn dashboard(
        &self,
        resolution: &ScopeResolution,
    ) -> AppResult<Option<DashboardStats>> {
        let Some(boundary) = resolution.boundary() else {
            return Ok(None);
        };

        let (clients, proposals, sales) = tokio::time::timeout(
            QUERY_TIMEOUT,
            async {
                tokio::join!(
                    self.repository.count_clients(boundary),
                    self.repository.proposal_totals(boundary),
                    self.repository.sale_totals(boundary),
                )
            },
        )
        .await
        .map_err(|_| AppError::Internal("dashboard queries timed out".to_owned()))?;

        Ok(Some(DashboardStats {
            client_count: clients?,
            proposals_by_status: proposals?,
            sales: sales?,
        }))
    }
}

#[cfg(test)]
mod tests;
