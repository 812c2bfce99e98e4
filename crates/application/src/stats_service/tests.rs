use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use chrono::Utc;

use vantage_core::{AppError, AppResult};
use vantage_domain::{
    AssignmentId, CompanyId, RoleAssignment, RoleKind, ScopeResolution, UserId, VisibilityBoundary,
};

use super::{DashboardStats, ProposalStatusTotal, SaleTotals, StatsRepository, StatsService};

struct FakeStatsRepository {
    queries: AtomicU32,
    fail_sales: bool,
}

impl FakeStatsRepository {
    fn new(fail_sales: bool) -> Self {
        Self {
            queries: AtomicU32::new(0),
            fail_sales,
        }
    }
}

#[async_trait]
impl StatsRepository for FakeStatsRepository {
    async fn count_clients(&self, _boundary: VisibilityBoundary) -> AppResult<i64> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        Ok(4)
    }

    async fn proposal_totals(
        &self,
        _boundary: VisibilityBoundary,
    ) -> AppResult<Vec<ProposalStatusTotal>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        Ok(vec![
            ProposalStatusTotal {
                status: "pending".to_owned(),
                count: 2,
                amount_cents: 120_000_00,
            },
            ProposalStatusTotal {
                status: "closed".to_owned(),
                count: 1,
                amount_cents: 48_000_00,
            },
        ])
    }

    async fn sale_totals(&self, _boundary: VisibilityBoundary) -> AppResult<SaleTotals> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if self.fail_sales {
            return Err(AppError::Internal("sales aggregate failed".to_owned()));
        }
        Ok(SaleTotals {
            count: 1,
            amount_cents: 48_000_00,
            commission_cents: 2_400_00,
        })
    }
}

fn company_resolution(company_id: CompanyId) -> ScopeResolution {
    let user_id = UserId::new();
    ScopeResolution::Resolved {
        primary: RoleAssignment {
            id: AssignmentId::new(),
            user_id,
            role: RoleKind::CompanyAdmin,
            company_id: Some(company_id),
            site_id: None,
            assigned_by: UserId::new(),
            assigned_at: Utc::now(),
            is_active: true,
        },
        boundary: VisibilityBoundary::Company(company_id),
    }
}

#[tokio::test]
async fn dashboard_joins_all_three_aggregates() {
    let repository = Arc::new(FakeStatsRepository::new(false));
    let service = StatsService::new(repository.clone());

    let stats = service.dashboard(&company_resolution(CompanyId::new())).await;

    assert!(stats.is_ok_and(|stats| matches!(
        stats,
        Some(DashboardStats {
            client_count: 4,
            ref proposals_by_status,
            sales: SaleTotals { count: 1, .. },
        }) if proposals_by_status.len() == 2
            && proposals_by_status[0].count == 2
            && proposals_by_status[0].amount_cents == 120_000_00
            && proposals_by_status[1].amount_cents == 48_000_00
    )));
    assert_eq!(repository.queries.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn one_failed_aggregate_fails_the_whole_view() {
    let service = StatsService::new(Arc::new(FakeStatsRepository::new(true)));

    let stats = service.dashboard(&company_resolution(CompanyId::new())).await;

    assert!(matches!(stats, Err(AppError::Internal(_))));
}

#[tokio::test]
async fn unassigned_caller_gets_no_dashboard_and_no_queries() {
    let repository = Arc::new(FakeStatsRepository::new(false));
    let service = StatsService::new(repository.clone());

    let stats = service.dashboard(&ScopeResolution::Unassigned).await;

    assert!(stats.is_ok_and(|stats| stats.is_none()));
    assert_eq!(repository.queries.load(Ordering::SeqCst), 0);
}
