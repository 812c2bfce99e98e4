use axum::Json;
use axum::extract::{Extension, State};

use vantage_domain::ScopeResolution;

use crate::dto::DashboardResponse;
use crate::error::ApiResult;
use crate::state::AppState;

/// Returns the role-scoped dashboard aggregates.
///
/// A caller without an active role gets a restricted payload rather than
/// an error.
pub async fn dashboard_stats_handler(
    State(state): State<AppState>,
    Extension(resolution): Extension<ScopeResolution>,
) -> ApiResult<Json<DashboardResponse>> {
    let stats = state.stats_service.dashboard(&resolution).await?;

    Ok(Json(DashboardResponse {
        restricted: stats.is_none(),
        stats,
    }))
}
