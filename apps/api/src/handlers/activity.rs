use axum::Json;
use axum::extract::{Extension, Query, State};

use vantage_domain::ScopeResolution;

use crate::dto::{ActivityQuery, ActivityResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_activity_handler(
    State(state): State<AppState>,
    Extension(resolution): Extension<ScopeResolution>,
    Query(query): Query<ActivityQuery>,
) -> ApiResult<Json<Vec<ActivityResponse>>> {
    let entries = state
        .activity_service
        .list(&resolution, query.limit, query.offset)
        .await?
        .into_iter()
        .map(ActivityResponse::from)
        .collect();

    Ok(Json(entries))
}
