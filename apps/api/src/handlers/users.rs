use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use uuid::Uuid;

use vantage_core::UserIdentity;
use vantage_domain::{ScopeResolution, UserId};

use crate::error::ApiResult;
use crate::state::AppState;

pub async fn deactivate_user_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Extension(resolution): Extension<ScopeResolution>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state
        .user_service
        .deactivate(&identity, &resolution, UserId::from_uuid(user_id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
