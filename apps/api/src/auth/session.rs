use axum::Json;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use tower_sessions::Session;

use vantage_core::{AppError, UserIdentity};
use vantage_domain::{ScopeResolution, UserId};

use crate::dto::SessionUserResponse;
use crate::error::ApiResult;
use crate::state::AppState;

use super::SESSION_USER_KEY;

/// POST /auth/logout - clear the session.
///
/// Idempotent: a second logout with no session left still clears and
/// returns success.
pub async fn logout_handler(
    State(state): State<AppState>,
    session: Session,
) -> ApiResult<StatusCode> {
    let identity = session
        .get::<UserIdentity>(SESSION_USER_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session identity: {error}")))?;

    session
        .delete()
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete session: {error}")))?;

    if let Some(identity) = identity {
        state
            .user_service
            .record_logout(UserId::from_uuid(identity.user_id()))
            .await?;
    }

    Ok(StatusCode::NO_CONTENT)
}

/// GET /auth/me - the authenticated user with their resolved scope.
pub async fn me_handler(
    Extension(identity): Extension<UserIdentity>,
    Extension(resolution): Extension<ScopeResolution>,
) -> ApiResult<Json<SessionUserResponse>> {
    Ok(Json(SessionUserResponse::from_parts(&identity, &resolution)))
}
