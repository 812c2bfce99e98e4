use axum::Json;
use axum::extract::{Extension, State};
use axum::http::HeaderMap;
use tower_sessions::Session;

use vantage_application::{AuthOutcome, RegisterParams};
use vantage_core::{AppError, UserIdentity};
use vantage_domain::UserId;

use crate::dto::{
    ChangePasswordRequest, GenericMessageResponse, LoginRequest, RegisterRequest,
    SessionUserResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

use super::session_helpers::client_address;
use super::{SESSION_SCOPE_KEY, SESSION_USER_KEY};

/// POST /auth/register - create a new account with email and password.
pub async fn register_handler(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<Json<GenericMessageResponse>> {
    state
        .user_service
        .register(RegisterParams {
            email: payload.email,
            password: payload.password,
            display_name: payload.display_name,
        })
        .await?;

    Ok(Json(GenericMessageResponse {
        message: "account created, you can now sign in".to_owned(),
    }))
}

/// POST /auth/login - authenticate with email and password.
///
/// Any failure is reported as the same `invalid credentials` message so
/// the response never reveals whether the email exists.
pub async fn login_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<SessionUserResponse>> {
    let outcome = state
        .user_service
        .login(&payload.email, &payload.password)
        .await?;

    let AuthOutcome::Authenticated(user) = outcome else {
        return Err(AppError::Unauthorized("invalid credentials".to_owned()).into());
    };

    // Role fetch failure aborts the login; no partial session is created.
    let resolution = state
        .authorization_service
        .resolve_for_user(user.id)
        .await?;

    let identity = UserIdentity::new(user.id.as_uuid(), user.display_name, user.email);

    // Regenerate the session id on privilege change.
    session
        .cycle_id()
        .await
        .map_err(|error| AppError::Internal(format!("failed to cycle session id: {error}")))?;
    session
        .insert(SESSION_USER_KEY, &identity)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to persist session identity: {error}"))
        })?;
    session
        .insert(SESSION_SCOPE_KEY, &resolution)
        .await
        .map_err(|error| AppError::Internal(format!("failed to persist session scope: {error}")))?;

    state.user_service.record_login(user.id).await?;

    // A successful login reopens the caller's attempt budget.
    if let Some(address) = client_address(&headers) {
        state
            .rate_limit_service
            .reset(vantage_application::RateLimitRule::LOGIN, &address)
            .await?;
    }

    Ok(Json(SessionUserResponse::from_parts(&identity, &resolution)))
}

/// PUT /api/profile/password - change the current user's password.
pub async fn change_password_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Json(payload): Json<ChangePasswordRequest>,
) -> ApiResult<Json<GenericMessageResponse>> {
    state
        .user_service
        .change_password(
            UserId::from_uuid(identity.user_id()),
            &payload.current_password,
            &payload.new_password,
        )
        .await?;

    Ok(Json(GenericMessageResponse {
        message: "password updated".to_owned(),
    }))
}
