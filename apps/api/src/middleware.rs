use axum::extract::{Request, State};
use axum::http::{HeaderValue, Method, header};
use axum::middleware::Next;
use axum::response::Response;
use tower_sessions::Session;

use vantage_application::RateLimitRule;
use vantage_core::{AppError, UserIdentity};
use vantage_domain::{ScopeResolution, UserId};

use crate::auth::{SESSION_SCOPE_KEY, SESSION_USER_KEY};
use crate::auth::session_helpers::client_address;
use crate::error::ApiResult;
use crate::state::AppState;

/// Requires an authenticated session and injects the identity plus the
/// caller's scope resolution into request extensions.
///
/// The resolution is cached in the session at login; if a revocation
/// removed it, it is re-resolved here so the boundary never goes stale
/// for longer than one request.
pub async fn require_auth(
    State(state): State<AppState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let identity = session
        .get::<UserIdentity>(SESSION_USER_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session identity: {error}")))?
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

    let resolution = match session
        .get::<ScopeResolution>(SESSION_SCOPE_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session scope: {error}")))?
    {
        Some(resolution) => resolution,
        None => {
            let resolution = state
                .authorization_service
                .resolve_for_user(UserId::from_uuid(identity.user_id()))
                .await?;
            session
                .insert(SESSION_SCOPE_KEY, &resolution)
                .await
                .map_err(|error| {
                    AppError::Internal(format!("failed to persist session scope: {error}"))
                })?;
            resolution
        }
    };

    request.extensions_mut().insert(identity);
    request.extensions_mut().insert(resolution);
    Ok(next.run(request).await)
}

/// Rejects cross-site mutations. Browser-held session cookies make every
/// state-changing route a CSRF target, so origin and referer must match
/// the configured frontend.
pub async fn require_same_origin_for_mutations(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    if is_state_changing_method(request.method()) {
        let headers = request.headers();

        if let Some(fetch_site) = headers.get("sec-fetch-site")
            && fetch_site == HeaderValue::from_static("cross-site")
        {
            return Err(AppError::Unauthorized("cross-site request blocked".to_owned()).into());
        }

        let origin = headers
            .get(header::ORIGIN)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        let referer = headers
            .get(header::REFERER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();

        let allowed_origin = state.frontend_url;
        if origin != allowed_origin && !referer.starts_with(&allowed_origin) {
            return Err(AppError::Unauthorized("origin validation failed".to_owned()).into());
        }
    }

    Ok(next.run(request).await)
}

/// Counts an attempt against the rule attached to the route and rejects
/// the request once the budget is spent.
pub async fn rate_limit(
    State(state): State<AppState>,
    axum::Extension(rule): axum::Extension<RateLimitRule>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    let identifier = client_address(request.headers()).unwrap_or_else(|| "unknown".to_owned());
    state.rate_limit_service.check(rule, &identifier).await?;

    Ok(next.run(request).await)
}

fn is_state_changing_method(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}
