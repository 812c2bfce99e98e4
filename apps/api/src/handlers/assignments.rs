use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use uuid::Uuid;

use vantage_application::AssignRoleInput;
use vantage_core::UserIdentity;
use vantage_domain::{AssignmentId, CompanyId, RoleKind, ScopeResolution, SiteId, UserId};

use crate::dto::{AssignRoleRequest, AssignmentResponse, CreatedResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_assignments_handler(
    State(state): State<AppState>,
    Extension(resolution): Extension<ScopeResolution>,
) -> ApiResult<Json<Vec<AssignmentResponse>>> {
    let assignments = state
        .authorization_service
        .list_assignments(&resolution)
        .await?
        .into_iter()
        .map(AssignmentResponse::from)
        .collect();

    Ok(Json(assignments))
}

pub async fn assign_role_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Extension(resolution): Extension<ScopeResolution>,
    Json(payload): Json<AssignRoleRequest>,
) -> ApiResult<(StatusCode, Json<CreatedResponse>)> {
    let assignment_id = state
        .authorization_service
        .assign_role(
            &identity,
            &resolution,
            AssignRoleInput {
                user_id: UserId::from_uuid(payload.user_id),
                role: RoleKind::parse(&payload.role),
                company_id: payload.company_id.map(CompanyId::from_uuid),
                site_id: payload.site_id.map(SiteId::from_uuid),
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            id: assignment_id.as_uuid(),
        }),
    ))
}

pub async fn revoke_assignment_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Extension(resolution): Extension<ScopeResolution>,
    Path(assignment_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state
        .authorization_service
        .revoke_assignment(
            &identity,
            &resolution,
            AssignmentId::from_uuid(assignment_id),
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
