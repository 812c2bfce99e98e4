use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use uuid::Uuid;

use vantage_application::{NewClient, UpdateClient};
use vantage_core::{AppError, UserIdentity};
use vantage_domain::{ClientId, CompanyId, ScopeResolution, SiteId, UserId};

use crate::dto::{ClientResponse, CreateClientRequest, UpdateClientRequest};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_clients_handler(
    State(state): State<AppState>,
    Extension(resolution): Extension<ScopeResolution>,
) -> ApiResult<Json<Vec<ClientResponse>>> {
    let clients = state
        .client_service
        .list(&resolution)
        .await?
        .into_iter()
        .map(ClientResponse::from)
        .collect();

    Ok(Json(clients))
}

pub async fn create_client_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Extension(resolution): Extension<ScopeResolution>,
    Json(payload): Json<CreateClientRequest>,
) -> ApiResult<(StatusCode, Json<ClientResponse>)> {
    let client = state
        .client_service
        .create(
            &identity,
            &resolution,
            NewClient {
                company_id: CompanyId::from_uuid(payload.company_id),
                site_id: payload.site_id.map(SiteId::from_uuid),
                assigned_to: payload.assigned_to.map(UserId::from_uuid),
                name: payload.name,
                contact_email: payload.contact_email,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(ClientResponse::from(client))))
}

pub async fn update_client_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Extension(resolution): Extension<ScopeResolution>,
    Path(client_id): Path<Uuid>,
    Json(payload): Json<UpdateClientRequest>,
) -> ApiResult<Json<ClientResponse>> {
    let client_id = ClientId::from_uuid(client_id);

    state
        .client_service
        .update(
            &identity,
            &resolution,
            client_id,
            UpdateClient {
                name: payload.name,
                assigned_to: payload.assigned_to.map(UserId::from_uuid),
                contact_email: payload.contact_email,
            },
        )
        .await?;

    let client = state
        .client_service
        .find(&resolution, client_id)
        .await?
        .ok_or_else(|| AppError::NotFound("client not found".to_owned()))?;

    Ok(Json(ClientResponse::from(client)))
}
