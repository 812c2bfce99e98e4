use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use uuid::Uuid;

use vantage_core::UserIdentity;
use vantage_domain::{CompanyId, ScopeResolution, SiteId};

use crate::dto::{
    CompanyResponse, CreateCompanyRequest, CreateSiteRequest, CreatedResponse, SiteResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_companies_handler(
    State(state): State<AppState>,
    Extension(resolution): Extension<ScopeResolution>,
) -> ApiResult<Json<Vec<CompanyResponse>>> {
    let companies = state
        .directory_service
        .list_companies(&resolution)
        .await?
        .into_iter()
        .map(CompanyResponse::from)
        .collect();

    Ok(Json(companies))
}

pub async fn create_company_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Extension(resolution): Extension<ScopeResolution>,
    Json(payload): Json<CreateCompanyRequest>,
) -> ApiResult<(StatusCode, Json<CreatedResponse>)> {
    let company_id = state
        .directory_service
        .create_company(&identity, &resolution, &payload.name)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            id: company_id.as_uuid(),
        }),
    ))
}

pub async fn deactivate_company_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Extension(resolution): Extension<ScopeResolution>,
    Path(company_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state
        .directory_service
        .deactivate_company(&identity, &resolution, CompanyId::from_uuid(company_id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_sites_handler(
    State(state): State<AppState>,
    Extension(resolution): Extension<ScopeResolution>,
    Path(company_id): Path<Uuid>,
) -> ApiResult<Json<Vec<SiteResponse>>> {
    let sites = state
        .directory_service
        .list_sites(&resolution, CompanyId::from_uuid(company_id))
        .await?
        .into_iter()
        .map(SiteResponse::from)
        .collect();

    Ok(Json(sites))
}

pub async fn create_site_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Extension(resolution): Extension<ScopeResolution>,
    Path(company_id): Path<Uuid>,
    Json(payload): Json<CreateSiteRequest>,
) -> ApiResult<(StatusCode, Json<CreatedResponse>)> {
    let site_id = state
        .directory_service
        .create_site(
            &identity,
            &resolution,
            CompanyId::from_uuid(company_id),
            &payload.name,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            id: site_id.as_uuid(),
        }),
    ))
}

pub async fn deactivate_site_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Extension(resolution): Extension<ScopeResolution>,
    Path((company_id, site_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    state
        .directory_service
        .deactivate_site(
            &identity,
            &resolution,
            CompanyId::from_uuid(company_id),
            SiteId::from_uuid(site_id),
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
