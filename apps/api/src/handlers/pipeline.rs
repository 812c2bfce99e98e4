use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use uuid::Uuid;

use vantage_application::{NewProposal, NewSale};
use vantage_core::UserIdentity;
use vantage_domain::{ClientId, ProposalId, ScopeResolution};

use crate::dto::{
    ChangeProposalStatusRequest, CloseSaleRequest, CreateProposalRequest, ProposalResponse,
    SaleResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_proposals_handler(
    State(state): State<AppState>,
    Extension(resolution): Extension<ScopeResolution>,
) -> ApiResult<Json<Vec<ProposalResponse>>> {
    let proposals = state
        .pipeline_service
        .list_proposals(&resolution)
        .await?
        .into_iter()
        .map(ProposalResponse::from)
        .collect();

    Ok(Json(proposals))
}

pub async fn create_proposal_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Extension(resolution): Extension<ScopeResolution>,
    Json(payload): Json<CreateProposalRequest>,
) -> ApiResult<(StatusCode, Json<ProposalResponse>)> {
    let proposal = state
        .pipeline_service
        .create_proposal(
            &identity,
            &resolution,
            NewProposal {
                client_id: ClientId::from_uuid(payload.client_id),
                title: payload.title,
                amount_cents: payload.amount_cents,
                status: payload.status,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(ProposalResponse::from(proposal))))
}

pub async fn change_proposal_status_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Extension(resolution): Extension<ScopeResolution>,
    Path(proposal_id): Path<Uuid>,
    Json(payload): Json<ChangeProposalStatusRequest>,
) -> ApiResult<Json<ProposalResponse>> {
    let proposal = state
        .pipeline_service
        .change_proposal_status(
            &identity,
            &resolution,
            ProposalId::from_uuid(proposal_id),
            &payload.status,
        )
        .await?;

    Ok(Json(ProposalResponse::from(proposal)))
}

pub async fn list_sales_handler(
    State(state): State<AppState>,
    Extension(resolution): Extension<ScopeResolution>,
) -> ApiResult<Json<Vec<SaleResponse>>> {
    let sales = state
        .pipeline_service
        .list_sales(&resolution)
        .await?
        .into_iter()
        .map(SaleResponse::from)
        .collect();

    Ok(Json(sales))
}

pub async fn close_sale_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Extension(resolution): Extension<ScopeResolution>,
    Json(payload): Json<CloseSaleRequest>,
) -> ApiResult<(StatusCode, Json<SaleResponse>)> {
    let sale = state
        .pipeline_service
        .close_sale(
            &identity,
            &resolution,
            NewSale {
                proposal_id: ProposalId::from_uuid(payload.proposal_id),
                amount_cents: payload.amount_cents,
                commission_cents: payload.commission_cents,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(SaleResponse::from(sale))))
}
