//! The proposal/sale pipeline.
//!
//! Client, proposal and sale form a forward-only chain: a proposal always
//! references a client, a sale always references exactly one proposal. Once
//! a sale exists, its proposal is frozen so the downstream record stays
//! consistent.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use vantage_core::{AppError, AppResult, UserIdentity};
use vantage_domain::{
    ActivityAction, ClientId, CompanyId, ProposalId, ProposalStatus, SaleId, ScopeResolution,
    SiteId, UserId, VisibilityBoundary,
};

use crate::authorization_service::AuthorizationService;
use crate::client_service::ClientRepository;
use crate::{ActivityEntry, ActivityService};

// ---------------------------------------------------------------------------
// Ports
// ---------------------------------------------------------------------------

/// Proposal row returned by repository queries.
///
/// Company and site are denormalized from the owning client so the visibility
/// predicate resolves without a join at the call site.
#[derive(Debug, Clone)]
pub struct ProposalRecord {
    /// Unique proposal identifier.
    pub id: ProposalId,
    /// The client this proposal was drafted for.
    pub client_id: ClientId,
    /// Company inherited from the client.
    pub company_id: CompanyId,
    /// Site inherited from the client, if any.
    pub site_id: Option<SiteId>,
    /// The user who created the proposal.
    pub created_by: UserId,
    /// Short proposal title.
    pub title: String,
    /// Proposed amount in cents.
    pub amount_cents: i64,
    /// Current status.
    pub status: ProposalStatus,
    /// When the proposal was created.
    pub created_at: DateTime<Utc>,
}

/// Sale row returned by repository queries.
#[derive(Debug, Clone)]
pub struct SaleRecord {
    /// Unique sale identifier.
    pub id: SaleId,
    /// The proposal this sale closed.
    pub proposal_id: ProposalId,
    /// Company inherited from the proposal's client.
    pub company_id: CompanyId,
    /// Site inherited from the proposal's client, if any.
    pub site_id: Option<SiteId>,
    /// The user who closed the sale.
    pub closed_by: UserId,
    /// Final amount in cents.
    pub amount_cents: i64,
    /// Commission in cents, if any.
    pub commission_cents: Option<i64>,
    /// When the sale was closed.
    pub closed_at: DateTime<Utc>,
}

/// Parameters for creating a proposal.
#[derive(Debug, Clone)]
pub struct NewProposal {
    /// The client the proposal is for.
    pub client_id: ClientId,
    /// Short proposal title.
    pub title: String,
    /// Proposed amount in cents.
    pub amount_cents: i64,
    /// Initial status; defaults to draft when absent.
    pub status: Option<String>,
}

/// Parameters for closing a sale against a proposal.
#[derive(Debug, Clone)]
pub struct NewSale {
    /// The proposal being closed.
    pub proposal_id: ProposalId,
    /// Final amount in cents.
    pub amount_cents: i64,
    /// Commission in cents, if any.
    pub commission_cents: Option<i64>,
}

/// Repository port for proposal and sale persistence.
#[async_trait]
pub trait PipelineRepository: Send + Sync {
    /// Lists proposals visible under the boundary.
    async fn list_proposals(&self, boundary: VisibilityBoundary)
    -> AppResult<Vec<ProposalRecord>>;

    /// Finds one proposal, only if visible under the boundary.
    async fn find_proposal(
        &self,
        boundary: VisibilityBoundary,
        proposal_id: ProposalId,
    ) -> AppResult<Option<ProposalRecord>>;

    /// Persists a new proposal.
    async fn insert_proposal(&self, record: &ProposalRecord) -> AppResult<()>;

    /// Replaces a proposal's status.
    async fn update_proposal_status(
        &self,
        proposal_id: ProposalId,
        status: &ProposalStatus,
    ) -> AppResult<()>;

    /// Lists sales visible under the boundary.
    async fn list_sales(&self, boundary: VisibilityBoundary) -> AppResult<Vec<SaleRecord>>;

    /// Returns whether a sale already references the proposal.
    async fn sale_exists_for_proposal(&self, proposal_id: ProposalId) -> AppResult<bool>;

    /// Persists a new sale. Must reject a second sale for the same proposal
    /// with [`AppError::Conflict`].
    async fn insert_sale(&self, record: &SaleRecord) -> AppResult<()>;
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Application service for the proposal/sale pipeline.
#[derive(Clone)]
pub struct PipelineService {
    repository: Arc<dyn PipelineRepository>,
    client_repository: Arc<dyn ClientRepository>,
    authorization_service: AuthorizationService,
    activity_service: ActivityService,
}

impl PipelineService {
    /// Creates a new pipeline service.
    #[must_use]
    pub fn new(
        repository: Arc<dyn PipelineRepository>,
        client_repository: Arc<dyn ClientRepository>,
        authorization_service: AuthorizationService,
        activity_service: ActivityService,
    ) -> Self {
        Self {
            repository,
            client_repository,
            authorization_service,
            activity_service,
        }
    }

    /// Lists proposals visible to the caller.
    pub async fn list_proposals(
        &self,
        resolution: &ScopeResolution,
    ) -> AppResult<Vec<ProposalRecord>> {
        let Some(boundary) = resolution.boundary() else {
            return Ok(Vec::new());
        };

        self.repository.list_proposals(boundary).await
    }

    /// Lists sales visible to the caller.
    pub async fn list_sales(&self, resolution: &ScopeResolution) -> AppResult<Vec<SaleRecord>> {
        let Some(boundary) = resolution.boundary() else {
            return Ok(Vec::new());
        };

        self.repository.list_sales(boundary).await
    }

    /// Creates a proposal for a client the caller can see and write to.
    ///
    /// The proposal inherits the client's company and site, and the creator
    /// is stamped from the authenticated identity.
    pub async fn create_proposal(
        &self,
        actor: &UserIdentity,
        resolution: &ScopeResolution,
        input: NewProposal,
    ) -> AppResult<ProposalRecord> {
        let Some(boundary) = resolution.boundary() else {
            return Err(AppError::Forbidden("no role assigned".to_owned()));
        };

        let client = self
            .client_repository
            .find_visible(boundary, input.client_id)
            .await?
            .ok_or_else(|| AppError::NotFound("client not found".to_owned()))?;

        self.authorization_service.ensure_can_write(
            resolution,
            Some(client.company_id),
            client.site_id,
        )?;

        let title = input.title.trim().to_owned();
        if title.is_empty() {
            return Err(AppError::Validation(
                "proposal title must not be empty".to_owned(),
            ));
        }
        if input.amount_cents < 0 {
            return Err(AppError::Validation(
                "proposal amount must not be negative".to_owned(),
            ));
        }

        let status = match input.status {
            Some(value) => ProposalStatus::new(value)?,
            None => ProposalStatus::draft(),
        };

        let record = ProposalRecord {
            id: ProposalId::new(),
            client_id: client.id,
            company_id: client.company_id,
            site_id: client.site_id,
            created_by: UserId::from_uuid(actor.user_id()),
            title,
            amount_cents: input.amount_cents,
            status,
            created_at: Utc::now(),
        };

        self.repository.insert_proposal(&record).await?;

        self.activity_service
            .record(ActivityEntry {
                user_id: record.created_by,
                action: ActivityAction::ProposalCreated,
                resource_type: "proposal".to_owned(),
                resource_id: record.id.to_string(),
                company_id: Some(record.company_id),
                site_id: record.site_id,
                details: Some(serde_json::json!({
                    "client_id": record.client_id.to_string(),
                    "amount_cents": record.amount_cents,
                })),
            })
            .await?;

        Ok(record)
    }

    /// Moves a proposal to a new status.
    ///
    /// A proposal that already has a sale is frozen; changing its status
    /// would invalidate the downstream record and is rejected as a conflict.
    pub async fn change_proposal_status(
        &self,
        actor: &UserIdentity,
        resolution: &ScopeResolution,
        proposal_id: ProposalId,
        status: &str,
    ) -> AppResult<ProposalRecord> {
        let Some(boundary) = resolution.boundary() else {
            return Err(AppError::Forbidden("no role assigned".to_owned()));
        };

        let mut proposal = self
            .repository
            .find_proposal(boundary, proposal_id)
            .await?
            .ok_or_else(|| AppError::NotFound("proposal not found".to_owned()))?;

        self.authorization_service.ensure_can_write(
            resolution,
            Some(proposal.company_id),
            proposal.site_id,
        )?;

        if self.repository.sale_exists_for_proposal(proposal_id).await? {
            return Err(AppError::Conflict(
                "proposal already has a sale recorded".to_owned(),
            ));
        }

        let status = ProposalStatus::new(status)?;
        if status == proposal.status {
            return Ok(proposal);
        }

        self.repository
            .update_proposal_status(proposal_id, &status)
            .await?;

        self.activity_service
            .record(ActivityEntry {
                user_id: UserId::from_uuid(actor.user_id()),
                action: ActivityAction::ProposalStatusChanged,
                resource_type: "proposal".to_owned(),
                resource_id: proposal_id.to_string(),
                company_id: Some(proposal.company_id),
                site_id: proposal.site_id,
                details: Some(serde_json::json!({
                    "from": proposal.status.as_str(),
                    "to": status.as_str(),
                })),
            })
            .await?;

        proposal.status = status;
        Ok(proposal)
    }

    /// Closes a sale against a proposal the caller can see and write to.
    ///
    /// At most one sale per proposal. Closing also moves the proposal to the
    /// closed status; the two writes are separate statements, so a crash in
    /// between leaves a sold proposal still marked open, which the status
    /// guard above treats as frozen anyway.
    pub async fn close_sale(
        &self,
        actor: &UserIdentity,
        resolution: &ScopeResolution,
        input: NewSale,
    ) -> AppResult<SaleRecord> {
        let Some(boundary) = resolution.boundary() else {
            return Err(AppError::Forbidden("no role assigned".to_owned()));
        };

        let proposal = self
            .repository
            .find_proposal(boundary, input.proposal_id)
            .await?
            .ok_or_else(|| AppError::NotFound("proposal not found".to_owned()))?;

        self.authorization_service.ensure_can_write(
            resolution,
            Some(proposal.company_id),
            proposal.site_id,
        )?;

        if input.amount_cents < 0 {
            return Err(AppError::Validation(
                "sale amount must not be negative".to_owned(),
            ));
        }
        if input.commission_cents.is_some_and(|cents| cents < 0) {
            return Err(AppError::Validation(
                "commission must not be negative".to_owned(),
            ));
        }

        if self
            .repository
            .sale_exists_for_proposal(input.proposal_id)
            .await?
        {
            return Err(AppError::Conflict(
                "proposal already has a sale recorded".to_owned(),
            ));
        }

        let record = SaleRecord {
            id: SaleId::new(),
            proposal_id: proposal.id,
            company_id: proposal.company_id,
            site_id: proposal.site_id,
            closed_by: UserId::from_uuid(actor.user_id()),
            amount_cents: input.amount_cents,
            commission_cents: input.commission_cents,
            closed_at: Utc::now(),
        };

        self.repository.insert_sale(&record).await?;

        if !proposal.status.is_closed() {
            self.repository
                .update_proposal_status(proposal.id, &ProposalStatus::new(ProposalStatus::CLOSED)?)
                .await?;
        }

        self.activity_service
            .record(ActivityEntry {
                user_id: record.closed_by,
                action: ActivityAction::SaleClosed,
                resource_type: "sale".to_owned(),
                resource_id: record.id.to_string(),
                company_id: Some(record.company_id),
                site_id: record.site_id,
                details: Some(serde_json::json!({
                    "proposal_id": record.proposal_id.to_string(),
                    "amount_cents": record.amount_cents,
                })),
            })
            .await?;

        Ok(record)
    }
}
