//! Client records: scoped reads and boundary-checked writes.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use vantage_core::{AppError, AppResult, UserIdentity};
use vantage_domain::{
    ActivityAction, ClientId, CompanyId, ScopeResolution, SiteId, UserId, VisibilityBoundary,
};

use crate::authorization_service::AuthorizationService;
use crate::{ActivityEntry, ActivityService};

// ---------------------------------------------------------------------------
// Ports
// ---------------------------------------------------------------------------

/// Client row returned by repository queries.
#[derive(Debug, Clone)]
pub struct ClientRecord {
    /// Unique client identifier.
    pub id: ClientId,
    /// The company this client belongs to.
    pub company_id: CompanyId,
    /// The site this client is attached to, if any.
    pub site_id: Option<SiteId>,
    /// The user this client is assigned to, if any.
    pub assigned_to: Option<UserId>,
    /// Client display name.
    pub name: String,
    /// Contact email, if known.
    pub contact_email: Option<String>,
    /// The user who created the record.
    pub created_by: UserId,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

/// Parameters for creating a client.
#[derive(Debug, Clone)]
pub struct NewClient {
    /// The company the client belongs to.
    pub company_id: CompanyId,
    /// The site the client is attached to, if any.
    pub site_id: Option<SiteId>,
    /// Requested assignee. Ignored for self-scoped callers, who always
    /// receive the record themselves.
    pub assigned_to: Option<UserId>,
    /// Client display name.
    pub name: String,
    /// Contact email, if known.
    pub contact_email: Option<String>,
}

/// Parameters for updating a client.
#[derive(Debug, Clone, Default)]
pub struct UpdateClient {
    /// New display name, if changing.
    pub name: Option<String>,
    /// New assignee, if changing.
    pub assigned_to: Option<UserId>,
    /// New contact email, if changing.
    pub contact_email: Option<String>,
}

/// Repository port for client persistence.
///
/// Every read takes the caller's boundary and applies the visibility
/// predicate in the query itself, so rows outside the boundary are never
/// materialized.
#[async_trait]
pub trait ClientRepository: Send + Sync {
    /// Lists clients visible under the boundary.
    async fn list_visible(&self, boundary: VisibilityBoundary) -> AppResult<Vec<ClientRecord>>;

    /// Finds one client, only if visible under the boundary.
    async fn find_visible(
        &self,
        boundary: VisibilityBoundary,
        client_id: ClientId,
    ) -> AppResult<Option<ClientRecord>>;

    /// Persists a new client. Returns the stored record.
    async fn insert(&self, record: &ClientRecord) -> AppResult<()>;

    /// Applies an update to an existing client.
    async fn update(&self, client_id: ClientId, changes: UpdateClient) -> AppResult<()>;
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Application service for client records.
#[derive(Clone)]
pub struct ClientService {
    repository: Arc<dyn ClientRepository>,
    authorization_service: AuthorizationService,
    activity_service: ActivityService,
}

impl ClientService {
    /// Creates a new client service.
    #[must_use]
    pub fn new(
        repository: Arc<dyn ClientRepository>,
        authorization_service: AuthorizationService,
        activity_service: ActivityService,
    ) -> Self {
        Self {
            repository,
            authorization_service,
            activity_service,
        }
    }

    /// Lists clients visible to the caller.
    ///
    /// An unassigned caller sees an empty list without any query being
    /// issued.
    pub async fn list(&self, resolution: &ScopeResolution) -> AppResult<Vec<ClientRecord>> {
        let Some(boundary) = resolution.boundary() else {
            return Ok(Vec::new());
        };

        self.repository.list_visible(boundary).await
    }

    /// Creates a client inside the caller's boundary.
    ///
    /// The creator is stamped from the authenticated identity; a self-scoped
    /// caller additionally becomes the assignee regardless of the requested
    /// value.
    pub async fn create(
        &self,
        actor: &UserIdentity,
        resolution: &ScopeResolution,
        input: NewClient,
    ) -> AppResult<ClientRecord> {
        let boundary =
            self.authorization_service
                .ensure_can_write(resolution, Some(input.company_id), input.site_id)?;

        let name = input.name.trim().to_owned();
        if name.is_empty() {
            return Err(AppError::Validation(
                "client name must not be empty".to_owned(),
            ));
        }

        let actor_id = UserId::from_uuid(actor.user_id());
        let assigned_to = match boundary {
            VisibilityBoundary::SelfOnly(_) => Some(actor_id),
            _ => input.assigned_to,
        };

        let record = ClientRecord {
            id: ClientId::new(),
            company_id: input.company_id,
            site_id: input.site_id,
            assigned_to,
            name,
            contact_email: input.contact_email,
            created_by: actor_id,
            created_at: Utc::now(),
        };

        self.repository.insert(&record).await?;

        self.activity_service
            .record(ActivityEntry {
                user_id: actor_id,
                action: ActivityAction::ClientCreated,
                resource_type: "client".to_owned(),
                resource_id: record.id.to_string(),
                company_id: Some(record.company_id),
                site_id: record.site_id,
                details: Some(serde_json::json!({ "name": record.name })),
            })
            .await?;

        Ok(record)
    }

    /// Updates a client the caller can see and write to.
    pub async fn update(
        &self,
        actor: &UserIdentity,
        resolution: &ScopeResolution,
        client_id: ClientId,
        changes: UpdateClient,
    ) -> AppResult<()> {
        let Some(boundary) = resolution.boundary() else {
            return Err(AppError::Forbidden("no role assigned".to_owned()));
        };

        // The visibility filter doubles as an existence check: a row outside
        // the boundary is reported as absent, not as forbidden.
        let existing = self
            .repository
            .find_visible(boundary, client_id)
            .await?
            .ok_or_else(|| AppError::NotFound("client not found".to_owned()))?;

        self.authorization_service.ensure_can_write(
            resolution,
            Some(existing.company_id),
            existing.site_id,
        )?;

        if let Some(ref name) = changes.name
            && name.trim().is_empty()
        {
            return Err(AppError::Validation(
                "client name must not be empty".to_owned(),
            ));
        }

        self.repository.update(client_id, changes).await?;

        self.activity_service
            .record(ActivityEntry {
                user_id: UserId::from_uuid(actor.user_id()),
                action: ActivityAction::ClientUpdated,
                resource_type: "client".to_owned(),
                resource_id: client_id.to_string(),
                company_id: Some(existing.company_id),
                site_id: existing.site_id,
                details: None,
            })
            .await
    }

    /// Finds one client visible to the caller.
    pub async fn find(
        &self,
        resolution: &ScopeResolution,
        client_id: ClientId,
    ) -> AppResult<Option<ClientRecord>> {
        let Some(boundary) = resolution.boundary() else {
            return Ok(None);
        };

        self.repository.find_visible(boundary, client_id).await
    }
}
