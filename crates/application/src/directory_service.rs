//! Company and site directory ports and application service.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use vantage_core::{AppError, AppResult, UserIdentity};
use vantage_domain::{
    ActivityAction, CompanyId, ScopeResolution, SiteId, UserId, VisibilityBoundary,
};

use crate::{ActivityEntry, ActivityService};

// ---------------------------------------------------------------------------
// Ports
// ---------------------------------------------------------------------------

/// Company row returned by repository queries.
#[derive(Debug, Clone)]
pub struct CompanyRecord {
    /// Unique company identifier.
    pub id: CompanyId,
    /// Company display name.
    pub name: String,
    /// Companies are soft-deactivated, never hard-deleted.
    pub is_active: bool,
    /// When the company was created.
    pub created_at: DateTime<Utc>,
}

/// Site row returned by repository queries.
#[derive(Debug, Clone)]
pub struct SiteRecord {
    /// Unique site identifier.
    pub id: SiteId,
    /// The company this site belongs to.
    pub company_id: CompanyId,
    /// Site display name.
    pub name: String,
    /// Sites are soft-deactivated, never hard-deleted.
    pub is_active: bool,
    /// When the site was created.
    pub created_at: DateTime<Utc>,
}

/// Repository port for the company/site directory.
#[async_trait]
pub trait DirectoryRepository: Send + Sync {
    /// Lists companies visible under the boundary.
    async fn list_companies(&self, boundary: VisibilityBoundary) -> AppResult<Vec<CompanyRecord>>;

    /// Creates a company. Returns the assigned identifier.
    async fn create_company(&self, name: &str) -> AppResult<CompanyId>;

    /// Returns whether an active company with this id exists.
    async fn company_exists(&self, company_id: CompanyId) -> AppResult<bool>;

    /// Marks a company inactive.
    async fn deactivate_company(&self, company_id: CompanyId) -> AppResult<()>;

    /// Lists sites of one company visible under the boundary.
    async fn list_sites(
        &self,
        boundary: VisibilityBoundary,
        company_id: CompanyId,
    ) -> AppResult<Vec<SiteRecord>>;

    /// Creates a site under a company. Returns the assigned identifier.
    async fn create_site(&self, company_id: CompanyId, name: &str) -> AppResult<SiteId>;

    /// Marks a site inactive.
    async fn deactivate_site(&self, site_id: SiteId) -> AppResult<()>;

    /// Returns whether the site exists and belongs to the given company.
    async fn site_belongs_to_company(
        &self,
        site_id: SiteId,
        company_id: CompanyId,
    ) -> AppResult<bool>;
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Application service for the company/site directory.
#[derive(Clone)]
pub struct DirectoryService {
    repository: Arc<dyn DirectoryRepository>,
    activity_service: ActivityService,
}

impl DirectoryService {
    /// Creates a new directory service.
    #[must_use]
    pub fn new(repository: Arc<dyn DirectoryRepository>, activity_service: ActivityService) -> Self {
        Self {
            repository,
            activity_service,
        }
    }

    /// Lists companies visible to the caller.
    pub async fn list_companies(
        &self,
        resolution: &ScopeResolution,
    ) -> AppResult<Vec<CompanyRecord>> {
        let Some(boundary) = resolution.boundary() else {
            return Ok(Vec::new());
        };

        self.repository.list_companies(boundary).await
    }

    /// Creates a company. Restricted to global administrators.
    pub async fn create_company(
        &self,
        actor: &UserIdentity,
        resolution: &ScopeResolution,
        name: &str,
    ) -> AppResult<CompanyId> {
        if resolution.boundary() != Some(VisibilityBoundary::Global) {
            return Err(AppError::Forbidden(
                "only a global administrator may create companies".to_owned(),
            ));
        }

        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation(
                "company name must not be empty".to_owned(),
            ));
        }

        let company_id = self.repository.create_company(name).await?;

        self.activity_service
            .record(ActivityEntry {
                user_id: UserId::from_uuid(actor.user_id()),
                action: ActivityAction::CompanyCreated,
                resource_type: "company".to_owned(),
                resource_id: company_id.to_string(),
                company_id: Some(company_id),
                site_id: None,
                details: Some(serde_json::json!({ "name": name })),
            })
            .await?;

        Ok(company_id)
    }

    /// Deactivates a company. Restricted to global administrators.
    ///
    /// Soft deactivation only; the rows and their history stay in place.
    pub async fn deactivate_company(
        &self,
        actor: &UserIdentity,
        resolution: &ScopeResolution,
        company_id: CompanyId,
    ) -> AppResult<()> {
        if resolution.boundary() != Some(VisibilityBoundary::Global) {
            return Err(AppError::Forbidden(
                "only a global administrator may deactivate companies".to_owned(),
            ));
        }

        if !self.repository.company_exists(company_id).await? {
            return Err(AppError::NotFound("company not found".to_owned()));
        }

        self.repository.deactivate_company(company_id).await?;

        self.activity_service
            .record(ActivityEntry {
                user_id: UserId::from_uuid(actor.user_id()),
                action: ActivityAction::CompanyDeactivated,
                resource_type: "company".to_owned(),
                resource_id: company_id.to_string(),
                company_id: Some(company_id),
                site_id: None,
                details: None,
            })
            .await
    }

    /// Lists sites of one company visible to the caller.
    pub async fn list_sites(
        &self,
        resolution: &ScopeResolution,
        company_id: CompanyId,
    ) -> AppResult<Vec<SiteRecord>> {
        let Some(boundary) = resolution.boundary() else {
            return Ok(Vec::new());
        };

        self.repository.list_sites(boundary, company_id).await
    }

    /// Creates a site under a company.
    ///
    /// Allowed for global administrators and for company administrators of
    /// that company; everyone else is denied.
    pub async fn create_site(
        &self,
        actor: &UserIdentity,
        resolution: &ScopeResolution,
        company_id: CompanyId,
        name: &str,
    ) -> AppResult<SiteId> {
        let allowed = matches!(
            resolution.boundary(),
            Some(VisibilityBoundary::Global)
        ) || resolution.boundary() == Some(VisibilityBoundary::Company(company_id));

        if !allowed {
            return Err(AppError::Forbidden(
                "not allowed to create sites in this company".to_owned(),
            ));
        }

        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("site name must not be empty".to_owned()));
        }

        if !self.repository.company_exists(company_id).await? {
            return Err(AppError::NotFound("company not found".to_owned()));
        }

        let site_id = self.repository.create_site(company_id, name).await?;

        self.activity_service
            .record(ActivityEntry {
                user_id: UserId::from_uuid(actor.user_id()),
                action: ActivityAction::SiteCreated,
                resource_type: "site".to_owned(),
                resource_id: site_id.to_string(),
                company_id: Some(company_id),
                site_id: Some(site_id),
                details: Some(serde_json::json!({ "name": name })),
            })
            .await?;

        Ok(site_id)
    }

    /// Deactivates a site under a company.
    ///
    /// Same authorization rule as site creation; the site must belong to
    /// the company named in the request.
    pub async fn deactivate_site(
        &self,
        actor: &UserIdentity,
        resolution: &ScopeResolution,
        company_id: CompanyId,
        site_id: SiteId,
    ) -> AppResult<()> {
        let allowed = matches!(resolution.boundary(), Some(VisibilityBoundary::Global))
            || resolution.boundary() == Some(VisibilityBoundary::Company(company_id));

        if !allowed {
            return Err(AppError::Forbidden(
                "not allowed to deactivate sites in this company".to_owned(),
            ));
        }

        if !self
            .repository
            .site_belongs_to_company(site_id, company_id)
            .await?
        {
            return Err(AppError::NotFound("site not found".to_owned()));
        }

        self.repository.deactivate_site(site_id).await?;

        self.activity_service
            .record(ActivityEntry {
                user_id: UserId::from_uuid(actor.user_id()),
                action: ActivityAction::SiteDeactivated,
                resource_type: "site".to_owned(),
                resource_id: site_id.to_string(),
                company_id: Some(company_id),
                site_id: Some(site_id),
                details: None,
            })
            .await
    }
}

#[cfg(test)]
mod tests;
