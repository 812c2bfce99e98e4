//! Hierarchical authorization: assignment storage, scope resolution, and
//! write-path boundary checks.
//!
//! Every data fetch in the system passes through a
//! [`vantage_domain::VisibilityBoundary`] resolved here; every write path
//! calls [`AuthorizationService::ensure_can_write`] before persisting.
//! Denials fail closed.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use vantage_core::{AppError, AppResult, UserIdentity};
use vantage_domain::{
    ActivityAction, AssignmentId, CompanyId, RoleAssignment, RoleKind, ScopeResolution, SiteId,
    UserId, VisibilityBoundary, resolve_scope,
};

use crate::{ActivityEntry, ActivityService, DirectoryRepository};

// ---------------------------------------------------------------------------
// Ports
// ---------------------------------------------------------------------------

/// Assignment read model for administrative listings, eagerly joined with
/// role, user, company, and site reference data.
#[derive(Debug, Clone)]
pub struct AssignmentRecord {
    /// Unique assignment identifier.
    pub id: AssignmentId,
    /// The user holding the role.
    pub user_id: UserId,
    /// Email of the user holding the role.
    pub user_email: String,
    /// The role granted.
    pub role: RoleKind,
    /// Company scope, if any.
    pub company_id: Option<CompanyId>,
    /// Company display name, if company-scoped.
    pub company_name: Option<String>,
    /// Site scope, if any.
    pub site_id: Option<SiteId>,
    /// Site display name, if site-scoped.
    pub site_name: Option<String>,
    /// The user who granted this assignment.
    pub assigned_by: UserId,
    /// When the assignment was granted.
    pub assigned_at: DateTime<Utc>,
    /// Whether the assignment is currently in force.
    pub is_active: bool,
}

/// Repository port for role assignment persistence.
#[async_trait]
pub trait AssignmentRepository: Send + Sync {
    /// Returns every active assignment for a user, role data joined in.
    async fn list_active_for_user(&self, user_id: UserId) -> AppResult<Vec<RoleAssignment>>;

    /// Lists assignments visible under the boundary (by company scope).
    async fn list_visible(&self, boundary: VisibilityBoundary)
    -> AppResult<Vec<AssignmentRecord>>;

    /// Finds one assignment by id.
    async fn find_by_id(&self, assignment_id: AssignmentId) -> AppResult<Option<RoleAssignment>>;

    /// Persists a new assignment.
    async fn insert(&self, assignment: &RoleAssignment) -> AppResult<()>;

    /// Marks an assignment inactive.
    async fn revoke(&self, assignment_id: AssignmentId) -> AppResult<()>;
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Parameters for granting a role.
#[derive(Debug, Clone)]
pub struct AssignRoleInput {
    /// The user receiving the role.
    pub user_id: UserId,
    /// The role to grant.
    pub role: RoleKind,
    /// Company scope, if any.
    pub company_id: Option<CompanyId>,
    /// Site scope, if any.
    pub site_id: Option<SiteId>,
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Application service for scope resolution and assignment administration.
#[derive(Clone)]
pub struct AuthorizationService {
    assignment_repository: Arc<dyn AssignmentRepository>,
    directory_repository: Arc<dyn DirectoryRepository>,
    activity_service: ActivityService,
}

impl AuthorizationService {
    /// Creates a new authorization service.
    #[must_use]
    pub fn new(
        assignment_repository: Arc<dyn AssignmentRepository>,
        directory_repository: Arc<dyn DirectoryRepository>,
        activity_service: ActivityService,
    ) -> Self {
        Self {
            assignment_repository,
            directory_repository,
            activity_service,
        }
    }

    /// Fetches a user's active assignments and resolves their scope.
    ///
    /// A query failure here during login must abort the login: the caller
    /// propagates the error and creates no session.
    pub async fn resolve_for_user(&self, user_id: UserId) -> AppResult<ScopeResolution> {
        let assignments = self
            .assignment_repository
            .list_active_for_user(user_id)
            .await?;

        Ok(resolve_scope(user_id, &assignments))
    }

    /// Verifies the caller's boundary permits writing to the given
    /// company/site target. Returns the boundary for further use.
    pub fn ensure_can_write(
        &self,
        resolution: &ScopeResolution,
        company_id: Option<CompanyId>,
        site_id: Option<SiteId>,
    ) -> AppResult<VisibilityBoundary> {
        let Some(boundary) = resolution.boundary() else {
            return Err(AppError::Forbidden("no role assigned".to_owned()));
        };

        if !boundary.permits_write(company_id, site_id) {
            return Err(AppError::Forbidden(
                "target is outside your visibility boundary".to_owned(),
            ));
        }

        Ok(boundary)
    }

    /// Lists assignments visible to the caller.
    pub async fn list_assignments(
        &self,
        resolution: &ScopeResolution,
    ) -> AppResult<Vec<AssignmentRecord>> {
        let Some(boundary) = resolution.boundary() else {
            return Ok(Vec::new());
        };

        self.assignment_repository.list_visible(boundary).await
    }

    /// Grants a role to a user and appends an activity row.
    ///
    /// Global administrators may grant any role. Company administrators may
    /// grant non-global roles scoped to their own company. Everyone else is
    /// denied.
    pub async fn assign_role(
        &self,
        actor: &UserIdentity,
        resolution: &ScopeResolution,
        input: AssignRoleInput,
    ) -> AppResult<AssignmentId> {
        self.ensure_can_manage(resolution, input.company_id, input.role)?;

        if input.role == RoleKind::Unrecognized {
            return Err(AppError::Validation(
                "cannot grant an unrecognized role".to_owned(),
            ));
        }

        let assignment = RoleAssignment {
            id: AssignmentId::new(),
            user_id: input.user_id,
            role: input.role,
            company_id: input.company_id,
            site_id: input.site_id,
            assigned_by: UserId::from_uuid(actor.user_id()),
            assigned_at: Utc::now(),
            is_active: true,
        };

        assignment.validate_scope()?;

        if let Some(company_id) = assignment.company_id {
            if !self.directory_repository.company_exists(company_id).await? {
                return Err(AppError::NotFound("company not found".to_owned()));
            }

            // Referential invariant: a site-scoped assignment's site must
            // belong to the referenced company.
            if let Some(site_id) = assignment.site_id
                && !self
                    .directory_repository
                    .site_belongs_to_company(site_id, company_id)
                    .await?
            {
                return Err(AppError::Validation(
                    "site does not belong to the referenced company".to_owned(),
                ));
            }
        }

        self.assignment_repository.insert(&assignment).await?;

        self.activity_service
            .record(ActivityEntry {
                user_id: UserId::from_uuid(actor.user_id()),
                action: ActivityAction::RoleAssigned,
                resource_type: "role_assignment".to_owned(),
                resource_id: assignment.id.to_string(),
                company_id: assignment.company_id,
                site_id: assignment.site_id,
                details: Some(serde_json::json!({
                    "user_id": assignment.user_id.to_string(),
                    "role": assignment.role.as_str(),
                })),
            })
            .await?;

        Ok(assignment.id)
    }

    /// Revokes an assignment (marks it inactive) and appends an activity row.
    pub async fn revoke_assignment(
        &self,
        actor: &UserIdentity,
        resolution: &ScopeResolution,
        assignment_id: AssignmentId,
    ) -> AppResult<()> {
        let assignment = self
            .assignment_repository
            .find_by_id(assignment_id)
            .await?
            .ok_or_else(|| AppError::NotFound("assignment not found".to_owned()))?;

        self.ensure_can_manage(resolution, assignment.company_id, assignment.role)?;

        self.assignment_repository.revoke(assignment_id).await?;

        self.activity_service
            .record(ActivityEntry {
                user_id: UserId::from_uuid(actor.user_id()),
                action: ActivityAction::RoleRevoked,
                resource_type: "role_assignment".to_owned(),
                resource_id: assignment_id.to_string(),
                company_id: assignment.company_id,
                site_id: assignment.site_id,
                details: Some(serde_json::json!({
                    "user_id": assignment.user_id.to_string(),
                    "role": assignment.role.as_str(),
                })),
            })
            .await
    }

    /// Checks assignment administration rights for a target company/role.
    fn ensure_can_manage(
        &self,
        resolution: &ScopeResolution,
        target_company: Option<CompanyId>,
        target_role: RoleKind,
    ) -> AppResult<()> {
        match resolution.boundary() {
            Some(VisibilityBoundary::Global) => Ok(()),
            Some(VisibilityBoundary::Company(own_company)) => {
                if target_role == RoleKind::GlobalAdmin {
                    return Err(AppError::Forbidden(
                        "a company administrator cannot manage global roles".to_owned(),
                    ));
                }

                if target_company != Some(own_company) {
                    return Err(AppError::Forbidden(
                        "assignment is outside your company".to_owned(),
                    ));
                }

                Ok(())
            }
            _ => Err(AppError::Forbidden(
                "not allowed to manage role assignments".to_owned(),
            )),
        }
    }
}

#[cfg(test)]
mod tests;
