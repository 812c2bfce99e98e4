//! Role assignments binding a user to a role within an optional scope.

use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use vantage_core::{AppError, AppResult};

use crate::ids::{CompanyId, SiteId};
use crate::role::RoleKind;
use crate::user::UserId;

/// Unique identifier for a role assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssignmentId(Uuid);

impl AssignmentId {
    /// Creates a new random assignment identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an assignment identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for AssignmentId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for AssignmentId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// One role held by one user, optionally constrained to a company and site.
///
/// A user may hold several active assignments at once; the scope resolver
/// picks the most privileged one as primary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignment {
    /// Unique assignment identifier.
    pub id: AssignmentId,
    /// The user holding the role.
    pub user_id: UserId,
    /// The role granted.
    pub role: RoleKind,
    /// Company the role is scoped to, if any.
    pub company_id: Option<CompanyId>,
    /// Site the role is scoped to, if any.
    pub site_id: Option<SiteId>,
    /// The user who granted this assignment.
    pub assigned_by: UserId,
    /// When the assignment was granted.
    pub assigned_at: DateTime<Utc>,
    /// Whether the assignment is currently in force.
    pub is_active: bool,
}

impl RoleAssignment {
    /// Validates the structural scope invariants for this assignment.
    ///
    /// - A company-scoped role must reference a company.
    /// - A site-scoped role must reference both a site and its company.
    /// - A site reference without a company reference is never valid.
    ///
    /// Whether the site actually belongs to the referenced company is a
    /// referential check the authorization service performs against the
    /// directory at write time.
    pub fn validate_scope(&self) -> AppResult<()> {
        if self.site_id.is_some() && self.company_id.is_none() {
            return Err(AppError::Validation(
                "a site-scoped assignment must also reference the site's company".to_owned(),
            ));
        }

        match self.role {
            RoleKind::CompanyAdmin if self.company_id.is_none() => Err(AppError::Validation(
                "a company administrator assignment must reference a company".to_owned(),
            )),
            RoleKind::SiteManager if self.site_id.is_none() => Err(AppError::Validation(
                "a site manager assignment must reference a site".to_owned(),
            )),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::{AssignmentId, RoleAssignment};
    use crate::ids::{CompanyId, SiteId};
    use crate::role::RoleKind;
    use crate::user::UserId;

    fn assignment(
        role: RoleKind,
        company_id: Option<CompanyId>,
        site_id: Option<SiteId>,
    ) -> RoleAssignment {
        RoleAssignment {
            id: AssignmentId::new(),
            user_id: UserId::new(),
            role,
            company_id,
            site_id,
            assigned_by: UserId::new(),
            assigned_at: Utc::now(),
            is_active: true,
        }
    }

    #[test]
    fn company_admin_requires_company() {
        assert!(assignment(RoleKind::CompanyAdmin, None, None)
            .validate_scope()
            .is_err());
        assert!(assignment(RoleKind::CompanyAdmin, Some(CompanyId::new()), None)
            .validate_scope()
            .is_ok());
    }

    #[test]
    fn site_manager_requires_site_and_company() {
        assert!(assignment(RoleKind::SiteManager, Some(CompanyId::new()), None)
            .validate_scope()
            .is_err());
        assert!(
            assignment(RoleKind::SiteManager, None, Some(SiteId::new()))
                .validate_scope()
                .is_err()
        );
        assert!(assignment(
            RoleKind::SiteManager,
            Some(CompanyId::new()),
            Some(SiteId::new())
        )
        .validate_scope()
        .is_ok());
    }

    #[test]
    fn contributor_needs_no_scope() {
        assert!(assignment(RoleKind::Contributor, None, None)
            .validate_scope()
            .is_ok());
    }
}
