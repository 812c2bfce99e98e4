//! The access filter: a pure visibility predicate over scope chains.
//!
//! The same predicate is mirrored into SQL by every persistence adapter,
//! so repository reads never materialize rows outside the caller's
//! boundary.

use serde::{Deserialize, Serialize};

use crate::ids::{CompanyId, SiteId};
use crate::scope::VisibilityBoundary;
use crate::user::UserId;

/// The scope chain of one resource, resolved through its references.
///
/// For a proposal this is Proposal→Client→Company/Site plus `created_by`;
/// for a sale, Sale→Proposal→Client→Company/Site plus `closed_by`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceScope {
    /// Company the resource belongs to, if any.
    pub company_id: Option<CompanyId>,
    /// Site the resource belongs to, if any.
    pub site_id: Option<SiteId>,
    /// Users who own or authored the resource directly
    /// (assignee, creator, closer).
    pub owners: Vec<UserId>,
}

impl ResourceScope {
    /// Builds a scope chain from its parts.
    #[must_use]
    pub fn new(
        company_id: Option<CompanyId>,
        site_id: Option<SiteId>,
        owners: Vec<UserId>,
    ) -> Self {
        Self {
            company_id,
            site_id,
            owners,
        }
    }
}

impl VisibilityBoundary {
    /// Returns whether a resource with the given scope chain is visible
    /// under this boundary.
    #[must_use]
    pub fn permits(&self, resource: &ResourceScope) -> bool {
        match self {
            Self::Global => true,
            Self::Company(company_id) => resource.company_id == Some(*company_id),
            Self::Site(site_id) => resource.site_id == Some(*site_id),
            Self::SelfOnly(user_id) => resource.owners.contains(user_id),
        }
    }

    /// Returns whether this boundary permits writing into the given
    /// company/site target. Deny is the default for every ambiguous case.
    #[must_use]
    pub fn permits_write(&self, company_id: Option<CompanyId>, site_id: Option<SiteId>) -> bool {
        match self {
            Self::Global => true,
            Self::Company(own_company) => company_id == Some(*own_company),
            Self::Site(own_site) => site_id == Some(*own_site),
            // Self-scoped users may create records they own; the caller
            // stamps ownership from the authenticated identity.
            Self::SelfOnly(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ResourceScope;
    use crate::ids::{CompanyId, SiteId};
    use crate::scope::VisibilityBoundary;
    use crate::user::UserId;

    #[test]
    fn global_sees_everything() {
        let resource = ResourceScope::new(None, None, Vec::new());
        assert!(VisibilityBoundary::Global.permits(&resource));
    }

    #[test]
    fn company_boundary_matches_on_company() {
        let company_id = CompanyId::new();
        let boundary = VisibilityBoundary::Company(company_id);

        let inside = ResourceScope::new(Some(company_id), Some(SiteId::new()), Vec::new());
        let outside = ResourceScope::new(Some(CompanyId::new()), None, Vec::new());
        let unattached = ResourceScope::new(None, None, Vec::new());

        assert!(boundary.permits(&inside));
        assert!(!boundary.permits(&outside));
        assert!(!boundary.permits(&unattached));
    }

    #[test]
    fn site_boundary_matches_on_site() {
        let site_id = SiteId::new();
        let boundary = VisibilityBoundary::Site(site_id);

        let inside = ResourceScope::new(Some(CompanyId::new()), Some(site_id), Vec::new());
        let elsewhere = ResourceScope::new(Some(CompanyId::new()), Some(SiteId::new()), Vec::new());
        let siteless = ResourceScope::new(Some(CompanyId::new()), None, Vec::new());

        assert!(boundary.permits(&inside));
        assert!(!boundary.permits(&elsewhere));
        assert!(!boundary.permits(&siteless));
    }

    #[test]
    fn self_boundary_matches_any_owner_reference() {
        let user_id = UserId::new();
        let boundary = VisibilityBoundary::SelfOnly(user_id);

        let owned = ResourceScope::new(None, None, vec![UserId::new(), user_id]);
        let unowned = ResourceScope::new(None, None, vec![UserId::new()]);

        assert!(boundary.permits(&owned));
        assert!(!boundary.permits(&unowned));
    }

    #[test]
    fn contributor_record_is_visible_to_site_manager_not_other_company() {
        // A contributor at site 1 creates a proposal assigned to themselves.
        let company_one = CompanyId::new();
        let site_one = SiteId::new();
        let contributor = UserId::new();
        let proposal = ResourceScope::new(Some(company_one), Some(site_one), vec![contributor]);

        let site_manager = VisibilityBoundary::Site(site_one);
        let other_company_admin = VisibilityBoundary::Company(CompanyId::new());

        assert!(site_manager.permits(&proposal));
        assert!(!other_company_admin.permits(&proposal));
        assert!(VisibilityBoundary::SelfOnly(contributor).permits(&proposal));
    }

    #[test]
    fn write_checks_fail_closed_outside_the_boundary() {
        let company_id = CompanyId::new();
        let site_id = SiteId::new();

        let company_boundary = VisibilityBoundary::Company(company_id);
        assert!(company_boundary.permits_write(Some(company_id), None));
        assert!(!company_boundary.permits_write(Some(CompanyId::new()), None));
        assert!(!company_boundary.permits_write(None, None));

        let site_boundary = VisibilityBoundary::Site(site_id);
        assert!(site_boundary.permits_write(Some(company_id), Some(site_id)));
        assert!(!site_boundary.permits_write(Some(company_id), Some(SiteId::new())));
        assert!(!site_boundary.permits_write(Some(company_id), None));
    }
}
