//! Scope resolution: from a user's active assignments to a visibility boundary.

use serde::{Deserialize, Serialize};

use crate::assignment::RoleAssignment;
use crate::ids::{CompanyId, SiteId};
use crate::role::RoleKind;
use crate::user::UserId;

/// The data visibility boundary a resolved assignment implies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum VisibilityBoundary {
    /// Every company, site, and record is visible.
    Global,
    /// Everything belonging to one company is visible.
    Company(CompanyId),
    /// Everything belonging to one site is visible.
    Site(SiteId),
    /// Only records the user owns or authored are visible.
    SelfOnly(UserId),
}

/// Outcome of resolving a user's assignments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScopeResolution {
    /// The user holds at least one active assignment.
    Resolved {
        /// The most privileged active assignment.
        primary: RoleAssignment,
        /// The visibility boundary that assignment implies.
        boundary: VisibilityBoundary,
    },
    /// The user holds no active assignment.
    ///
    /// A valid restricted state, not an error: callers must render a
    /// restricted view and must not issue any scoped query.
    Unassigned,
}

impl ScopeResolution {
    /// Returns the boundary, or `None` for the unassigned state.
    #[must_use]
    pub fn boundary(&self) -> Option<VisibilityBoundary> {
        match self {
            Self::Resolved { boundary, .. } => Some(*boundary),
            Self::Unassigned => None,
        }
    }

    /// Returns the primary assignment, if one was resolved.
    #[must_use]
    pub fn primary(&self) -> Option<&RoleAssignment> {
        match self {
            Self::Resolved { primary, .. } => Some(primary),
            Self::Unassigned => None,
        }
    }

    /// Returns whether the user holds no active assignment.
    #[must_use]
    pub fn is_unassigned(&self) -> bool {
        matches!(self, Self::Unassigned)
    }
}

/// Resolves the primary assignment and visibility boundary for a user.
///
/// The primary assignment is the active one with the numeric-minimum role
/// level. When two assignments share that level, the most recently assigned
/// one wins (then the larger assignment id, for full determinism).
///
/// A privileged assignment missing its scope target (a company admin row
/// without a company, a site manager row without a site) degrades to
/// [`VisibilityBoundary::SelfOnly`] rather than widening access.
#[must_use]
pub fn resolve_scope(user_id: UserId, assignments: &[RoleAssignment]) -> ScopeResolution {
    let primary = assignments
        .iter()
        .filter(|assignment| assignment.is_active)
        .min_by_key(|assignment| {
            (
                assignment.role.level(),
                std::cmp::Reverse(assignment.assigned_at),
                std::cmp::Reverse(assignment.id.as_uuid()),
            )
        });

    let Some(primary) = primary else {
        return ScopeResolution::Unassigned;
    };

    let boundary = boundary_for(user_id, primary);

    ScopeResolution::Resolved {
        primary: primary.clone(),
        boundary,
    }
}

fn boundary_for(user_id: UserId, assignment: &RoleAssignment) -> VisibilityBoundary {
    match assignment.role {
        RoleKind::GlobalAdmin => VisibilityBoundary::Global,
        RoleKind::CompanyAdmin => assignment
            .company_id
            .map_or(VisibilityBoundary::SelfOnly(user_id), VisibilityBoundary::Company),
        RoleKind::SiteManager => assignment
            .site_id
            .map_or(VisibilityBoundary::SelfOnly(user_id), VisibilityBoundary::Site),
        RoleKind::Contributor | RoleKind::Unrecognized => VisibilityBoundary::SelfOnly(user_id),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::{ScopeResolution, VisibilityBoundary, resolve_scope};
    use crate::assignment::{AssignmentId, RoleAssignment};
    use crate::ids::{CompanyId, SiteId};
    use crate::role::RoleKind;
    use crate::user::UserId;

    fn assignment(
        user_id: UserId,
        role: RoleKind,
        company_id: Option<CompanyId>,
        site_id: Option<SiteId>,
        assigned_hours_ago: i64,
        is_active: bool,
    ) -> RoleAssignment {
        RoleAssignment {
            id: AssignmentId::new(),
            user_id,
            role,
            company_id,
            site_id,
            assigned_by: UserId::new(),
            assigned_at: Utc::now() - Duration::hours(assigned_hours_ago),
            is_active,
        }
    }

    #[test]
    fn minimum_level_wins() {
        let user_id = UserId::new();
        let company_id = CompanyId::new();
        let assignments = vec![
            assignment(user_id, RoleKind::Contributor, None, None, 1, true),
            assignment(
                user_id,
                RoleKind::CompanyAdmin,
                Some(company_id),
                None,
                48,
                true,
            ),
        ];

        let resolution = resolve_scope(user_id, &assignments);
        assert_eq!(
            resolution.boundary(),
            Some(VisibilityBoundary::Company(company_id))
        );
        assert_eq!(
            resolution.primary().map(|primary| primary.role),
            Some(RoleKind::CompanyAdmin)
        );
    }

    #[test]
    fn equal_level_tie_breaks_to_most_recent() {
        let user_id = UserId::new();
        let older_company = CompanyId::new();
        let newer_company = CompanyId::new();
        let assignments = vec![
            assignment(
                user_id,
                RoleKind::CompanyAdmin,
                Some(older_company),
                None,
                72,
                true,
            ),
            assignment(
                user_id,
                RoleKind::CompanyAdmin,
                Some(newer_company),
                None,
                2,
                true,
            ),
        ];

        let resolution = resolve_scope(user_id, &assignments);
        assert_eq!(
            resolution.boundary(),
            Some(VisibilityBoundary::Company(newer_company))
        );
    }

    #[test]
    fn inactive_assignments_are_ignored() {
        let user_id = UserId::new();
        let assignments = vec![
            assignment(user_id, RoleKind::GlobalAdmin, None, None, 1, false),
            assignment(user_id, RoleKind::Contributor, None, None, 1, true),
        ];

        let resolution = resolve_scope(user_id, &assignments);
        assert_eq!(
            resolution.boundary(),
            Some(VisibilityBoundary::SelfOnly(user_id))
        );
    }

    #[test]
    fn zero_active_assignments_resolve_to_unassigned() {
        let user_id = UserId::new();
        let assignments = vec![assignment(
            user_id,
            RoleKind::GlobalAdmin,
            None,
            None,
            1,
            false,
        )];

        assert_eq!(
            resolve_scope(user_id, &assignments),
            ScopeResolution::Unassigned
        );
        assert!(resolve_scope(user_id, &[]).is_unassigned());
    }

    #[test]
    fn site_manager_resolves_to_site_boundary() {
        let user_id = UserId::new();
        let site_id = SiteId::new();
        let assignments = vec![assignment(
            user_id,
            RoleKind::SiteManager,
            Some(CompanyId::new()),
            Some(site_id),
            1,
            true,
        )];

        assert_eq!(
            resolve_scope(user_id, &assignments).boundary(),
            Some(VisibilityBoundary::Site(site_id))
        );
    }

    #[test]
    fn company_admin_without_company_degrades_to_self() {
        let user_id = UserId::new();
        let assignments = vec![assignment(user_id, RoleKind::CompanyAdmin, None, None, 1, true)];

        assert_eq!(
            resolve_scope(user_id, &assignments).boundary(),
            Some(VisibilityBoundary::SelfOnly(user_id))
        );
    }

    #[test]
    fn unrecognized_role_denies_by_default() {
        let user_id = UserId::new();
        let assignments = vec![assignment(
            user_id,
            RoleKind::Unrecognized,
            Some(CompanyId::new()),
            None,
            1,
            true,
        )];

        assert_eq!(
            resolve_scope(user_id, &assignments).boundary(),
            Some(VisibilityBoundary::SelfOnly(user_id))
        );
    }
}
