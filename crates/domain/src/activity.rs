//! Stable activity actions recorded in the append-only activity log.

use serde::{Deserialize, Serialize};

/// Actions emitted by application use-cases into the activity log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    /// Emitted when a user signs in.
    Login,
    /// Emitted when a user signs out.
    Logout,
    /// Emitted when a new account is registered.
    Registration,
    /// Emitted when an account is deactivated.
    UserDeactivated,
    /// Emitted when a company is created.
    CompanyCreated,
    /// Emitted when a company is deactivated.
    CompanyDeactivated,
    /// Emitted when a site is created.
    SiteCreated,
    /// Emitted when a site is deactivated.
    SiteDeactivated,
    /// Emitted when a client record is created.
    ClientCreated,
    /// Emitted when a client record is updated.
    ClientUpdated,
    /// Emitted when a proposal is created.
    ProposalCreated,
    /// Emitted when a proposal status changes.
    ProposalStatusChanged,
    /// Emitted when a sale is closed against a proposal.
    SaleClosed,
    /// Emitted when a role is assigned to a user.
    RoleAssigned,
    /// Emitted when a role assignment is revoked.
    RoleRevoked,
}

impl ActivityAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Login => "auth.login",
            Self::Logout => "auth.logout",
            Self::Registration => "auth.registration",
            Self::UserDeactivated => "user.deactivated",
            Self::CompanyCreated => "directory.company.created",
            Self::CompanyDeactivated => "directory.company.deactivated",
            Self::SiteCreated => "directory.site.created",
            Self::SiteDeactivated => "directory.site.deactivated",
            Self::ClientCreated => "client.created",
            Self::ClientUpdated => "client.updated",
            Self::ProposalCreated => "proposal.created",
            Self::ProposalStatusChanged => "proposal.status_changed",
            Self::SaleClosed => "sale.closed",
            Self::RoleAssigned => "security.role.assigned",
            Self::RoleRevoked => "security.role.revoked",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ActivityAction;

    #[test]
    fn storage_values_are_distinct() {
        let actions = [
            ActivityAction::Login,
            ActivityAction::Logout,
            ActivityAction::Registration,
            ActivityAction::UserDeactivated,
            ActivityAction::CompanyCreated,
            ActivityAction::CompanyDeactivated,
            ActivityAction::SiteCreated,
            ActivityAction::SiteDeactivated,
            ActivityAction::ClientCreated,
            ActivityAction::ClientUpdated,
            ActivityAction::ProposalCreated,
            ActivityAction::ProposalStatusChanged,
            ActivityAction::SaleClosed,
            ActivityAction::RoleAssigned,
            ActivityAction::RoleRevoked,
        ];

        let mut values: Vec<&str> = actions.iter().map(ActivityAction::as_str).collect();
        values.sort_unstable();
        values.dedup();
        assert_eq!(values.len(), actions.len());
    }
}
