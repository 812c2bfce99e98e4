//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod access;
mod activity;
mod assignment;
mod ids;
mod pipeline;
mod role;
mod scope;
mod user;

pub use access::ResourceScope;
pub use activity::ActivityAction;
pub use assignment::{AssignmentId, RoleAssignment};
pub use ids::{ClientId, CompanyId, ProposalId, SaleId, SiteId};
pub use pipeline::ProposalStatus;
pub use role::RoleKind;
pub use scope::{ScopeResolution, VisibilityBoundary, resolve_scope};
pub use user::{
    EmailAddress, PASSWORD_MAX_LENGTH, PASSWORD_MIN_LENGTH, UserId, validate_password,
};
