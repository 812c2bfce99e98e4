//! Bind values translating a visibility boundary into SQL.
//!
//! Every scoped query carries the same four binds in the same order:
//! a global flag, a company id, a site id, and an owner id, three of
//! which are NULL for any given boundary. A NULL comparison in the
//! predicate evaluates to NULL and drops out of the OR chain, so each
//! query matches exactly the boundary's rows.

use uuid::Uuid;

use vantage_domain::VisibilityBoundary;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BoundaryBinds {
    pub(crate) is_global: bool,
    pub(crate) company: Option<Uuid>,
    pub(crate) site: Option<Uuid>,
    pub(crate) owner: Option<Uuid>,
}

impl From<VisibilityBoundary> for BoundaryBinds {
    fn from(boundary: VisibilityBoundary) -> Self {
        match boundary {
            VisibilityBoundary::Global => Self {
                is_global: true,
                company: None,
                site: None,
                owner: None,
            },
            VisibilityBoundary::Company(company_id) => Self {
                is_global: false,
                company: Some(company_id.as_uuid()),
                site: None,
                owner: None,
            },
            VisibilityBoundary::Site(site_id) => Self {
                is_global: false,
                company: None,
                site: Some(site_id.as_uuid()),
                owner: None,
            },
            VisibilityBoundary::SelfOnly(user_id) => Self {
                is_global: false,
                company: None,
                site: None,
                owner: Some(user_id.as_uuid()),
            },
        }
    }
}
