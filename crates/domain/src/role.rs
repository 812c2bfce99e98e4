//! The fixed role catalog.

use serde::{Deserialize, Serialize};

/// The closed set of role kinds, ordered by privilege level.
///
/// A lower numeric level means more privilege. Storage values not in the
/// catalog parse to [`RoleKind::Unrecognized`], which every consumer must
/// handle explicitly and which never grants access beyond a user's own
/// records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleKind {
    /// Global administrator: sees every company, site, and record.
    GlobalAdmin,
    /// Company administrator: sees everything within one company.
    CompanyAdmin,
    /// Site manager: sees everything within one site.
    SiteManager,
    /// Individual contributor: sees only records they own or authored.
    Contributor,
    /// Role name stored in the catalog that this build does not know.
    Unrecognized,
}

impl RoleKind {
    /// Returns the numeric privilege level. 1 is the most privileged.
    ///
    /// `Unrecognized` reports the least privileged level possible so that
    /// scope resolution can never promote it above a known role.
    #[must_use]
    pub fn level(self) -> u8 {
        match self {
            Self::GlobalAdmin => 1,
            Self::CompanyAdmin => 2,
            Self::SiteManager => 3,
            Self::Contributor => 4,
            Self::Unrecognized => u8::MAX,
        }
    }

    /// Returns a stable storage value for this role kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GlobalAdmin => "global_admin",
            Self::CompanyAdmin => "company_admin",
            Self::SiteManager => "site_manager",
            Self::Contributor => "contributor",
            Self::Unrecognized => "unrecognized",
        }
    }

    /// Parses a storage value into a role kind.
    ///
    /// Total by design: unknown values map to [`RoleKind::Unrecognized`]
    /// rather than failing, so one bad catalog row cannot break every login.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "global_admin" => Self::GlobalAdmin,
            "company_admin" => Self::CompanyAdmin,
            "site_manager" => Self::SiteManager,
            "contributor" => Self::Contributor,
            _ => Self::Unrecognized,
        }
    }

    /// Returns all assignable roles in privilege order.
    #[must_use]
    pub fn catalog() -> &'static [Self] {
        const CATALOG: &[RoleKind] = &[
            RoleKind::GlobalAdmin,
            RoleKind::CompanyAdmin,
            RoleKind::SiteManager,
            RoleKind::Contributor,
        ];

        CATALOG
    }
}
