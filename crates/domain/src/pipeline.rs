//! Pipeline value types shared by proposals and sales.

use serde::{Deserialize, Serialize};
use vantage_core::{AppError, AppResult};

/// Proposal status.
///
/// An open set by design: the dashboard groups by whatever statuses exist in
/// the data, so this is a normalized string rather than a closed enum. The
/// well-known values are exposed as constants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProposalStatus(String);

impl ProposalStatus {
    /// Initial status for a newly drafted proposal.
    pub const DRAFT: &'static str = "draft";
    /// Proposal sent to the client and awaiting a decision.
    pub const PENDING: &'static str = "pending";
    /// Proposal closed (won or abandoned); a sale may reference it.
    pub const CLOSED: &'static str = "closed";

    /// Creates a normalized status from a free-form value.
    ///
    /// Lowercases and trims; rejects empty values and values longer than
    /// 32 characters.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let normalized = value.into().trim().to_lowercase();

        if normalized.is_empty() {
            return Err(AppError::Validation(
                "proposal status must not be empty".to_owned(),
            ));
        }

        if normalized.len() > 32 {
            return Err(AppError::Validation(
                "proposal status must not exceed 32 characters".to_owned(),
            ));
        }

        Ok(Self(normalized))
    }

    /// Returns the draft status.
    #[must_use]
    pub fn draft() -> Self {
        Self(Self::DRAFT.to_owned())
    }

    /// Returns the normalized status string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns whether this status marks the proposal as closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.0 == Self::CLOSED
    }
}

impl From<ProposalStatus> for String {
    fn from(value: ProposalStatus) -> Self {
        value.0
    }
}
