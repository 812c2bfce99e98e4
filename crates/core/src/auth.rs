use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User information persisted in the authenticated session.
///
/// Constructed once at login and invalidated on logout; every operation
/// requiring identity receives it explicitly rather than reading ambient
/// global state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    user_id: Uuid,
    display_name: String,
    email: String,
}

impl UserIdentity {
    /// Creates a user identity from authentication data.
    #[must_use]
    pub fn new(user_id: Uuid, display_name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            user_id,
            display_name: display_name.into(),
            email: email.into(),
        }
    }

    /// Returns the authenticated user's id.
    #[must_use]
    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    /// Returns the display name for the current user.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// Returns the canonical email address.
    #[must_use]
    pub fn email(&self) -> &str {
        self.email.as_str()
    }
}
