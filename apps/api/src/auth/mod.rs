mod password;
mod session;
pub(crate) mod session_helpers;

pub use password::{change_password_handler, login_handler, register_handler};
pub use session::{logout_handler, me_handler};

/// Session key holding the authenticated identity.
pub const SESSION_USER_KEY: &str = "user_identity";
/// Session key holding the scope resolution computed at login.
pub const SESSION_SCOPE_KEY: &str = "scope_resolution";
