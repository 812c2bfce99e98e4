//! User management ports and application service.
//!
//! Owns user lifecycle operations: registration, authentication, password
//! changes, and soft deactivation. Follows OWASP guidelines for generic
//! error messages and constant-time responses.

use std::sync::Arc;

use async_trait::async_trait;

use vantage_core::{AppError, AppResult, UserIdentity};
use vantage_domain::{
    ActivityAction, EmailAddress, ScopeResolution, UserId, VisibilityBoundary, validate_password,
};

use crate::{ActivityEntry, ActivityService};

// ---------------------------------------------------------------------------
// Ports
// ---------------------------------------------------------------------------

/// User record returned by repository queries.
#[derive(Debug, Clone)]
pub struct UserRecord {
    /// Unique user identifier.
    pub id: UserId,
    /// Canonical email address.
    pub email: String,
    /// Display name shown on the dashboard.
    pub display_name: String,
    /// Argon2id password hash.
    pub password_hash: String,
    /// Accounts are soft-deactivated, never hard-deleted.
    pub is_active: bool,
}

/// Repository port for user persistence.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Finds a user by email (case-insensitive), active or not.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRecord>>;

    /// Finds a user by their unique identifier.
    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<UserRecord>>;

    /// Creates a new active user record. Returns the assigned user ID.
    async fn create(
        &self,
        email: &str,
        display_name: &str,
        password_hash: &str,
    ) -> AppResult<UserId>;

    /// Updates the password hash for a user.
    async fn update_password(&self, user_id: UserId, password_hash: &str) -> AppResult<()>;

    /// Soft-deactivates the account.
    async fn deactivate(&self, user_id: UserId) -> AppResult<()>;
}

/// Port for password hashing operations. Keeps domain/application free of
/// direct cryptographic library coupling.
pub trait PasswordHasher: Send + Sync {
    /// Hashes a plaintext password using Argon2id.
    fn hash_password(&self, password: &str) -> AppResult<String>;

    /// Verifies a plaintext password against a stored hash.
    /// Must run in constant time regardless of validity.
    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool>;
}

// ---------------------------------------------------------------------------
// Authentication outcome
// ---------------------------------------------------------------------------

/// Result of a login attempt.
#[derive(Debug)]
pub enum AuthOutcome {
    /// Authentication succeeded. Session can be established.
    Authenticated(UserRecord),
    /// Authentication failed. Unknown email, inactive account, and wrong
    /// password all produce this same shape to prevent enumeration.
    Failed,
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Parameters for user registration.
pub struct RegisterParams {
    /// Email address for the new account.
    pub email: String,
    /// Plaintext password (validated against OWASP rules).
    pub password: String,
    /// Display name shown on the dashboard.
    pub display_name: String,
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Application service for user authentication and registration.
#[derive(Clone)]
pub struct UserService {
    user_repository: Arc<dyn UserRepository>,
    password_hasher: Arc<dyn PasswordHasher>,
    activity_service: ActivityService,
}

impl UserService {
    /// Creates a new user service.
    #[must_use]
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        password_hasher: Arc<dyn PasswordHasher>,
        activity_service: ActivityService,
    ) -> Self {
        Self {
            user_repository,
            password_hasher,
            activity_service,
        }
    }

    /// Registers a new user with email and password.
    pub async fn register(&self, params: RegisterParams) -> AppResult<UserId> {
        let email_address = EmailAddress::new(&params.email)?;
        validate_password(&params.password)?;

        let display_name = params.display_name.trim();
        if display_name.is_empty() {
            return Err(AppError::Validation(
                "display name must not be empty".to_owned(),
            ));
        }

        // Check for existing user -- always hash to prevent timing attacks.
        let existing = self
            .user_repository
            .find_by_email(email_address.as_str())
            .await?;

        if existing.is_some() {
            // OWASP: do not reveal that the account exists.
            let _ = self.password_hasher.hash_password(&params.password);
            return Err(AppError::Conflict(
                "an account could not be created with the details provided".to_owned(),
            ));
        }

        let password_hash = self.password_hasher.hash_password(&params.password)?;
        let user_id = self
            .user_repository
            .create(email_address.as_str(), display_name, &password_hash)
            .await?;

        self.activity_service
            .record(ActivityEntry {
                user_id,
                action: ActivityAction::Registration,
                resource_type: "user".to_owned(),
                resource_id: user_id.to_string(),
                company_id: None,
                site_id: None,
                details: None,
            })
            .await?;

        Ok(user_id)
    }

    /// Authenticates a user with email and password.
    ///
    /// Returns [`AuthOutcome::Failed`] for any failure -- unknown email,
    /// deactivated account, or wrong password -- so the caller cannot tell
    /// which check rejected the attempt.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<AuthOutcome> {
        let user = self.user_repository.find_by_email(email).await?;

        let Some(user) = user else {
            // OWASP: always hash to prevent timing attacks even when the
            // user is not found.
            let _ = self.password_hasher.hash_password(password);
            return Ok(AuthOutcome::Failed);
        };

        if !user.is_active {
            let _ = self.password_hasher.hash_password(password);
            return Ok(AuthOutcome::Failed);
        }

        let password_valid = self
            .password_hasher
            .verify_password(password, &user.password_hash)?;

        if !password_valid {
            return Ok(AuthOutcome::Failed);
        }

        Ok(AuthOutcome::Authenticated(user))
    }

    /// Appends the `login` activity row for an authenticated user.
    pub async fn record_login(&self, user_id: UserId) -> AppResult<()> {
        self.activity_service
            .record(ActivityEntry {
                user_id,
                action: ActivityAction::Login,
                resource_type: "session".to_owned(),
                resource_id: user_id.to_string(),
                company_id: None,
                site_id: None,
                details: None,
            })
            .await
    }

    /// Appends the `logout` activity row.
    ///
    /// Safe to call repeatedly: each call appends one row and succeeds even
    /// when no session remains.
    pub async fn record_logout(&self, user_id: UserId) -> AppResult<()> {
        self.activity_service
            .record(ActivityEntry {
                user_id,
                action: ActivityAction::Logout,
                resource_type: "session".to_owned(),
                resource_id: user_id.to_string(),
                company_id: None,
                site_id: None,
                details: None,
            })
            .await
    }

    /// Changes the password for an authenticated user.
    ///
    /// Requires the current password for verification (OWASP Authentication:
    /// change password feature).
    pub async fn change_password(
        &self,
        user_id: UserId,
        current_password: &str,
        new_password: &str,
    ) -> AppResult<()> {
        let user = self
            .user_repository
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("user not found".to_owned()))?;

        let current_valid = self
            .password_hasher
            .verify_password(current_password, &user.password_hash)?;

        if !current_valid {
            return Err(AppError::Unauthorized(
                "current password is incorrect".to_owned(),
            ));
        }

        validate_password(new_password)?;

        let new_hash = self.password_hasher.hash_password(new_password)?;
        self.user_repository.update_password(user_id, &new_hash).await
    }

    /// Soft-deactivates an account. Restricted to global administrators.
    pub async fn deactivate(
        &self,
        actor: &UserIdentity,
        resolution: &ScopeResolution,
        user_id: UserId,
    ) -> AppResult<()> {
        if resolution.boundary() != Some(VisibilityBoundary::Global) {
            return Err(AppError::Forbidden(
                "only a global administrator may deactivate accounts".to_owned(),
            ));
        }

        self.user_repository.deactivate(user_id).await?;

        self.activity_service
            .record(ActivityEntry {
                user_id: UserId::from_uuid(actor.user_id()),
                action: ActivityAction::UserDeactivated,
                resource_type: "user".to_owned(),
                resource_id: user_id.to_string(),
                company_id: None,
                site_id: None,
                details: None,
            })
            .await
    }

    /// Returns a user record by ID, if it exists.
    pub async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<UserRecord>> {
        self.user_repository.find_by_id(user_id).await
    }
}

#[cfg(test)]
mod tests;
