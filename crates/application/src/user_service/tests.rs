use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use vantage_core::{AppError, AppResult};
use vantage_domain::{ActivityAction, UserId, VisibilityBoundary};

use crate::activity_service::{ActivityEntry, ActivityRecord, ActivityRepository, ActivityService};

use super::{AuthOutcome, PasswordHasher, RegisterParams, UserRecord, UserRepository, UserService};

#[derive(Default)]
struct FakeUserRepository {
    users: Mutex<Vec<UserRecord>>,
}

impl FakeUserRepository {
    async fn seed(&self, email: &str, password_hash: &str, is_active: bool) -> UserId {
        let user_id = UserId::new();
        self.users.lock().await.push(UserRecord {
            id: user_id,
            email: email.to_owned(),
            display_name: "seeded".to_owned(),
            password_hash: password_hash.to_owned(),
            is_active,
        });
        user_id
    }
}

#[async_trait]
impl UserRepository for FakeUserRepository {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRecord>> {
        Ok(self
            .users
            .lock()
            .await
            .iter()
            .find(|user| user.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<UserRecord>> {
        Ok(self
            .users
            .lock()
            .await
            .iter()
            .find(|user| user.id == user_id)
            .cloned())
    }

    async fn create(
        &self,
        email: &str,
        display_name: &str,
        password_hash: &str,
    ) -> AppResult<UserId> {
        let user_id = UserId::new();
        self.users.lock().await.push(UserRecord {
            id: user_id,
            email: email.to_owned(),
            display_name: display_name.to_owned(),
            password_hash: password_hash.to_owned(),
            is_active: true,
        });
        Ok(user_id)
    }

    async fn update_password(&self, user_id: UserId, password_hash: &str) -> AppResult<()> {
        let mut users = self.users.lock().await;
        let user = users
            .iter_mut()
            .find(|user| user.id == user_id)
            .ok_or_else(|| AppError::NotFound("user not found".to_owned()))?;
        user.password_hash = password_hash.to_owned();
        Ok(())
    }

    async fn deactivate(&self, user_id: UserId) -> AppResult<()> {
        let mut users = self.users.lock().await;
        let user = users
            .iter_mut()
            .find(|user| user.id == user_id)
            .ok_or_else(|| AppError::NotFound("user not found".to_owned()))?;
        user.is_active = false;
        Ok(())
    }
}

/// Reversible "hash" so tests can seed known hashes without Argon2.
struct FakePasswordHasher;

impl PasswordHasher for FakePasswordHasher {
    fn hash_password(&self, password: &str) -> AppResult<String> {
        Ok(format!("hashed:{password}"))
    }

    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
        Ok(hash == format!("hashed:{password}"))
    }
}

#[derive(Default)]
struct FakeActivityRepository {
    entries: Mutex<Vec<ActivityEntry>>,
}

#[async_trait]
impl ActivityRepository for FakeActivityRepository {
    async fn append(&self, entry: ActivityEntry) -> AppResult<()> {
        self.entries.lock().await.push(entry);
        Ok(())
    }

    async fn list_visible(
        &self,
        _boundary: VisibilityBoundary,
        _limit: u32,
        _offset: u32,
    ) -> AppResult<Vec<ActivityRecord>> {
        Ok(Vec::new())
    }
}

fn service() -> (UserService, Arc<FakeUserRepository>, Arc<FakeActivityRepository>) {
    let user_repository = Arc::new(FakeUserRepository::default());
    let activity_repository = Arc::new(FakeActivityRepository::default());
    let service = UserService::new(
        user_repository.clone(),
        Arc::new(FakePasswordHasher),
        ActivityService::new(activity_repository.clone()),
    );
    (service, user_repository, activity_repository)
}

#[tokio::test]
async fn login_with_correct_credentials_succeeds() {
    let (service, repository, _) = service();
    repository
        .seed("alice@example.com", "hashed:correct-horse", true)
        .await;

    let outcome = service.login("alice@example.com", "correct-horse").await;

    assert!(matches!(outcome, Ok(AuthOutcome::Authenticated(_))));
}

#[tokio::test]
async fn wrong_password_and_unknown_email_fail_identically() {
    let (service, repository, _) = service();
    repository
        .seed("alice@example.com", "hashed:correct-horse", true)
        .await;

    let wrong_password = service.login("alice@example.com", "wrong-battery").await;
    let unknown_email = service.login("nobody@example.com", "correct-horse").await;

    // Same shape for both: no caller can distinguish which check failed.
    assert!(matches!(wrong_password, Ok(AuthOutcome::Failed)));
    assert!(matches!(unknown_email, Ok(AuthOutcome::Failed)));
}

#[tokio::test]
async fn deactivated_account_fails_like_unknown_email() {
    let (service, repository, _) = service();
    repository
        .seed("gone@example.com", "hashed:correct-horse", false)
        .await;

    let outcome = service.login("gone@example.com", "correct-horse").await;

    assert!(matches!(outcome, Ok(AuthOutcome::Failed)));
}

#[tokio::test]
async fn register_rejects_duplicate_email_without_detail() {
    let (service, repository, _) = service();
    repository
        .seed("taken@example.com", "hashed:whatever-here", true)
        .await;

    let result = service
        .register(RegisterParams {
            email: "taken@example.com".to_owned(),
            password: "a-long-enough-password".to_owned(),
            display_name: "Dup".to_owned(),
        })
        .await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn register_writes_activity_row() {
    let (service, _, activity_repository) = service();

    let result = service
        .register(RegisterParams {
            email: "new@example.com".to_owned(),
            password: "a-long-enough-password".to_owned(),
            display_name: "New User".to_owned(),
        })
        .await;

    assert!(result.is_ok());
    let entries = activity_repository.entries.lock().await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action, ActivityAction::Registration);
}

#[tokio::test]
async fn change_password_requires_current_password() {
    let (service, repository, _) = service();
    let user_id = repository
        .seed("bob@example.com", "hashed:original-secret", true)
        .await;

    let wrong = service
        .change_password(user_id, "not-the-original", "my-next-passphrase")
        .await;
    assert!(matches!(wrong, Err(AppError::Unauthorized(_))));

    let right = service
        .change_password(user_id, "original-secret", "my-next-passphrase")
        .await;
    assert!(right.is_ok());

    let outcome = service.login("bob@example.com", "my-next-passphrase").await;
    assert!(matches!(outcome, Ok(AuthOutcome::Authenticated(_))));
}

#[tokio::test]
async fn logout_recorded_twice_appends_two_rows() {
    let (service, _, activity_repository) = service();
    let user_id = UserId::new();

    assert!(service.record_logout(user_id).await.is_ok());
    assert!(service.record_logout(user_id).await.is_ok());

    let entries = activity_repository.entries.lock().await;
    assert_eq!(entries.len(), 2);
    assert!(entries
        .iter()
        .all(|entry| entry.action == ActivityAction::Logout));
}
