//! Activity log ports and application service.
//!
//! The activity log is append-only: rows are inserted by use-cases and
//! never updated or deleted. Reads are scoped through the caller's
//! visibility boundary like every other collection.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use vantage_core::AppResult;
use vantage_domain::{ActivityAction, CompanyId, ScopeResolution, SiteId, UserId, VisibilityBoundary};

// ---------------------------------------------------------------------------
// Ports
// ---------------------------------------------------------------------------

/// One activity row to append.
#[derive(Debug, Clone)]
pub struct ActivityEntry {
    /// The acting user.
    pub user_id: UserId,
    /// The action performed.
    pub action: ActivityAction,
    /// Kind of resource acted on (e.g. `"client"`, `"proposal"`).
    pub resource_type: String,
    /// Identifier of the resource acted on.
    pub resource_id: String,
    /// Company the action happened in, when determinable.
    pub company_id: Option<CompanyId>,
    /// Site the action happened in, when determinable.
    pub site_id: Option<SiteId>,
    /// Free-form details payload.
    pub details: Option<serde_json::Value>,
}

/// Activity row returned by scoped queries.
#[derive(Debug, Clone)]
pub struct ActivityRecord {
    /// Row identifier.
    pub id: uuid::Uuid,
    /// The acting user.
    pub user_id: UserId,
    /// Stable action string.
    pub action: String,
    /// Kind of resource acted on.
    pub resource_type: String,
    /// Identifier of the resource acted on.
    pub resource_id: String,
    /// Free-form details payload.
    pub details: Option<serde_json::Value>,
    /// When the row was appended.
    pub created_at: DateTime<Utc>,
}

/// Repository port for activity log persistence.
#[async_trait]
pub trait ActivityRepository: Send + Sync {
    /// Appends one activity row. Never updates existing rows.
    async fn append(&self, entry: ActivityEntry) -> AppResult<()>;

    /// Lists the most recent activity rows visible under the boundary.
    async fn list_visible(
        &self,
        boundary: VisibilityBoundary,
        limit: u32,
        offset: u32,
    ) -> AppResult<Vec<ActivityRecord>>;
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Application service for the append-only activity log.
#[derive(Clone)]
pub struct ActivityService {
    repository: Arc<dyn ActivityRepository>,
}

impl ActivityService {
    /// Creates a new activity service.
    #[must_use]
    pub fn new(repository: Arc<dyn ActivityRepository>) -> Self {
        Self { repository }
    }

    /// Appends one activity row.
    ///
    /// Failures are surfaced to the caller; use-cases that must not fail on
    /// logging (logout) deliberately record and continue.
    pub async fn record(&self, entry: ActivityEntry) -> AppResult<()> {
        self.repository.append(entry).await
    }

    /// Lists recent activity visible under the caller's boundary.
    ///
    /// An unassigned caller sees an empty list without any query being
    /// issued.
    pub async fn list(
        &self,
        resolution: &ScopeResolution,
        limit: u32,
        offset: u32,
    ) -> AppResult<Vec<ActivityRecord>> {
        let Some(boundary) = resolution.boundary() else {
            return Ok(Vec::new());
        };

        self.repository
            .list_visible(boundary, limit.clamp(1, 200), offset.min(5_000))
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use vantage_core::AppResult;
    use vantage_domain::{ActivityAction, ScopeResolution, UserId, VisibilityBoundary};

    use super::{ActivityEntry, ActivityRecord, ActivityRepository, ActivityService};

    #[derive(Default)]
    struct FakeActivityRepository {
        entries: Mutex<Vec<ActivityEntry>>,
        queried: Mutex<bool>,
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
            *self.queried.lock().await = true;
            Ok(Vec::new())
        }
    }

    fn logout_entry(user_id: UserId) -> ActivityEntry {
        ActivityEntry {
            user_id,
            action: ActivityAction::Logout,
            resource_type: "session".to_owned(),
            resource_id: user_id.to_string(),
            company_id: None,
            site_id: None,
            details: None,
        }
    }

    #[tokio::test]
    async fn repeated_logout_rows_append_without_error() {
        let repository = Arc::new(FakeActivityRepository::default());
        let service = ActivityService::new(repository.clone());
        let user_id = UserId::new();

        assert!(service.record(logout_entry(user_id)).await.is_ok());
        assert!(service.record(logout_entry(user_id)).await.is_ok());
        assert_eq!(repository.entries.lock().await.len(), 2);
    }

    #[tokio::test]
    async fn unassigned_caller_triggers_no_query() {
        let repository = Arc::new(FakeActivityRepository::default());
        let service = ActivityService::new(repository.clone());

        let listed = service.list(&ScopeResolution::Unassigned, 50, 0).await;

        assert!(listed.is_ok_and(|records| records.is_empty()));
        assert!(!*repository.queried.lock().await);
    }
}
