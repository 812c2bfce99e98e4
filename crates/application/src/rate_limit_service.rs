//! Windowed attempt counting for abuse-prone endpoints.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use vantage_core::{AppError, AppResult};

/// One rate-limit policy: so many attempts per fixed window.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitRule {
    /// Namespace for the counter key, one per protected endpoint.
    pub scope: &'static str,
    /// Attempts allowed inside a window before limiting kicks in.
    pub max_attempts: u32,
    /// Window length in seconds.
    pub window_seconds: i64,
}

impl RateLimitRule {
    /// Login attempts per credential identifier.
    pub const LOGIN: Self = Self {
        scope: "auth.login",
        max_attempts: 10,
        window_seconds: 900,
    };

    /// Registrations per source address.
    pub const REGISTER: Self = Self {
        scope: "auth.register",
        max_attempts: 5,
        window_seconds: 3600,
    };
}

/// Counter state after an attempt was recorded.
#[derive(Debug, Clone)]
pub struct AttemptInfo {
    /// Attempts seen in the current window, including this one.
    pub attempts: u32,
    /// When the current window opened.
    pub window_started_at: DateTime<Utc>,
}

/// Repository port for attempt counters.
///
/// Recording is a single upsert that also rolls the window: an expired
/// counter restarts at one instead of accumulating forever.
#[async_trait]
pub trait RateLimitRepository: Send + Sync {
    /// Increments the counter for the key, rolling the window if stale,
    /// and returns the resulting state.
    async fn record_attempt(&self, key: &str, window_seconds: i64) -> AppResult<AttemptInfo>;

    /// Drops the counter for the key.
    async fn clear(&self, key: &str) -> AppResult<()>;
}

/// Application service guarding abuse-prone endpoints.
#[derive(Clone)]
pub struct RateLimitService {
    repository: Arc<dyn RateLimitRepository>,
}

impl RateLimitService {
    /// Creates a new rate-limit service.
    #[must_use]
    pub fn new(repository: Arc<dyn RateLimitRepository>) -> Self {
        Self { repository }
    }

    /// Records an attempt and rejects it once the rule's budget is spent.
    ///
    /// The identifier is normalized so `User@Example.com` and
    /// `user@example.com` share one counter.
    pub async fn check(&self, rule: RateLimitRule, identifier: &str) -> AppResult<()> {
        let key = Self::key(rule, identifier);
        let info = self
            .repository
            .record_attempt(&key, rule.window_seconds)
            .await?;

        if info.attempts > rule.max_attempts {
            return Err(AppError::RateLimited(
                "too many attempts, try again later".to_owned(),
            ));
        }

        Ok(())
    }

    /// Clears the counter after a successful attempt, so earlier failures
    /// stop counting against the caller.
    pub async fn reset(&self, rule: RateLimitRule, identifier: &str) -> AppResult<()> {
        self.repository.clear(&Self::key(rule, identifier)).await
    }

    fn key(rule: RateLimitRule, identifier: &str) -> String {
        format!("{}:{}", rule.scope, identifier.trim().to_lowercase())
    }
}
