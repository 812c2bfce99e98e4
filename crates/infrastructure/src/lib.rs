//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod argon2_password_hasher;
mod postgres_activity_repository;
mod postgres_assignment_repository;
mod postgres_client_repository;
mod postgres_directory_repository;
mod postgres_pipeline_repository;
mod postgres_rate_limit_repository;
mod postgres_stats_repository;
mod postgres_user_repository;
mod scope_binds;

pub use argon2_password_hasher::Argon2PasswordHasher;
pub use postgres_activity_repository::PostgresActivityRepository;
pub use postgres_assignment_repository::PostgresAssignmentRepository;
pub use postgres_client_repository::PostgresClientRepository;
pub use postgres_directory_repository::PostgresDirectoryRepository;
pub use postgres_pipeline_repository::PostgresPipelineRepository;
pub use postgres_rate_limit_repository::PostgresRateLimitRepository;
pub use postgres_stats_repository::PostgresStatsRepository;
pub use postgres_user_repository::PostgresUserRepository;

/// Embedded migrations for the dashboard schema.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
