//! Application services and ports.

#![forbid(unsafe_code)]

mod activity_service;
mod authorization_service;
mod client_service;
mod directory_service;
mod pipeline_service;
mod rate_limit_service;
mod stats_service;
mod user_service;

pub use activity_service::{ActivityEntry, ActivityRecord, ActivityRepository, ActivityService};
pub use authorization_service::{
    AssignRoleInput, AssignmentRecord, AssignmentRepository, AuthorizationService,
};
pub use client_service::{ClientRecord, ClientRepository, ClientService, NewClient, UpdateClient};
pub use directory_service::{CompanyRecord, DirectoryRepository, DirectoryService, SiteRecord};
pub use pipeline_service::{
    NewProposal, NewSale, PipelineRepository, PipelineService, ProposalRecord, SaleRecord,
};
pub use rate_limit_service::{AttemptInfo, RateLimitRepository, RateLimitRule, RateLimitService};
pub use stats_service::{DashboardStats, ProposalStatusTotal, SaleTotals, StatsRepository, StatsService};
pub use user_service::{
    AuthOutcome, PasswordHasher, RegisterParams, UserRecord, UserRepository, UserService,
};
