use vantage_application::{
    ActivityService, AuthorizationService, ClientService, DirectoryService, PipelineService,
    RateLimitService, StatsService, UserService,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub authorization_service: AuthorizationService,
    pub directory_service: DirectoryService,
    pub client_service: ClientService,
    pub pipeline_service: PipelineService,
    pub activity_service: ActivityService,
    pub stats_service: StatsService,
    pub rate_limit_service: RateLimitService,
    pub frontend_url: String,
}
