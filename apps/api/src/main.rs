//! Vantage API composition root.

#![forbid(unsafe_code)]

mod auth;
mod dto;
mod error;
mod handlers;
mod middleware;
mod state;

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::sync::Arc;

use axum::Router;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post, put};
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tower_sessions::cookie::SameSite;
use tower_sessions::cookie::time::Duration;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;
use tracing::info;
use tracing_subscriber::EnvFilter;

use vantage_application::{
    ActivityService, AuthorizationService, ClientRepository, ClientService, DirectoryService,
    PipelineService, RateLimitRule, RateLimitService, StatsService, UserService,
};
use vantage_core::AppError;
use vantage_infrastructure::{
    Argon2PasswordHasher, PostgresActivityRepository, PostgresAssignmentRepository,
    PostgresClientRepository, PostgresDirectoryRepository, PostgresPipelineRepository,
    PostgresRateLimitRepository, PostgresStatsRepository, PostgresUserRepository,
};

use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let migrate_only = env::args().nth(1).as_deref() == Some("migrate");

    let database_url = required_env("DATABASE_URL")?;
    let frontend_url =
        env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());

    let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
    let api_port = env::var("API_PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(3001);

    let cookie_secure = env::var("SESSION_COOKIE_SECURE")
        .unwrap_or_else(|_| "false".to_owned())
        .eq_ignore_ascii_case("true");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))?;

    vantage_infrastructure::MIGRATOR
        .run(&pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))?;

    if migrate_only {
        info!("database migrations applied successfully");
        return Ok(());
    }

    let session_store = PostgresStore::new(pool.clone())
        .with_table_name("tower_sessions")
        .map_err(|error| {
            AppError::Validation(format!("invalid session table name configuration: {error}"))
        })?;
    session_store.migrate().await.map_err(|error| {
        AppError::Internal(format!("failed to initialize session store: {error}"))
    })?;

    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(cookie_secure)
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_expiry(Expiry::OnInactivity(Duration::minutes(30)));

    let activity_repository = Arc::new(PostgresActivityRepository::new(pool.clone()));
    let activity_service = ActivityService::new(activity_repository);

    let assignment_repository = Arc::new(PostgresAssignmentRepository::new(pool.clone()));
    let directory_repository = Arc::new(PostgresDirectoryRepository::new(pool.clone()));
    let authorization_service = AuthorizationService::new(
        assignment_repository,
        directory_repository.clone(),
        activity_service.clone(),
    );
    let directory_service =
        DirectoryService::new(directory_repository, activity_service.clone());

    let user_repository = Arc::new(PostgresUserRepository::new(pool.clone()));
    let password_hasher = Arc::new(Argon2PasswordHasher::new());
    let user_service =
        UserService::new(user_repository, password_hasher, activity_service.clone());

    let client_repository: Arc<dyn ClientRepository> =
        Arc::new(PostgresClientRepository::new(pool.clone()));
    let client_service = ClientService::new(
        client_repository.clone(),
        authorization_service.clone(),
        activity_service.clone(),
    );

    let pipeline_repository = Arc::new(PostgresPipelineRepository::new(pool.clone()));
    let pipeline_service = PipelineService::new(
        pipeline_repository,
        client_repository,
        authorization_service.clone(),
        activity_service.clone(),
    );

    let stats_repository = Arc::new(PostgresStatsRepository::new(pool.clone()));
    let stats_service = StatsService::new(stats_repository);

    let rate_limit_repository = Arc::new(PostgresRateLimitRepository::new(pool.clone()));
    let rate_limit_service = RateLimitService::new(rate_limit_repository);

    let app_state = AppState {
        user_service,
        authorization_service,
        directory_service,
        client_service,
        pipeline_service,
        activity_service,
        stats_service,
        rate_limit_service,
        frontend_url: frontend_url.clone(),
    };

    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me_handler))
        .route("/api/profile/password", put(auth::change_password_handler))
        .route(
            "/api/companies",
            get(handlers::directory::list_companies_handler)
                .post(handlers::directory::create_company_handler),
        )
        .route(
            "/api/companies/{company_id}/deactivate",
            post(handlers::directory::deactivate_company_handler),
        )
        .route(
            "/api/companies/{company_id}/sites",
            get(handlers::directory::list_sites_handler)
                .post(handlers::directory::create_site_handler),
        )
        .route(
            "/api/companies/{company_id}/sites/{site_id}/deactivate",
            post(handlers::directory::deactivate_site_handler),
        )
        .route(
            "/api/clients",
            get(handlers::clients::list_clients_handler)
                .post(handlers::clients::create_client_handler),
        )
        .route(
            "/api/clients/{client_id}",
            put(handlers::clients::update_client_handler),
        )
        .route(
            "/api/proposals",
            get(handlers::pipeline::list_proposals_handler)
                .post(handlers::pipeline::create_proposal_handler),
        )
        .route(
            "/api/proposals/{proposal_id}/status",
            put(handlers::pipeline::change_proposal_status_handler),
        )
        .route(
            "/api/sales",
            get(handlers::pipeline::list_sales_handler)
                .post(handlers::pipeline::close_sale_handler),
        )
        .route(
            "/api/activity",
            get(handlers::activity::list_activity_handler),
        )
        .route(
            "/api/dashboard/stats",
            get(handlers::dashboard::dashboard_stats_handler),
        )
        .route(
            "/api/assignments",
            get(handlers::assignments::list_assignments_handler)
                .post(handlers::assignments::assign_role_handler),
        )
        .route(
            "/api/assignments/{assignment_id}/revoke",
            post(handlers::assignments::revoke_assignment_handler),
        )
        .route(
            "/api/users/{user_id}/deactivate",
            post(handlers::users::deactivate_user_handler),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_auth,
        ));

    let login_routes = Router::new()
        .route("/auth/login", post(auth::login_handler))
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::rate_limit,
        ))
        .layer(axum::Extension(RateLimitRule::LOGIN));

    let register_routes = Router::new()
        .route("/auth/register", post(auth::register_handler))
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::rate_limit,
        ))
        .layer(axum::Extension(RateLimitRule::REGISTER));

    let cors_layer = CorsLayer::new()
        .allow_origin(
            HeaderValue::from_str(&frontend_url)
                .map_err(|error| AppError::Internal(format!("invalid FRONTEND_URL: {error}")))?,
        )
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE]);

    let app = Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(login_routes)
        .merge(register_routes)
        .route("/auth/logout", post(auth::logout_handler))
        .merge(protected_routes)
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_same_origin_for_mutations,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .layer(session_layer)
        .with_state(app_state);

    let host = IpAddr::from_str(&api_host)
        .map_err(|error| AppError::Internal(format!("invalid API_HOST '{api_host}': {error}")))?;
    let address = SocketAddr::from((host, api_port));

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "vantage-api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}
