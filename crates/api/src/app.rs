use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use domain::services::{AuthGateway, KpiAggregator, KpiDataSource, LoginService};
use shared::clock::Clock;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{metrics_handler, metrics_middleware, require_session, trace_id};
use crate::routes::{auth, dashboard, health};
use crate::services::SessionStore;

/// Backend collaborators the application is wired to.
///
/// Production wires the Postgres adapters; tests wire in-memory fakes.
pub struct AppServices {
    pub data_source: Arc<dyn KpiDataSource>,
    pub auth_gateway: Arc<dyn AuthGateway>,
    pub clock: Arc<dyn Clock>,
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub data_source: Arc<dyn KpiDataSource>,
    pub aggregator: KpiAggregator,
    pub login: LoginService,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(config: Config, services: AppServices) -> Self {
        let aggregator = KpiAggregator::new(
            Arc::clone(&services.data_source),
            Arc::clone(&services.clock),
            config.dashboard.aggregator_settings(),
        );
        let sessions = SessionStore::new(config.session.ttl(), services.clock);

        Self {
            config: Arc::new(config),
            data_source: services.data_source,
            aggregator,
            login: LoginService::new(services.auth_gateway),
            sessions: Arc::new(sessions),
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    let config = Arc::clone(&state.config);

    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Routes that require a live session
    let session_routes = Router::new()
        .route("/api/v1/auth/logout", post(auth::logout))
        .route("/api/v1/dashboard/kpis", get(dashboard::get_kpis))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_routes)
        .merge(session_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
