use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use fsm_dashboard_api::app::{create_app, AppServices, AppState};
use fsm_dashboard_api::config::Config;
use fsm_dashboard_api::jobs::{JobScheduler, PoolMetricsJob, SessionCleanupJob};
use fsm_dashboard_api::middleware::{init_metrics, logging::init_logging};
use persistence::repositories::{PgAuthGateway, PgKpiDataSource};
use shared::clock::SystemClock;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = Config::load()?;

    init_logging(&config.logging);
    init_metrics()?;

    info!("Starting FSM dashboard service v{}", env!("CARGO_PKG_VERSION"));

    // The backend schema is managed elsewhere; no migrations run here.
    let pool = persistence::db::create_pool(&config.persistence_database_config())?;

    let state = AppState::new(
        config.clone(),
        AppServices {
            data_source: Arc::new(PgKpiDataSource::new(pool.clone())),
            auth_gateway: Arc::new(PgAuthGateway::new(pool.clone())),
            clock: Arc::new(SystemClock),
        },
    );

    let mut scheduler = JobScheduler::new();
    scheduler.register(SessionCleanupJob::new(Arc::clone(&state.sessions)));
    scheduler.register(PoolMetricsJob::new(pool.clone()));
    scheduler.start();

    let app = create_app(state);

    let addr = config.socket_addr()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.shutdown();
    scheduler.wait_for_shutdown(Duration::from_secs(5)).await;
    pool.close().await;
    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
