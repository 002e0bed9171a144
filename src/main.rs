//! Workshop session service.
//!
//! Serves workshop records over HTTP from the configured storage backend.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use discovery_workshop::adapters::http::{build_router, SessionServiceState};
use discovery_workshop::adapters::postgres::PostgresSessionGateway;
use discovery_workshop::adapters::remote::{HttpSessionGateway, HttpSessionGatewayConfig};
use discovery_workshop::adapters::storage::{FileSessionGateway, InMemorySessionGateway};
use discovery_workshop::config::{AppConfig, ServerConfig, StorageBackend, ValidationError};
use discovery_workshop::ports::SessionGateway;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = AppConfig::load()?;
    config.validate()?;

    init_tracing(&config.server);

    let gateway = build_gateway(&config).await?;
    let mut state = SessionServiceState::new(gateway);
    match config.server.api_key.clone() {
        Some(key) => state = state.with_api_key(key),
        None => warn!("No API key configured; session routes are open"),
    }

    let router = build_router(state, &config.server);
    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;

    info!(
        %addr,
        backend = ?config.storage.backend,
        environment = ?config.server.environment,
        "Session service listening"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Session service stopped");
    Ok(())
}

fn init_tracing(server: &ServerConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&server.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    if server.is_production() {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

async fn build_gateway(config: &AppConfig) -> Result<Arc<dyn SessionGateway>, BoxError> {
    let gateway: Arc<dyn SessionGateway> = match config.storage.backend {
        StorageBackend::Memory => {
            warn!("Using in-memory storage; records are lost on restart");
            Arc::new(InMemorySessionGateway::new())
        }
        StorageBackend::File => {
            let dir = config.storage.sessions_dir();
            info!(dir = %dir.display(), "Using file storage");
            Arc::new(FileSessionGateway::new(dir))
        }
        StorageBackend::Postgres => {
            let database = config
                .database
                .as_ref()
                .ok_or(ValidationError::MissingRequired("DATABASE__URL"))?;
            Arc::new(PostgresSessionGateway::connect(database).await?)
        }
        StorageBackend::Remote => {
            let remote = config
                .remote
                .as_ref()
                .ok_or(ValidationError::MissingRequired("REMOTE__BASE_URL"))?;
            Arc::new(HttpSessionGateway::new(HttpSessionGatewayConfig::from(remote))?)
        }
    };
    Ok(gateway)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
