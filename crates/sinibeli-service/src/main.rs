//! Sinibeli Service - HTTP API for companies, customers, products and transactions
//!
//! This is the main entry point for the sinibeli service.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use sinibeli_service::{create_router, AppState, Cache, LogFormat, RedisBackend, ServiceConfig};
use sinibeli_store::PgStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration from environment
    let config = ServiceConfig::from_env()?;

    init_tracing(&config);

    tracing::info!("Starting Sinibeli Service");
    tracing::info!(
        listen_addr = %config.listen_addr(),
        db_max_connections = config.db_max_connections,
        run_migrations = config.run_migrations,
        cache_enabled = config.cache.enabled,
        auth_required = config.auth_required,
        log_format = %config.log_format,
        "Service configuration loaded"
    );

    // Connect to PostgreSQL
    let store = PgStore::connect(&config.database_url, config.db_max_connections).await?;
    if config.run_migrations {
        store.migrate().await?;
        tracing::info!("Database migrations applied");
    }

    // Connect to Redis (optional)
    let cache = if config.cache.enabled {
        match RedisBackend::connect(&config.cache).await {
            Ok(backend) => Some(Cache::new(Arc::new(backend))),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to connect to Redis, continuing without it");
                None
            }
        }
    } else {
        None
    };

    // Build app state
    let state = AppState::new(Arc::new(store), config.clone(), cache);

    // Create the router
    let app = create_router(state);
    tracing::info!("Router configured with all API endpoints");

    // Start HTTP server
    let listen_addr = config.listen_addr();
    tracing::info!(listen_addr = %listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Install the global subscriber. `RUST_LOG` wins over `LOG_LEVEL`.
fn init_tracing(config: &ServiceConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},tower_http=info", config.log_level)));

    let registry = tracing_subscriber::registry().with(filter);
    match config.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Simple => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

/// Resolve on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
