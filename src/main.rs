use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::extract::DefaultBodyLimit;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use praromvik_api::config::{self, StoreBackend};
use praromvik_api::database::{DocumentStore, MemoryStore, MongoStore};
use praromvik_api::handlers::{self, AppState};
use praromvik_api::services::RecordService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up MONGODB_URI and friends
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "praromvik_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();
    info!("Starting Praromvik API in {:?} mode", config.environment);

    // Connect once; every request shares this handle
    let mut mongo = None;
    let store: Arc<dyn DocumentStore> = match config.database.backend {
        StoreBackend::Mongo => {
            let client = MongoStore::connect(&config.database)
                .await
                .context("failed to connect to MongoDB")?;
            mongo = Some(client.clone());
            Arc::new(client)
        }
        StoreBackend::Memory => {
            if praromvik_api::is_production!() {
                anyhow::bail!("the in-memory store is not allowed in production");
            }
            warn!("Using in-memory store; data is lost on shutdown");
            Arc::new(MemoryStore::new())
        }
    };

    let records = RecordService::new(
        store,
        Duration::from_millis(config.database.operation_timeout_ms),
    );

    let mut app = handlers::router(AppState::new(records))
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .layer(TimeoutLayer::new(Duration::from_millis(
            config.api.request_timeout_ms,
        )));
    if config.api.enable_request_logging {
        app = app.layer(TraceLayer::new_for_http());
    }
    if config.security.enable_cors {
        app = app.layer(handlers::cors_layer(&config.security));
    }

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    info!("Praromvik API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if let Some(mongo) = mongo {
        mongo.shutdown().await;
    }
    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for ctrl-c: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    warn!("Received shutdown signal, draining connections");
}
