use anyhow::{Context, Result};
use simsync::api::{create_router, AppState};
use simsync::config;
use simsync::registry::Registries;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "simsync=info".into()),
        )
        .init();

    info!("simsync starting...");

    let config = config::from_env().context("Failed to load configuration")?;
    let policy = config.traffic_lights.policy();

    info!(
        bind = %config.server.bind_addr(),
        body_size_limit_bytes = config.api.body_size_limit_bytes,
        initial_state = %policy.initial_state,
        reposition = ?policy.reposition,
        unknown_ids = ?policy.unknown_ids,
        "Configuration loaded"
    );

    // Registries live for the whole process and start empty
    let registries = Arc::new(Registries::new(policy));

    let mut router = create_router(AppState {
        registries: Arc::clone(&registries),
        body_size_limit: config.api.body_size_limit_bytes,
    });
    if config.server.cors_permissive {
        router = router.layer(CorsLayer::permissive());
    }

    let listener = tokio::net::TcpListener::bind(config.server.bind_addr())
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind_addr()))?;
    info!(addr = %config.server.bind_addr(), "HTTP API listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Shutdown signal received");
    if let Err(e) = registries.log_summary() {
        warn!(error = %e, "Could not read registries at shutdown");
    }
    info!("simsync stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for ctrl_c signal");
        std::future::pending::<()>().await;
    }
}
