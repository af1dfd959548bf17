//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the REST API server on its own.
//!
//! ## Intended use
//! This binary is useful for development and debugging when you only want the REST server (with
//! OpenAPI/Swagger UI). The workspace's main `medichain-run` binary runs both gRPC and REST
//! concurrently.

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{router, AppState};
use medichain_core::{CoreConfig, InMemoryLedger, PortalService};

/// Main entry point for the MediChain REST API server
///
/// Starts the REST API server on the configured address (default: 0.0.0.0:3000).
///
/// # Environment Variables
/// - `MEDICHAIN_REST_ADDR`: Server address (default: "0.0.0.0:3000")
/// - `HUGGINGFACE_API_KEY`, `HUGGINGFACE_API_URL`, `HUGGINGFACE_MODEL`: health advisor backend
/// - `MEDICHAIN_HOSPITALS`: comma-separated hospital addresses registered at startup
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the configuration is invalid,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?)
                .add_directive("medichain_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("MEDICHAIN_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    tracing::info!("-- Starting MediChain REST API on {}", addr);

    let cfg = CoreConfig::from_lookup(|key| std::env::var(key).ok())?;
    let portal = PortalService::bootstrap(&cfg, Arc::new(InMemoryLedger::new())).await?;

    let app = router(AppState::new(portal));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
