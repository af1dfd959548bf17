use std::net::SocketAddr;
use std::sync::Arc;
use tonic::transport::Server;
use tonic_reflection::server::Builder;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_grpc::{reflection_from_env_value, ApiKeyInterceptor, PortalGrpc};
use api_rest::AppState;
use api_shared::pb::portal_server::PortalServer;
use api_shared::FILE_DESCRIPTOR_SET;
use medichain_core::{CoreConfig, InMemoryLedger, PortalService};

/// Main entry point for the MediChain portal
///
/// Starts both gRPC and REST servers concurrently over one shared ledger:
/// - gRPC server on port 50051 (configurable via MEDICHAIN_GRPC_ADDR)
/// - REST server on port 3000 (configurable via MEDICHAIN_REST_ADDR)
///
/// The gRPC server requires authentication via x-api-key header.
/// The REST server provides open access to portal operations.
///
/// # Environment Variables
/// - `MEDICHAIN_GRPC_ADDR`: gRPC server address (default: "0.0.0.0:50051")
/// - `MEDICHAIN_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `API_KEY`: API key for gRPC authentication
/// - `HUGGINGFACE_API_KEY`: inference key; the health advisor is disabled without it
/// - `MEDICHAIN_HOSPITALS`: comma-separated hospital addresses registered at startup
/// - `MEDICHAIN_ENABLE_REFLECTION`: serve gRPC reflection when `true`
///
/// # Returns
/// * `Ok(())` - If servers start and run successfully
/// * `Err(anyhow::Error)` - If server startup or runtime fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("medichain_run=info".parse()?)
                .add_directive("medichain_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let grpc_addr: SocketAddr = std::env::var("MEDICHAIN_GRPC_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:50051".into())
        .parse()?;
    let rest_addr = std::env::var("MEDICHAIN_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    tracing::info!("++ Starting MediChain gRPC on {}", grpc_addr);
    tracing::info!("++ Starting MediChain REST on {}", rest_addr);

    let cfg = CoreConfig::from_lookup(|key| std::env::var(key).ok())?;
    let portal = PortalService::bootstrap(&cfg, Arc::new(InMemoryLedger::new())).await?;

    // Start REST server
    let rest_app = api_rest::router(AppState::new(portal.clone()));
    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    let rest_server = tokio::spawn(async move { axum::serve(listener, rest_app).await });

    // Start gRPC server
    let mut grpc_builder = Server::builder().add_service(PortalServer::with_interceptor(
        PortalGrpc::new(portal),
        ApiKeyInterceptor::new(cfg.api_key()),
    ));
    if reflection_from_env_value(std::env::var("MEDICHAIN_ENABLE_REFLECTION").ok()) {
        let reflection_service = Builder::configure()
            .register_encoded_file_descriptor_set(FILE_DESCRIPTOR_SET)
            .build_v1()?;
        grpc_builder = grpc_builder.add_service(reflection_service);
        tracing::info!("gRPC server reflection enabled");
    }
    let grpc_server = grpc_builder.serve(grpc_addr);

    // Run both
    let (rest_result, grpc_result) = tokio::join!(rest_server, grpc_server);
    rest_result??;
    grpc_result?;

    Ok(())
}
