use std::net::SocketAddr;
use std::sync::Arc;
use tonic::transport::Server;
use tonic_reflection::server::Builder;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_grpc::{pb::portal_server::PortalServer, reflection_from_env_value, ApiKeyInterceptor, PortalGrpc};
use api_shared::FILE_DESCRIPTOR_SET;
use medichain_core::{CoreConfig, InMemoryLedger, PortalService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_grpc=info".parse()?)
                .add_directive("medichain_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr: SocketAddr = std::env::var("MEDICHAIN_GRPC_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:50051".into())
        .parse()?;

    tracing::info!("-- Starting MediChain gRPC on {}", addr);

    let cfg = CoreConfig::from_lookup(|key| std::env::var(key).ok())?;
    if cfg.api_key().is_none() {
        tracing::warn!("API_KEY is not set; every gRPC call will be rejected");
    }
    let portal = PortalService::bootstrap(&cfg, Arc::new(InMemoryLedger::new())).await?;

    let svc = PortalServer::with_interceptor(
        PortalGrpc::new(portal),
        ApiKeyInterceptor::new(cfg.api_key()),
    );
    let mut server_builder = Server::builder().add_service(svc);

    if reflection_from_env_value(std::env::var("MEDICHAIN_ENABLE_REFLECTION").ok()) {
        let reflection_service = Builder::configure()
            .register_encoded_file_descriptor_set(FILE_DESCRIPTOR_SET)
            .build_v1()?;
        server_builder = server_builder.add_service(reflection_service);
        tracing::info!("gRPC server reflection enabled");
    } else {
        tracing::info!("gRPC server reflection disabled");
    }

    server_builder.serve(addr).await?;

    Ok(())
}
