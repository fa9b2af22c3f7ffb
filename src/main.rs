mod core;
mod features;
mod modules;
mod shared;

use crate::core::app::create_app;
use crate::core::config::Config;
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::features::files::FileService;
use crate::modules::document_store::PostgresDocumentStore;
use crate::modules::storage::{ObjectStorage, S3Client};
use crate::shared::clock::SystemClock;
use crate::shared::constants::OBJECT_CONTAINER_NAME;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::Modify;
use utoipa::OpenApi;

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .max_blocking_threads(worker_threads * 4)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    tracing::info!(
        "Configuration loaded: tokio_worker_threads={}, pid={}",
        worker_threads,
        std::process::id()
    );

    // Object storage for the binaries
    let storage = Arc::new(
        S3Client::new(config.object_storage.clone(), OBJECT_CONTAINER_NAME)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to initialize object storage: {}", e))?,
    );
    tracing::info!(
        "Object storage ready for container: {}",
        storage.container_name()
    );

    // Document store for the metadata
    let documents = Arc::new(
        PostgresDocumentStore::connect(&config.document_store)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to initialize document store: {}", e))?,
    );
    tracing::info!(
        "Document store ready for collection: {}",
        config.document_store.container
    );

    let file_service = Arc::new(FileService::new(
        storage,
        documents,
        Arc::new(SystemClock),
    ));
    tracing::info!("File service initialized");

    let mut openapi = ApiDoc::openapi();
    SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    }
    .modify(&mut openapi);

    match config.app.max_upload_size {
        Some(limit) => tracing::info!("Upload size limit: {} bytes", limit),
        None => tracing::info!("Upload size limit: none"),
    }

    let app = create_app(file_service, &config.app, openapi);

    // Start server
    let addr = config.app.server_address();
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    // Use socket2 for TCP listener configuration
    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    socket.set_nodelay(true)?;

    let keepalive = socket2::TcpKeepalive::new().with_time(std::time::Duration::from_secs(60));
    socket.set_tcp_keepalive(&keepalive)?;

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(1024)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server started on port {}", config.app.port);
    tracing::info!("Upload page available at http://{}/ui", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
