mod core;
mod features;
mod modules;
mod shared;

use crate::core::config::{Config, StoreBackend};
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::core::{database, middleware};
use crate::features::files::{routes as files_routes, ExtractionService, FileService};
use crate::features::intake::{routes as intake_routes, IntakeService, SessionSweeper};
use crate::features::reports::{routes as reports_routes, ReportService, SynthesisService};
use crate::features::research::ResearchService;
use crate::modules::storage::{DocumentStore, MemoryDocumentStore, PgDocumentStore};
use crate::shared::prompts;
use crate::shared::tokenizer::Tokenizer;
use axum::{middleware::from_fn, Router};
use std::sync::Arc;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

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

    // Load configuration
    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    // Log system info
    let available_cpus = std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1);
    tracing::info!(
        "System info: available_cpus={}, tokio_worker_threads={}, pid={}",
        available_cpus,
        worker_threads,
        std::process::id()
    );

    tracing::info!("Configuration loaded successfully");

    // Document store
    let store: Arc<dyn DocumentStore> = match (config.store.backend, &config.store.database) {
        (StoreBackend::Postgres, Some(db_config)) => {
            let pool = database::create_pool(db_config).await?;
            tracing::info!("Database connection pool created");

            tracing::info!("Running database migrations...");
            database::run_migrations(&pool)
                .await
                .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;
            tracing::info!("Database migrations completed successfully");

            Arc::new(PgDocumentStore::new(pool))
        }
        (StoreBackend::Postgres, None) => {
            anyhow::bail!("DATABASE_URL must be set for the postgres document store")
        }
        (StoreBackend::Memory, _) => {
            tracing::warn!("Using in-memory document store; files and reports are lost on restart");
            Arc::new(MemoryDocumentStore::new())
        }
    };

    // Initialize File and Report Services
    let file_service = Arc::new(FileService::new(Arc::clone(&store)));
    let report_service = Arc::new(ReportService::new(Arc::clone(&store)));
    tracing::info!("File and report services initialized");

    // Initialize Extraction Service
    let tokenizer = Arc::new(Tokenizer::new().map_err(|e| anyhow::anyhow!("{}", e))?);
    tracing::info!(
        "Extraction service initialized (token policy: {:?}, ocr: {})",
        config.extraction.token_policy,
        config.extraction.tesseract_bin
    );
    let extraction_service = Arc::new(ExtractionService::new(
        tokenizer,
        config.extraction.clone(),
    ));

    // Initialize Research and Synthesis Services
    let research_service = Arc::new(
        ResearchService::new(config.search.clone()).map_err(|e| anyhow::anyhow!("{}", e))?,
    );
    tracing::info!(
        "Research service initialized (mode: {}, jurisdiction: {})",
        config.search.mode,
        config.search.jurisdiction
    );

    let missing = prompts::missing_report_templates();
    if !missing.is_empty() {
        anyhow::bail!("Prompt templates not found: {}", missing.join(", "));
    }

    let synthesis_service = Arc::new(
        SynthesisService::new(config.llm.clone()).map_err(|e| anyhow::anyhow!("{}", e))?,
    );
    tracing::info!(
        "Synthesis service initialized (model: {}, endpoint: {})",
        config.llm.model,
        config.llm.api_url
    );

    // Initialize Intake Service
    let intake_service = Arc::new(IntakeService::new(
        Arc::clone(&file_service),
        Arc::clone(&report_service),
        extraction_service,
        research_service,
        synthesis_service,
    ));
    tracing::info!("Intake service initialized");

    let session_sweeper = SessionSweeper::new(
        Arc::clone(&intake_service),
        config.app.session_ttl,
        config.app.session_sweep_interval,
    );
    tokio::spawn(async move {
        session_sweeper.run().await;
    });
    tracing::info!("Intake session sweeper spawned");

    // Build application router with dynamic swagger config
    let swagger_modifier = SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    };

    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

    // Build swagger router
    let swagger = if let Some(credentials) = config.swagger.credentials() {
        tracing::info!("Swagger UI basic auth enabled");
        Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
            .layer(from_fn(middleware::basic_auth_middleware(Arc::new(
                credentials,
            ))))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
    };

    // Simple health check endpoint
    async fn health_check() -> axum::http::StatusCode {
        axum::http::StatusCode::OK
    }
    let health_route = Router::new().route("/health", axum::routing::get(health_check));

    let api_routes = Router::new()
        .merge(intake_routes::routes(
            intake_service,
            config.app.max_request_body_size,
        ))
        .merge(reports_routes::routes(report_service))
        .merge(files_routes::routes(file_service));

    let app = Router::new()
        .merge(swagger)
        .merge(api_routes)
        .merge(health_route)
        .layer(middleware::cors_layer(
            config.app.cors_allowed_origins.clone(),
        ))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid));

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
    #[cfg(unix)]
    socket.set_reuse_port(true)?;
    socket.set_nodelay(true)?;

    socket.set_recv_buffer_size(256 * 1024)?;
    socket.set_send_buffer_size(256 * 1024)?;

    #[cfg(target_os = "linux")]
    {
        let keepalive = socket2::TcpKeepalive::new()
            .with_time(std::time::Duration::from_secs(60))
            .with_interval(std::time::Duration::from_secs(10))
            .with_retries(3);
        socket.set_tcp_keepalive(&keepalive)?;
    }
    #[cfg(not(target_os = "linux"))]
    {
        let keepalive = socket2::TcpKeepalive::new().with_time(std::time::Duration::from_secs(60));
        socket.set_tcp_keepalive(&keepalive)?;
    }

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(65535)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server listening on {}", format!("http://{}", addr));
    tracing::info!(
        "Swagger UI available at {}",
        format!("http://{}/swagger-ui/", addr)
    );

    axum::serve(listener, app).await?;

    Ok(())
}
