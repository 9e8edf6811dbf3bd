use care_navigator::{api_router, lifecycle, AppState, Config};

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    lifecycle::init_tracing(lifecycle::DEFAULT_LOG_FILTER);

    tracing::info!("Starting Care Navigator data access API");

    // Load configuration
    let config = Config::from_env()?;
    let shutdown_timeout = config.shutdown_timeout_secs;
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    let metrics = lifecycle::metrics_router()?;

    // Seed records and the interaction store
    let start = std::time::Instant::now();
    let state = Arc::new(AppState::new(&config).await?);
    tracing::info!(
        elapsed_ms = start.elapsed().as_millis() as u64,
        "State initialized",
    );

    let mut app = api_router(state).merge(metrics);
    if let Some(cors) = lifecycle::cors_layer(&config.cors_origins)? {
        tracing::info!(origins = ?config.cors_origins, "CORS enabled");
        app = app.layer(cors);
    }
    let app = app.layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()));

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(lifecycle::shutdown_signal(shutdown_timeout))
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}
