use care_navigator::{lifecycle, mcp_router, BridgeConfig, HttpDataAccess, ToolBridge, ToolRegistry};

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    lifecycle::init_tracing(lifecycle::DEFAULT_LOG_FILTER);

    let config = BridgeConfig::from_env()?;
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!(
        api_base = %config.api_base,
        lookup_timeout_ms = config.timeouts.lookup.as_millis() as u64,
        query_timeout_ms = config.timeouts.query.as_millis() as u64,
        "Starting Care Navigator tool bridge",
    );

    let metrics = lifecycle::metrics_router()?;

    let registry = Arc::new(ToolRegistry::care_navigator());
    let backend = Arc::new(HttpDataAccess::new(&config.api_base, config.timeouts)?);
    let bridge = Arc::new(ToolBridge::new(registry, backend));
    tracing::info!(tools = bridge.tools().len(), "Tool registry ready");

    let app = mcp_router(bridge)
        .merge(metrics)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()));

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(address = %addr, "MCP endpoint listening at /mcp");

    axum::serve(listener, app)
        .with_graceful_shutdown(lifecycle::shutdown_signal(config.shutdown_timeout_secs))
        .await?;

    tracing::info!("Bridge shutdown complete");
    Ok(())
}
