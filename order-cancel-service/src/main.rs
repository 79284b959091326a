use std::sync::Arc;

use anyhow::Context;
use common_observability::CancellationMetrics;
use order_cancel_service::{
    http_client::OrderServiceClient, i18n::StaticCatalog, order_log::TracingOrderLog, router, AppState,
    CancelConfig, CancellationReconciler,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = CancelConfig::from_env()?;
    let client = Arc::new(
        OrderServiceClient::new(&config.order_service_url, config.request_timeout)
            .context("failed to build order service client")?,
    );
    let metrics = Arc::new(CancellationMetrics::new().context("failed to register metrics")?);
    let catalog = StaticCatalog::new(&config.locale);
    info!(
        module_enabled = config.module_enabled,
        order_service_url = %config.order_service_url,
        locale = catalog.locale(),
        "Order cancel reconciler configured"
    );

    let reconciler = CancellationReconciler::new(
        Arc::new(config.clone()),
        client.clone(),
        client,
        Arc::new(catalog),
        Arc::new(TracingOrderLog),
    )
    .with_metrics(metrics.clone());

    let app = router(AppState { reconciler, metrics }).layer(TraceLayer::new_for_http());

    let addr = config.listen_addr()?;
    info!(%addr, "starting order-cancel-service");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
