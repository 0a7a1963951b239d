use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusBuilder;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod catalog;
mod config;
mod engine;
mod explainer;
mod ranking;
mod reference;
mod scoring;
mod store;

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await { tracing::error!(error = %e, "cannot listen for ctrl-c"); }
    tracing::info!("shutdown requested");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| config::DEFAULT_LOG_FILTER.into());
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::new(env_filter))
        .init();

    let cfg = config::Config::from_env()?;
    let metrics = match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => { tracing::warn!(error = %e, "prometheus recorder unavailable"); None }
    };

    let engine = engine::Engine::new(reference::ReferenceIndex::load(&cfg.data_path));
    tracing::info!(records = engine.index().entries().len(), "reference index ready");
    let explainer = explainer::Explainer::new(cfg.explainer.clone())?;
    tracing::info!(enabled = explainer.enabled(), model = %cfg.explainer.model, "explainer configured");

    let ctx = Arc::new(api::AppContext { engine, store: store::DiagnosisStore::default(), explainer, metrics });
    let app = api::router(ctx);

    tracing::info!(addr = %cfg.addr, "pawdx listening");
    axum::serve(tokio::net::TcpListener::bind(cfg.addr).await?, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
