pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod infra;
pub mod state;
pub mod background;

use crate::config::Config;
use crate::infra::factory::bootstrap_state;
use anyhow::Context;
use api::router::create_router;
use std::sync::Arc;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};
use crate::background::{start_background_worker, start_limiter_pruning};

pub fn init_logging(file_name: &str) -> WorkerGuard {
    let file_appender = tracing_appender::rolling::daily("./logs", file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .json()
        .with_writer(non_blocking)
        .with_filter(EnvFilter::new("info,cleaning_crm=debug"));

    let stdout_layer = tracing_subscriber::fmt::layer()
        .pretty()
        .with_target(false)
        .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()));

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
        .init();

    info!("Logging initialized. Writing JSON logs to ./logs/{}", file_name);
    guard
}

pub async fn run() -> anyhow::Result<()> {
    let _guard = init_logging("cleaning-crm.log");

    let config = Config::from_env().context("Failed to load configuration")?;
    let state = bootstrap_state(&config).await?;
    let state_arc = Arc::new(state);

    if config.embedded_worker {
        let worker_state = state_arc.clone();
        tokio::spawn(async move {
            start_background_worker(worker_state).await;
        });
    } else {
        info!("Embedded worker disabled; run the reminder_worker binary or call the cron endpoints");
    }

    tokio::spawn(start_limiter_pruning(state_arc.clone(), std::time::Duration::from_secs(60)));

    let app = create_router(state_arc);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .with_context(|| format!("Failed to bind port {}", config.port))?;

    info!("Server running on port {}", config.port);
    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
