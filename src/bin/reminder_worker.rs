use anyhow::Context;
use cleaning_crm::background::start_background_worker;
use cleaning_crm::config::Config;
use cleaning_crm::infra::factory::bootstrap_state;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _guard = cleaning_crm::init_logging("reminder-worker.log");

    let config = Config::from_env().context("Failed to load configuration")?;
    let state = bootstrap_state(&config).await?;

    info!(
        poll_secs = config.worker_poll_secs,
        batch_size = config.reminder_batch_size,
        "Reminder worker starting"
    );
    start_background_worker(Arc::new(state)).await;
    Ok(())
}
