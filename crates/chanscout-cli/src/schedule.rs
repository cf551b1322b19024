//! `schedule` command: periodic discovery on a cron expression.

use std::sync::Arc;

use chanscout_core::AppConfig;
use sqlx::PgPool;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

/// Runs `discover` on every tick of `config.schedule` until Ctrl-C.
///
/// A tick that fires while the previous run is still going is skipped.
///
/// # Errors
///
/// Returns an error if the cron expression is invalid or the scheduler
/// cannot be started or stopped.
pub(crate) async fn run_schedule(pool: PgPool, config: AppConfig) -> anyhow::Result<()> {
    let cron = config.schedule.clone();
    let mut scheduler = JobScheduler::new().await?;
    register_discover_job(&scheduler, pool, Arc::new(config)).await?;
    scheduler.start().await?;
    tracing::info!(cron = %cron, "scheduler running; press Ctrl-C to stop");

    tokio::signal::ctrl_c().await?;
    tracing::info!("scheduler: shutting down");
    scheduler.shutdown().await?;
    Ok(())
}

async fn register_discover_job(
    scheduler: &JobScheduler,
    pool: PgPool,
    config: Arc<AppConfig>,
) -> Result<(), JobSchedulerError> {
    let cron = config.schedule.clone();
    let pool = Arc::new(pool);
    let in_flight = Arc::new(Mutex::new(()));

    let job = Job::new_async(cron.as_str(), move |_uuid, _lock| {
        let pool = Arc::clone(&pool);
        let config = Arc::clone(&config);
        let in_flight = Arc::clone(&in_flight);

        Box::pin(async move {
            let Ok(_guard) = in_flight.try_lock() else {
                tracing::warn!("scheduler: previous discover run still in progress; skipping tick");
                return;
            };
            tracing::info!("scheduler: starting discover run");
            match crate::discover::run_discover(&pool, &config, "schedule", false).await {
                Ok(()) => tracing::info!("scheduler: discover run complete"),
                Err(e) => tracing::error!(error = %format!("{e:#}"), "scheduler: discover run failed"),
            }
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(cron = %cron, "scheduler: registered discover job");
    Ok(())
}
