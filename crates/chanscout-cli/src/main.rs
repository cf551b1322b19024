mod add;
mod discover;
mod history;
mod schedule;
mod store;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "chanscout")]
#[command(about = "Discover, filter, and track YouTube channels")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the discovery pipeline once
    Discover {
        /// Run the full pipeline but write nothing to the database
        #[arg(long)]
        dry_run: bool,
    },
    /// Add a single channel by id, @handle, or URL
    Add {
        /// Channel id (UC...), @handle, or youtube.com URL
        identifier: String,
    },
    /// Run discovery on the CHANSCOUT_SCHEDULE cron until Ctrl-C
    Schedule,
    /// Show recent runs
    Runs {
        /// Maximum number of runs to show
        #[arg(long, default_value = "20")]
        limit: i64,
    },
    /// Show recent API cost and today's total
    Quota {
        /// Maximum number of log rows to show
        #[arg(long, default_value = "20")]
        limit: i64,
    },
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check database connectivity
    Ping,
    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = chanscout_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let Some(command) = cli.command else {
        println!("chanscout: no command given; see `chanscout --help`");
        return Ok(());
    };

    let pool = chanscout_db::connect_pool_from_config(&config).await?;

    match command {
        Commands::Discover { dry_run } => {
            discover::run_discover(&pool, &config, "cli", dry_run).await?;
        }
        Commands::Add { identifier } => add::run_add(&pool, &config, &identifier).await?,
        Commands::Schedule => schedule::run_schedule(pool, config).await?,
        Commands::Runs { limit } => history::run_runs(&pool, limit).await?,
        Commands::Quota { limit } => history::run_quota(&pool, &config, limit).await?,
        Commands::Db { command } => match command {
            DbCommands::Ping => {
                chanscout_db::health_check(&pool).await?;
                println!("database ok");
            }
            DbCommands::Migrate => {
                let applied = chanscout_db::run_migrations(&pool).await?;
                println!("applied {applied} migration(s)");
            }
        },
    }

    Ok(())
}

/// Builds the `YouTube` client from process config.
///
/// # Errors
///
/// Returns an error if `YOUTUBE_API_KEY` is unset or the client cannot be built.
pub(crate) fn build_youtube_client(
    config: &chanscout_core::AppConfig,
    command: &str,
) -> anyhow::Result<chanscout_youtube::YoutubeClient> {
    let api_key = config
        .youtube_api_key
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("YOUTUBE_API_KEY is not set; cannot run {command}"))?;

    chanscout_youtube::YoutubeClient::new(
        api_key,
        config.http_timeout_secs,
        config.http_max_retries,
        config.http_backoff_base_ms,
    )
    .map_err(|e| anyhow::anyhow!("failed to build YouTube client: {e}"))
}

/// Marks a run failed without masking the error that caused it.
pub(crate) async fn fail_run_best_effort(
    pool: &sqlx::PgPool,
    run_id: i64,
    context: &'static str,
    records_processed: i32,
    message: String,
) {
    if let Err(mark_err) =
        chanscout_db::fail_collection_run(pool, run_id, records_processed, &message).await
    {
        tracing::error!(
            run_id,
            error = %mark_err,
            "failed to mark {context} run as failed"
        );
    }
}

/// Appends the run's API cost to the quota log; a write failure is only logged.
pub(crate) async fn log_quota_best_effort(
    pool: &sqlx::PgPool,
    run_id: i64,
    ledger: &chanscout_pipeline::QuotaLedger,
) {
    let entries = quota_entries(ledger);
    if let Err(err) = chanscout_db::insert_quota_usage(pool, Some(run_id), &entries).await {
        tracing::warn!(run_id, error = %err, "failed to write quota usage");
    }
}

pub(crate) fn quota_entries(
    ledger: &chanscout_pipeline::QuotaLedger,
) -> Vec<chanscout_db::QuotaUsageEntry> {
    ledger
        .entries()
        .map(|(category, usage)| chanscout_db::QuotaUsageEntry {
            category: category.as_str().to_string(),
            calls: i32::try_from(usage.calls).unwrap_or(i32::MAX),
            units: i32::try_from(usage.units).unwrap_or(i32::MAX),
        })
        .collect()
}

#[cfg(test)]
mod tests;
