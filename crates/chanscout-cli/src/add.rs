//! `add` command: resolve and add one channel.

use anyhow::Context;
use chanscout_core::{load_discovery_config, AppConfig};
use chanscout_pipeline::{
    add_channel, is_quota_error, AddError, ChannelIdentifier, ManualOutcome,
};

use crate::store::PgStore;
use crate::{build_youtube_client, fail_run_best_effort, log_quota_best_effort};

/// Adds the channel named by `identifier` if it qualifies.
///
/// Tracked as an `add` run. Rejections and unknown channels complete the run
/// with zero records.
///
/// # Errors
///
/// Returns an error if the identifier is unrecognised, config or the client
/// cannot be loaded, or a platform or store call fails.
pub(crate) async fn run_add(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    identifier: &str,
) -> anyhow::Result<()> {
    if ChannelIdentifier::parse(identifier).is_none() {
        anyhow::bail!("unrecognised channel identifier: {identifier}");
    }
    let discovery = load_discovery_config(&config.discovery_path).with_context(|| {
        format!(
            "loading discovery config from {}",
            config.discovery_path.display()
        )
    })?;
    let client = build_youtube_client(config, "add")?;
    let store = PgStore::new(pool.clone());

    let run = chanscout_db::create_collection_run(pool, "add", "cli").await?;
    if let Err(e) = chanscout_db::start_collection_run(pool, run.id).await {
        fail_run_best_effort(pool, run.id, "add", 0, format!("{e:#}")).await;
        return Err(e.into());
    }

    let report = match add_channel(&client, &store, &discovery, identifier).await {
        Ok(report) => report,
        Err(failure) => {
            log_quota_best_effort(pool, run.id, &failure.ledger).await;
            fail_run_best_effort(pool, run.id, "add", 0, failure_message(&failure.error)).await;
            return Err(failure.error.into());
        }
    };
    log_quota_best_effort(pool, run.id, &report.ledger).await;

    let processed = i32::from(matches!(report.outcome, ManualOutcome::Added(_)));
    if let Err(err) = chanscout_db::complete_collection_run(pool, run.id, processed).await {
        fail_run_best_effort(pool, run.id, "add", processed, format!("{err:#}")).await;
        return Err(err.into());
    }

    println!("{}", outcome_line(&report.outcome));
    Ok(())
}

fn failure_message(err: &AddError) -> String {
    match err {
        AddError::Fetch(e) if is_quota_error(e) => format!("quota_exhausted: {e}"),
        other => format!("{other:#}"),
    }
}

pub(crate) fn outcome_line(outcome: &ManualOutcome) -> String {
    match outcome {
        ManualOutcome::Added(record) => format!(
            "added {} ({}): {} subscribers, {:.1} uploads/month, social {}",
            record.candidate.name,
            record.channel_id(),
            record.candidate.subscriber_count,
            record.upload_frequency,
            record.candidate.social_link_or_sentinel()
        ),
        ManualOutcome::AlreadyPresent(id) => format!("{id} is already tracked; nothing to do"),
        ManualOutcome::Rejected(reason) => format!("channel not added: {reason}"),
        ManualOutcome::NotFound => "no matching channel found".to_string(),
    }
}
