//! `discover` command: one pipeline run with run bookkeeping.

use anyhow::Context;
use chanscout_core::{load_discovery_config, AppConfig};
use chanscout_pipeline::{run_discovery, ExecutionWindow, RunReport};

use crate::store::{DryRunStore, PgStore};
use crate::{build_youtube_client, fail_run_best_effort, log_quota_best_effort};

/// Runs discovery once.
///
/// Outside dry-run mode a `collection_runs` row tracks the run and its API
/// cost is appended to the quota log whatever the outcome. A run that hit the
/// quota delivers its partial output but is still marked failed.
///
/// # Errors
///
/// Returns an error if config or the client cannot be loaded, the run row
/// cannot be created, or the run ends failed or quota-exhausted.
pub(crate) async fn run_discover(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    trigger_source: &'static str,
    dry_run: bool,
) -> anyhow::Result<()> {
    let discovery = load_discovery_config(&config.discovery_path).with_context(|| {
        format!(
            "loading discovery config from {}",
            config.discovery_path.display()
        )
    })?;
    let client = build_youtube_client(config, "discover")?;
    let store = PgStore::new(pool.clone());
    let window = ExecutionWindow::new(discovery.time_budget());

    if dry_run {
        let dry = DryRunStore::new(&store);
        let report = run_discovery(&client, &dry, &discovery, &window).await;
        print_summary(&report, discovery.daily_quota_limit, true);
        return match report.status.failure_message() {
            Some(message) => Err(anyhow::anyhow!("dry-run discover failed: {message}")),
            None => Ok(()),
        };
    }

    let run = chanscout_db::create_collection_run(pool, "discover", trigger_source).await?;
    if let Err(e) = chanscout_db::start_collection_run(pool, run.id).await {
        fail_run_best_effort(pool, run.id, "discover", 0, format!("{e:#}")).await;
        return Err(e.into());
    }
    tracing::info!(
        run_id = run.id,
        trigger_source,
        budget_secs = discovery.time_budget_secs,
        "discover run started"
    );

    let report = run_discovery(&client, &store, &discovery, &window).await;
    log_quota_best_effort(pool, run.id, &report.ledger).await;

    let processed = i32::try_from(report.records_processed()).unwrap_or(i32::MAX);
    print_summary(&report, discovery.daily_quota_limit, false);

    if let Some(message) = report.status.failure_message() {
        tracing::error!(run_id = run.id, error = %message, "discover run failed");
        fail_run_best_effort(pool, run.id, "discover", processed, message.clone()).await;
        anyhow::bail!("discover run {} failed: {message}", run.id);
    }

    if let Err(err) = chanscout_db::complete_collection_run(pool, run.id, processed).await {
        fail_run_best_effort(pool, run.id, "discover", processed, format!("{err:#}")).await;
        return Err(err.into());
    }
    tracing::info!(
        run_id = run.id,
        status = report.status.as_str(),
        processed,
        units = report.ledger.total_units(),
        elapsed_ms = u64::try_from(window.elapsed().as_millis()).unwrap_or(u64::MAX),
        "discover run complete"
    );
    Ok(())
}

fn print_summary(report: &RunReport, daily_quota_limit: u64, dry_run: bool) {
    for line in summary_lines(report, daily_quota_limit, dry_run) {
        println!("{line}");
    }
}

pub(crate) fn summary_lines(report: &RunReport, daily_quota_limit: u64, dry_run: bool) -> Vec<String> {
    let prefix = if dry_run { "dry-run: " } else { "" };
    let stats = &report.stats;
    let mut lines = vec![
        format!("{prefix}status: {}", report.status.as_str()),
        format!(
            "{prefix}discovered {} channel(s): {} new, {} updated, {} skipped as fresh",
            report.discovered,
            report.new_records.len(),
            report.update_records.len(),
            report.skipped_ids.len()
        ),
        format!(
            "{prefix}rejected: {} below subscribers, {} excluded keyword, {} missing uploads, \
             {} invalid uploads, {} no content, {} inactive",
            stats.below_subscribers,
            stats.excluded_keyword,
            stats.missing_uploads,
            stats.invalid_uploads,
            stats.no_content,
            stats.inactive
        ),
    ];
    for (category, usage) in report.ledger.entries() {
        lines.push(format!(
            "{prefix}quota {category}: {} call(s), {} unit(s)",
            usage.calls, usage.units
        ));
    }
    lines.push(format!(
        "{prefix}quota total: {} unit(s), {} left of {daily_quota_limit} after this run",
        report.ledger.total_units(),
        report.ledger.remaining(daily_quota_limit)
    ));
    if let Some(message) = report.status.failure_message() {
        lines.push(format!("{prefix}error: {message}"));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use chanscout_pipeline::{CallCategory, FilterStats, QuotaLedger, Rejection, RunStatus};

    fn report(status: RunStatus) -> RunReport {
        let mut ledger = QuotaLedger::new();
        ledger.record(CallCategory::Search);
        ledger.record(CallCategory::ChannelDetails);
        let mut stats = FilterStats::default();
        stats.record(Rejection::Inactive);
        RunReport {
            new_records: Vec::new(),
            update_records: Vec::new(),
            skipped_ids: vec!["UC1".to_string()],
            stats,
            ledger,
            discovered: 4,
            status,
        }
    }

    #[test]
    fn summary_reports_counts_and_quota() {
        let lines = summary_lines(&report(RunStatus::Completed), 10_000, false);
        assert_eq!(lines[0], "status: completed");
        assert!(lines[1].contains("discovered 4 channel(s)"));
        assert!(lines[1].contains("1 skipped"));
        assert!(lines[2].contains("1 inactive"));
        assert!(lines.contains(&"quota search: 1 call(s), 100 unit(s)".to_string()));
        assert!(lines
            .last()
            .unwrap()
            .contains("101 unit(s), 9899 left of 10000"));
    }

    #[test]
    fn summary_carries_quota_failure_marker() {
        let lines = summary_lines(
            &report(RunStatus::QuotaExhausted("quotaExceeded".to_string())),
            10_000,
            true,
        );
        assert_eq!(lines[0], "dry-run: status: quota_exhausted");
        assert_eq!(
            lines.last().unwrap(),
            "dry-run: error: quota_exhausted: quotaExceeded"
        );
    }
}
