//! Read-only `runs` and `quota` listings.

use chanscout_core::{load_discovery_config, AppConfig};
use chrono::{DateTime, Utc};

fn fmt_time(ts: Option<DateTime<Utc>>) -> String {
    ts.map_or_else(
        || "\u{2014}".to_string(),
        |t| t.format("%Y-%m-%d %H:%M").to_string(),
    )
}

/// Prints the most recent `limit` runs.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub(crate) async fn run_runs(pool: &sqlx::PgPool, limit: i64) -> anyhow::Result<()> {
    let runs = chanscout_db::list_collection_runs(pool, limit).await?;

    if runs.is_empty() {
        println!("no runs found; run `discover` first");
        return Ok(());
    }

    println!(
        "{:<8}{:<10}{:<10}{:<11}{:<18}{:<18}{:<8}ERROR",
        "ID", "TYPE", "TRIGGER", "STATUS", "STARTED", "COMPLETED", "RECORDS"
    );
    for run in &runs {
        let error = run
            .error_message
            .as_deref()
            .map(|e| truncate_display(e, 60))
            .unwrap_or_default();
        println!(
            "{:<8}{:<10}{:<10}{:<11}{:<18}{:<18}{:<8}{}",
            run.id,
            run.run_type,
            run.trigger_source,
            run.status,
            fmt_time(run.started_at),
            fmt_time(run.completed_at),
            run.records_processed,
            error
        );
    }
    Ok(())
}

/// Prints recent quota log rows and today's total against the daily limit.
///
/// The daily limit comes from the discovery config; when that file cannot be
/// read only the total is shown.
///
/// # Errors
///
/// Returns an error if a database query fails.
pub(crate) async fn run_quota(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    limit: i64,
) -> anyhow::Result<()> {
    let rows = chanscout_db::list_quota_usage(pool, limit).await?;
    let since = start_of_utc_day(Utc::now());
    let used_today = chanscout_db::sum_units_since(pool, since).await?;

    if rows.is_empty() {
        println!("no quota usage recorded yet");
    } else {
        println!(
            "{:<18}{:<8}{:<17}{:>7}{:>8}",
            "RECORDED", "RUN", "CATEGORY", "CALLS", "UNITS"
        );
        for row in &rows {
            let run = row
                .collection_run_id
                .map_or_else(|| "\u{2014}".to_string(), |id| id.to_string());
            println!(
                "{:<18}{:<8}{:<17}{:>7}{:>8}",
                fmt_time(Some(row.recorded_at)),
                run,
                row.category,
                row.calls,
                row.units
            );
        }
    }

    match load_discovery_config(&config.discovery_path) {
        Ok(discovery) => {
            let used = u64::try_from(used_today).unwrap_or(0);
            println!(
                "today (UTC): {used} of {} unit(s) used, {} left",
                discovery.daily_quota_limit,
                discovery.daily_quota_limit.saturating_sub(used)
            );
        }
        Err(e) => {
            tracing::warn!(error = %e, "could not load discovery config for the daily limit");
            println!("today (UTC): {used_today} unit(s) used");
        }
    }
    Ok(())
}

fn start_of_utc_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive()
        .and_hms_opt(0, 0, 0)
        .map_or(now, |midnight| midnight.and_utc())
}

fn truncate_display(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        format!("{}...", text.chars().take(max_chars).collect::<String>())
    } else {
        text.to_string()
    }
}
