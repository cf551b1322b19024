//! One full pipeline run: discover, reconcile, filter, enrich, deliver.

use std::collections::HashMap;

use chanscout_core::{DiscoveryConfig, EnrichedRecord, RecordUpdate, StoreLocation};
use chrono::Utc;

use crate::discover::discover_ids;
use crate::enrich::enrich_candidates;
use crate::filter::{filter_channels, EligibilityRules, FilterStats};
use crate::platform::{ChannelPlatform, RecordStore};
use crate::quota::QuotaLedger;
use crate::reconcile::partition;
use crate::window::ExecutionWindow;

/// Why a stage stopped before finishing its input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Halt {
    Deadline,
    /// The platform reported a spent quota; carries its message.
    Quota(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    Completed,
    /// The time budget ran out; partial output was still delivered.
    DeadlineReached,
    /// The platform quota ran out; partial output was still delivered.
    QuotaExhausted(String),
    Failed(String),
}

impl RunStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Completed => "completed",
            RunStatus::DeadlineReached => "deadline_reached",
            RunStatus::QuotaExhausted(_) => "quota_exhausted",
            RunStatus::Failed(_) => "failed",
        }
    }

    /// `true` unless the run hit the quota or failed outright.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, RunStatus::Completed | RunStatus::DeadlineReached)
    }

    /// Failure text for run bookkeeping; `None` on success.
    #[must_use]
    pub fn failure_message(&self) -> Option<String> {
        match self {
            RunStatus::Completed | RunStatus::DeadlineReached => None,
            RunStatus::QuotaExhausted(msg) => Some(format!("quota_exhausted: {msg}")),
            RunStatus::Failed(msg) => Some(msg.clone()),
        }
    }
}

impl From<Halt> for RunStatus {
    fn from(halt: Halt) -> Self {
        match halt {
            Halt::Deadline => RunStatus::DeadlineReached,
            Halt::Quota(msg) => RunStatus::QuotaExhausted(msg),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub new_records: Vec<EnrichedRecord>,
    pub update_records: Vec<RecordUpdate>,
    /// Known ids left alone because they were fetched recently.
    pub skipped_ids: Vec<String>,
    pub stats: FilterStats,
    pub ledger: QuotaLedger,
    /// Distinct ids the search matrix produced.
    pub discovered: usize,
    pub status: RunStatus,
}

impl RunReport {
    fn empty(status: RunStatus) -> Self {
        Self {
            new_records: Vec::new(),
            update_records: Vec::new(),
            skipped_ids: Vec::new(),
            stats: FilterStats::default(),
            ledger: QuotaLedger::new(),
            discovered: 0,
            status,
        }
    }

    /// Records written (or that would be written) by this run.
    #[must_use]
    pub fn records_processed(&self) -> usize {
        self.new_records.len() + self.update_records.len()
    }
}

/// Runs the whole pipeline once under `window`.
///
/// Never returns an error: every failure is folded into
/// [`RunReport::status`]. Output computed before a deadline or quota halt is
/// still handed to the store.
pub async fn run_discovery(
    platform: &dyn ChannelPlatform,
    store: &dyn RecordStore,
    config: &DiscoveryConfig,
    window: &ExecutionWindow,
) -> RunReport {
    let index = match store.existing_index().await {
        Ok(index) => index,
        Err(e) => {
            tracing::error!(error = %e, "failed to load existing index");
            return RunReport::empty(RunStatus::Failed(e.to_string()));
        }
    };
    let store_keywords = match store.excluded_keywords().await {
        Ok(keywords) => keywords,
        Err(e) => {
            tracing::error!(error = %e, "failed to load exclusion keywords");
            return RunReport::empty(RunStatus::Failed(e.to_string()));
        }
    };
    tracing::info!(
        existing = index.len(),
        store_keywords = store_keywords.len(),
        keywords = config.keywords.len(),
        orders = config.orders.len(),
        "starting discovery run"
    );

    let mut report = RunReport::empty(RunStatus::Completed);
    let now = Utc::now();

    let discovery = discover_ids(platform, config, window).await;
    report.ledger.merge(&discovery.ledger);
    report.discovered = discovery.ids.len();
    let mut halt = discovery.halt;

    let split = partition(&discovery.ids, &index, config.refresh_interval(), now);
    tracing::info!(
        new = split.new_ids.len(),
        update_due = split.update_due.len(),
        skipped = split.skipped.len(),
        "reconciled discovered ids"
    );
    report.skipped_ids.clone_from(&split.skipped);

    let mut enriched = Vec::new();
    if !matches!(halt, Some(Halt::Quota(_))) {
        let rules = EligibilityRules::new(config, &store_keywords);
        let filtered =
            filter_channels(platform, &split.ids_to_fetch(), &rules, config, window).await;
        report.ledger.merge(&filtered.ledger);
        report.stats.merge(&filtered.stats);
        halt = merge_halt(halt, filtered.halt);

        if !matches!(halt, Some(Halt::Quota(_))) {
            let outcome =
                enrich_candidates(platform, filtered.candidates, config, window, now).await;
            report.ledger.merge(&outcome.ledger);
            report.stats.merge(&outcome.stats);
            halt = merge_halt(halt, outcome.halt);
            enriched = outcome.records;
        }
    }

    let locations: HashMap<String, StoreLocation> = split.update_due.into_iter().collect();
    for record in enriched {
        match locations.get(record.channel_id()) {
            Some(location) => report.update_records.push(RecordUpdate {
                record,
                location: *location,
            }),
            None => report.new_records.push(record),
        }
    }

    report.status = halt.map_or(RunStatus::Completed, RunStatus::from);

    if let Err(message) = deliver(store, &report).await {
        report.status = RunStatus::Failed(message);
    }

    tracing::info!(
        status = report.status.as_str(),
        discovered = report.discovered,
        new = report.new_records.len(),
        updated = report.update_records.len(),
        skipped = report.skipped_ids.len(),
        rejected = report.stats.total(),
        quota_units = report.ledger.total_units(),
        elapsed_ms = u64::try_from(window.elapsed().as_millis()).unwrap_or(u64::MAX),
        "discovery run finished"
    );
    report
}

/// A quota halt outranks a deadline halt.
fn merge_halt(current: Option<Halt>, next: Option<Halt>) -> Option<Halt> {
    match (current, next) {
        (_, Some(quota @ Halt::Quota(_))) => Some(quota),
        (current, next) => current.or(next),
    }
}

async fn deliver(store: &dyn RecordStore, report: &RunReport) -> Result<(), String> {
    if !report.new_records.is_empty() {
        let inserted = store.append_new(&report.new_records).await.map_err(|e| {
            tracing::error!(error = %e, count = report.new_records.len(), "failed to append new records");
            e.to_string()
        })?;
        tracing::debug!(inserted, count = report.new_records.len(), "new records appended");
    }
    if !report.update_records.is_empty() {
        store.apply_updates(&report.update_records).await.map_err(|e| {
            tracing::error!(error = %e, count = report.update_records.len(), "failed to apply updates");
            e.to_string()
        })?;
    }
    Ok(())
}
