//! Stage 2: activity metrics from a channel's most recent uploads.

use chanscout_core::{CandidateRecord, DiscoveryConfig, EnrichedRecord};
use chrono::{DateTime, Utc};

use crate::error::{is_quota_error, FetchError};
use crate::filter::{FilterStats, Rejection};
use crate::platform::{ChannelPlatform, ItemStats, RecentItem};
use crate::quota::{CallCategory, QuotaLedger};
use crate::run::Halt;
use crate::window::ExecutionWindow;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Rounds to one decimal place.
#[must_use]
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Uploads per 30 days, extrapolated from the span of the sample.
///
/// Zero for fewer than two items, and zero when every item shares one
/// timestamp (the span is empty, so there is no rate to extrapolate).
#[must_use]
pub fn upload_frequency(items: &[RecentItem]) -> f64 {
    if items.len() < 2 {
        return 0.0;
    }
    let newest = items.iter().map(|i| i.published_at).max();
    let oldest = items.iter().map(|i| i.published_at).min();
    let (Some(newest), Some(oldest)) = (newest, oldest) else {
        return 0.0;
    };

    #[allow(clippy::cast_precision_loss)]
    let span_days = (newest - oldest).num_milliseconds() as f64 / MILLIS_PER_DAY;
    if span_days <= 0.0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let count = items.len() as f64;
    round1(count / span_days * 30.0)
}

/// Arithmetic mean rounded to the nearest integer (halves round up); 0 for no values.
#[must_use]
pub fn rounded_mean(values: impl IntoIterator<Item = u64>) -> u64 {
    let (sum, n) = values
        .into_iter()
        .fold((0u128, 0u128), |(sum, n), v| (sum + u128::from(v), n + 1));
    if n == 0 {
        return 0;
    }
    u64::try_from((sum * 2 + n) / (2 * n)).unwrap_or(u64::MAX)
}

/// Builds the enriched record from a candidate, its recent items, and their stats.
///
/// `items` must be non-empty.
#[must_use]
pub fn build_record(
    candidate: CandidateRecord,
    items: &[RecentItem],
    stats: &[ItemStats],
    now: DateTime<Utc>,
) -> Option<EnrichedRecord> {
    let last_published_at = items.iter().map(|i| i.published_at).max()?;
    Some(EnrichedRecord {
        candidate,
        upload_frequency: upload_frequency(items),
        avg_views: rounded_mean(stats.iter().map(|s| s.view_count)),
        avg_likes: rounded_mean(stats.iter().map(|s| s.like_count)),
        avg_comments: rounded_mean(stats.iter().map(|s| s.comment_count)),
        last_published_at,
        fetched_at: now,
    })
}

/// Enriches one candidate, recording every issued call on `ledger`.
///
/// The outer `Result` is for I/O failures; the inner one is the verdict.
///
/// # Errors
///
/// Returns the [`FetchError`] of whichever platform call failed.
pub async fn enrich_one(
    platform: &dyn ChannelPlatform,
    candidate: CandidateRecord,
    config: &DiscoveryConfig,
    now: DateTime<Utc>,
    ledger: &mut QuotaLedger,
) -> Result<Result<EnrichedRecord, Rejection>, FetchError> {
    let items = platform
        .recent_items(&candidate.uploads_playlist_id, config.recent_items_limit)
        .await;
    ledger.record(CallCategory::PlaylistItems);
    let items = items?;

    let Some(newest) = items.iter().map(|i| i.published_at).max() else {
        return Ok(Err(Rejection::NoContent));
    };
    if now - newest > config.activity_threshold() {
        return Ok(Err(Rejection::Inactive));
    }

    let item_ids: Vec<String> = items.iter().map(|i| i.item_id.clone()).collect();
    let stats = platform.stats_by_id(&item_ids).await;
    ledger.record(CallCategory::VideoStats);
    let stats = stats?;

    Ok(build_record(candidate, &items, &stats, now).ok_or(Rejection::NoContent))
}

/// Result of running stage 2 over the stage 1 survivors.
#[derive(Debug, Default)]
pub struct EnrichOutcome {
    pub records: Vec<EnrichedRecord>,
    pub stats: FilterStats,
    pub ledger: QuotaLedger,
    /// Candidates abandoned after a non-quota failure.
    pub failed: u32,
    pub halt: Option<Halt>,
}

/// Enriches candidates one at a time, in order.
///
/// A failure abandons only that candidate unless it is a quota failure, which
/// stops the stage. The window is checked before every candidate.
pub async fn enrich_candidates(
    platform: &dyn ChannelPlatform,
    candidates: Vec<CandidateRecord>,
    config: &DiscoveryConfig,
    window: &ExecutionWindow,
    now: DateTime<Utc>,
) -> EnrichOutcome {
    let mut outcome = EnrichOutcome::default();
    let total = candidates.len();

    for (idx, candidate) in candidates.into_iter().enumerate() {
        if window.is_expired() {
            tracing::warn!(
                unprocessed = total - idx,
                "time budget exhausted during enrichment"
            );
            outcome.halt = Some(Halt::Deadline);
            break;
        }

        let channel_id = candidate.channel_id.clone();
        match enrich_one(platform, candidate, config, now, &mut outcome.ledger).await {
            Ok(Ok(record)) => outcome.records.push(record),
            Ok(Err(rejection)) => {
                tracing::debug!(%channel_id, %rejection, "candidate rejected");
                outcome.stats.record(rejection);
            }
            Err(e) if is_quota_error(&e) => {
                tracing::error!(%channel_id, error = %e, "quota exhausted during enrichment, stopping stage");
                outcome.halt = Some(Halt::Quota(e.to_string()));
                break;
            }
            Err(e) => {
                tracing::warn!(%channel_id, error = %e, "enrichment failed, skipping channel");
                outcome.failed += 1;
            }
        }
    }

    tracing::info!(
        candidates = total,
        enriched = outcome.records.len(),
        rejected = outcome.stats.total(),
        failed = outcome.failed,
        "enrichment complete"
    );
    outcome
}
