//! Stage 1: eligibility rules decidable from a single channel detail record.

use chanscout_core::{CandidateRecord, DiscoveryConfig};

use crate::error::is_quota_error;
use crate::platform::{ChannelPlatform, RawChannel, RawThumbnails};
use crate::quota::{CallCategory, QuotaLedger};
use crate::run::Halt;
use crate::social::extract_social_link;
use crate::window::ExecutionWindow;

const UPLOADS_PREFIX: &str = "UU";
const UPLOADS_ID_LEN: usize = 24;

/// Why a channel was dropped. Stage 1 produces the first four, stage 2 the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rejection {
    BelowSubscribers,
    ExcludedKeyword,
    MissingUploads,
    InvalidUploads,
    NoContent,
    Inactive,
}

impl Rejection {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Rejection::BelowSubscribers => "below_subscribers",
            Rejection::ExcludedKeyword => "excluded_keyword",
            Rejection::MissingUploads => "missing_uploads",
            Rejection::InvalidUploads => "invalid_uploads",
            Rejection::NoContent => "no_content",
            Rejection::Inactive => "inactive",
        }
    }
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejection counters for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterStats {
    pub below_subscribers: u64,
    pub excluded_keyword: u64,
    pub missing_uploads: u64,
    pub invalid_uploads: u64,
    pub no_content: u64,
    pub inactive: u64,
}

impl FilterStats {
    pub fn record(&mut self, rejection: Rejection) {
        let counter = match rejection {
            Rejection::BelowSubscribers => &mut self.below_subscribers,
            Rejection::ExcludedKeyword => &mut self.excluded_keyword,
            Rejection::MissingUploads => &mut self.missing_uploads,
            Rejection::InvalidUploads => &mut self.invalid_uploads,
            Rejection::NoContent => &mut self.no_content,
            Rejection::Inactive => &mut self.inactive,
        };
        *counter += 1;
    }

    pub fn merge(&mut self, other: &FilterStats) {
        self.below_subscribers += other.below_subscribers;
        self.excluded_keyword += other.excluded_keyword;
        self.missing_uploads += other.missing_uploads;
        self.invalid_uploads += other.invalid_uploads;
        self.no_content += other.no_content;
        self.inactive += other.inactive;
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.below_subscribers
            + self.excluded_keyword
            + self.missing_uploads
            + self.invalid_uploads
            + self.no_content
            + self.inactive
    }
}

/// Structural check on an uploads playlist id: `UU` prefix, exactly 24 chars.
#[must_use]
pub fn is_valid_uploads_id(id: &str) -> bool {
    id.starts_with(UPLOADS_PREFIX) && id.chars().count() == UPLOADS_ID_LEN
}

/// Highest resolution available: high, then medium, then default.
#[must_use]
pub fn select_thumbnail(thumbnails: &RawThumbnails) -> Option<String> {
    thumbnails
        .high
        .as_ref()
        .or(thumbnails.medium.as_ref())
        .or(thumbnails.default.as_ref())
        .cloned()
}

/// Keeps at most `max_chars` characters (not bytes).
#[must_use]
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

#[must_use]
pub fn channel_url(channel_id: &str) -> String {
    format!("https://www.youtube.com/channel/{channel_id}")
}

/// The stage 1 rule set, built once per run.
#[derive(Debug, Clone)]
pub struct EligibilityRules {
    min_subscribers: u64,
    /// Lowercased, non-blank, deduplicated.
    exclusion_keywords: Vec<String>,
    description_max_chars: usize,
}

impl EligibilityRules {
    /// Combines the configured exclusion keywords with the store's.
    #[must_use]
    pub fn new(config: &DiscoveryConfig, store_keywords: &[String]) -> Self {
        let mut exclusion_keywords: Vec<String> = Vec::new();
        for keyword in config.exclusion_keywords.iter().chain(store_keywords) {
            let normalized = keyword.trim().to_lowercase();
            if !normalized.is_empty() && !exclusion_keywords.contains(&normalized) {
                exclusion_keywords.push(normalized);
            }
        }
        Self {
            min_subscribers: config.min_subscribers,
            exclusion_keywords,
            description_max_chars: config.description_max_chars,
        }
    }

    #[must_use]
    pub fn exclusion_keywords(&self) -> &[String] {
        &self.exclusion_keywords
    }

    /// Applies the rules in order; the first failure decides the rejection.
    ///
    /// # Errors
    ///
    /// Returns the [`Rejection`] of the first rule the channel fails.
    pub fn evaluate(&self, raw: &RawChannel) -> Result<CandidateRecord, Rejection> {
        let subscriber_count = raw.subscriber_count.unwrap_or(0);
        if subscriber_count < self.min_subscribers {
            return Err(Rejection::BelowSubscribers);
        }

        let haystack = format!("{} {}", raw.title, raw.description).to_lowercase();
        if self
            .exclusion_keywords
            .iter()
            .any(|keyword| haystack.contains(keyword.as_str()))
        {
            return Err(Rejection::ExcludedKeyword);
        }

        let uploads = raw
            .uploads_playlist_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or(Rejection::MissingUploads)?;
        if !is_valid_uploads_id(uploads) {
            return Err(Rejection::InvalidUploads);
        }

        Ok(CandidateRecord {
            channel_id: raw.id.clone(),
            name: raw.title.clone(),
            url: channel_url(&raw.id),
            subscriber_count,
            description: truncate_chars(&raw.description, self.description_max_chars),
            thumbnail_url: select_thumbnail(&raw.thumbnails),
            social_link: extract_social_link(&raw.description),
            uploads_playlist_id: uploads.to_string(),
        })
    }
}

/// Result of running stage 1 over a list of ids.
#[derive(Debug, Default)]
pub struct FilterOutcome {
    pub candidates: Vec<CandidateRecord>,
    pub stats: FilterStats,
    pub ledger: QuotaLedger,
    /// Detail batches abandoned after a non-quota failure.
    pub failed_batches: u32,
    pub halt: Option<Halt>,
}

/// Fetches details in batches and applies [`EligibilityRules`] to each channel.
///
/// A failed batch is logged and skipped; a quota failure or an expired window
/// stops the stage with whatever candidates were already produced.
pub async fn filter_channels(
    platform: &dyn ChannelPlatform,
    ids: &[String],
    rules: &EligibilityRules,
    config: &DiscoveryConfig,
    window: &ExecutionWindow,
) -> FilterOutcome {
    let mut outcome = FilterOutcome::default();
    let batch_size = config.detail_batch_size.max(1);

    for (batch_idx, batch) in ids.chunks(batch_size).enumerate() {
        if window.is_expired() {
            tracing::warn!(
                unprocessed_ids = ids.len() - batch_idx * batch_size,
                "time budget exhausted during eligibility filtering"
            );
            outcome.halt = Some(Halt::Deadline);
            break;
        }

        let result = platform.details_by_id(batch).await;
        outcome.ledger.record(CallCategory::ChannelDetails);

        let channels = match result {
            Ok(channels) => channels,
            Err(e) if is_quota_error(&e) => {
                tracing::error!(error = %e, "quota exhausted during detail lookup, stopping stage");
                outcome.halt = Some(Halt::Quota(e.to_string()));
                break;
            }
            Err(e) => {
                tracing::warn!(batch_len = batch.len(), error = %e, "detail batch failed, skipping");
                outcome.failed_batches += 1;
                continue;
            }
        };

        for raw in &channels {
            match rules.evaluate(raw) {
                Ok(candidate) => outcome.candidates.push(candidate),
                Err(rejection) => {
                    tracing::debug!(channel_id = %raw.id, %rejection, "channel rejected");
                    outcome.stats.record(rejection);
                }
            }
        }
    }

    tracing::info!(
        requested = ids.len(),
        candidates = outcome.candidates.len(),
        rejected = outcome.stats.total(),
        failed_batches = outcome.failed_batches,
        "eligibility filtering complete"
    );
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(subscribers: Option<u64>, description: &str, uploads: Option<&str>) -> RawChannel {
        RawChannel {
            id: "UCabcdefghijklmnopqrstuv".to_string(),
            title: "Maker Channel".to_string(),
            description: description.to_string(),
            subscriber_count: subscribers,
            thumbnails: RawThumbnails::default(),
            uploads_playlist_id: uploads.map(str::to_string),
        }
    }

    const VALID_UPLOADS: &str = "UUabcdefghijklmnopqrstuv";

    fn rules(exclusions: &[&str]) -> EligibilityRules {
        let mut config = DiscoveryConfig::with_keywords(vec!["maker".to_string()]);
        config.exclusion_keywords = exclusions.iter().map(|s| (*s).to_string()).collect();
        EligibilityRules::new(&config, &[])
    }

    #[test]
    fn below_minimum_subscribers_is_rejected() {
        for subs in [Some(0), Some(999), None] {
            assert_eq!(
                rules(&[]).evaluate(&raw(subs, "", Some(VALID_UPLOADS))),
                Err(Rejection::BelowSubscribers)
            );
        }
    }

    #[test]
    fn subscriber_check_runs_before_keyword_check() {
        assert_eq!(
            rules(&["maker"]).evaluate(&raw(Some(10), "", Some(VALID_UPLOADS))),
            Err(Rejection::BelowSubscribers)
        );
    }

    #[test]
    fn exclusion_keyword_matches_case_insensitive_substring() {
        let r = rules(&["Crypto Signals"]);
        let channel = raw(
            Some(5_000_000),
            "Daily CRYPTO SIGNALS and more",
            Some(VALID_UPLOADS),
        );
        assert_eq!(r.evaluate(&channel), Err(Rejection::ExcludedKeyword));
    }

    #[test]
    fn exclusion_keyword_matches_across_name_and_description() {
        let r = rules(&["channel weekly"]);
        let channel = raw(Some(5_000), "Weekly builds", Some(VALID_UPLOADS));
        assert_eq!(r.evaluate(&channel), Err(Rejection::ExcludedKeyword));
    }

    #[test]
    fn store_keywords_are_merged_and_blank_ones_ignored() {
        let config = DiscoveryConfig::with_keywords(vec!["maker".to_string()]);
        let r = EligibilityRules::new(&config, &["  ".to_string(), "Gambling".to_string()]);
        assert_eq!(r.exclusion_keywords(), &["gambling".to_string()]);
        assert_eq!(
            r.evaluate(&raw(Some(5_000), "gambling tips", Some(VALID_UPLOADS))),
            Err(Rejection::ExcludedKeyword)
        );
        assert!(r
            .evaluate(&raw(Some(5_000), "woodworking", Some(VALID_UPLOADS)))
            .is_ok());
    }

    #[test]
    fn missing_uploads_is_rejected() {
        assert_eq!(
            rules(&[]).evaluate(&raw(Some(5_000), "", None)),
            Err(Rejection::MissingUploads)
        );
        assert_eq!(
            rules(&[]).evaluate(&raw(Some(5_000), "", Some(""))),
            Err(Rejection::MissingUploads)
        );
    }

    #[test]
    fn uploads_id_needs_prefix_and_exact_length() {
        assert!(is_valid_uploads_id(VALID_UPLOADS));
        assert!(!is_valid_uploads_id("UUabcdefghijklmnopqrstu"), "23 chars");
        assert!(!is_valid_uploads_id("UUabcdefghijklmnopqrstuvw"), "25 chars");
        assert!(!is_valid_uploads_id("PLabcdefghijklmnopqrstuv"), "wrong prefix");
        assert_eq!(
            rules(&[]).evaluate(&raw(Some(5_000), "", Some("UUshort"))),
            Err(Rejection::InvalidUploads)
        );
    }

    #[test]
    fn passing_channel_becomes_candidate() {
        let mut channel = raw(
            Some(12_000),
            "Builds every week. https://twitter.com/maker",
            Some(VALID_UPLOADS),
        );
        channel.thumbnails = RawThumbnails {
            default: Some("d.jpg".to_string()),
            medium: Some("m.jpg".to_string()),
            high: None,
        };
        let candidate = rules(&[]).evaluate(&channel).unwrap();
        assert_eq!(candidate.subscriber_count, 12_000);
        assert_eq!(
            candidate.url,
            "https://www.youtube.com/channel/UCabcdefghijklmnopqrstuv"
        );
        assert_eq!(candidate.thumbnail_url.as_deref(), Some("m.jpg"));
        assert_eq!(
            candidate.social_link.as_deref(),
            Some("https://x.com/maker")
        );
        assert_eq!(candidate.uploads_playlist_id, VALID_UPLOADS);
    }

    #[test]
    fn description_is_truncated_by_characters() {
        let long = "é".repeat(600);
        let candidate = rules(&[])
            .evaluate(&raw(Some(5_000), &long, Some(VALID_UPLOADS)))
            .unwrap();
        assert_eq!(candidate.description.chars().count(), 500);
        assert_eq!(truncate_chars("short", 500), "short");
    }

    #[test]
    fn thumbnail_prefers_highest_resolution() {
        let all = RawThumbnails {
            default: Some("d".to_string()),
            medium: Some("m".to_string()),
            high: Some("h".to_string()),
        };
        assert_eq!(select_thumbnail(&all).as_deref(), Some("h"));
        assert_eq!(select_thumbnail(&RawThumbnails::default()), None);
    }

    #[test]
    fn stats_record_and_merge() {
        let mut a = FilterStats::default();
        a.record(Rejection::Inactive);
        a.record(Rejection::BelowSubscribers);
        let mut b = FilterStats::default();
        b.record(Rejection::Inactive);
        a.merge(&b);
        assert_eq!(a.inactive, 2);
        assert_eq!(a.below_subscribers, 1);
        assert_eq!(a.total(), 3);
    }
}
