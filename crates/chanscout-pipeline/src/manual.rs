//! Adding a single channel by id, handle, or URL.
//!
//! Uses the same stage 1 and stage 2 code as a discovery run and appends at
//! most one record.

use std::sync::LazyLock;

use chanscout_core::{DiscoveryConfig, EnrichedRecord, SearchOrder};
use chrono::Utc;
use regex::Regex;
use thiserror::Error;

use crate::enrich::enrich_one;
use crate::error::{FetchError, StoreError};
use crate::filter::{EligibilityRules, Rejection};
use crate::platform::{ChannelPlatform, RecordStore};
use crate::quota::{CallCategory, QuotaLedger};

static CHANNEL_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^UC[A-Za-z0-9_-]{22}$").expect("valid channel id regex"));

static HANDLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._-]{3,30}$").expect("valid handle regex"));

/// A user-supplied channel reference, before resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelIdentifier {
    /// `UC` followed by 22 id characters.
    Id(String),
    /// Without the leading `@`.
    Handle(String),
    /// Legacy `/c/<name>` or `/user/<name>` URL path.
    LegacyName(String),
}

impl ChannelIdentifier {
    /// Parses a raw id, an `@handle`, or a channel URL.
    ///
    /// Scheme and a `www.` or `m.` host prefix are optional in URLs.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if CHANNEL_ID.is_match(input) {
            return Some(Self::Id(input.to_string()));
        }
        if let Some(handle) = input.strip_prefix('@') {
            return HANDLE
                .is_match(handle)
                .then(|| Self::Handle(handle.to_string()));
        }
        Self::parse_url(input)
    }

    fn parse_url(input: &str) -> Option<Self> {
        let rest = input
            .strip_prefix("https://")
            .or_else(|| input.strip_prefix("http://"))
            .unwrap_or(input);
        let rest = rest
            .strip_prefix("www.")
            .or_else(|| rest.strip_prefix("m."))
            .unwrap_or(rest);
        let path = rest.strip_prefix("youtube.com/")?;
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let mut segments = path.split('/').filter(|s| !s.is_empty());

        match (segments.next()?, segments.next()) {
            ("channel", Some(id)) if CHANNEL_ID.is_match(id) => Some(Self::Id(id.to_string())),
            ("c" | "user", Some(name)) => Some(Self::LegacyName(name.to_string())),
            (first, _) => first
                .strip_prefix('@')
                .filter(|h| HANDLE.is_match(h))
                .map(|h| Self::Handle(h.to_string())),
        }
    }
}

impl std::fmt::Display for ChannelIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => f.write_str(id),
            Self::Handle(h) => write!(f, "@{h}"),
            Self::LegacyName(name) => write!(f, "youtube.com/c/{name}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ManualOutcome {
    Added(Box<EnrichedRecord>),
    /// The channel is already in the store, possibly as an excluded row;
    /// nothing was written.
    AlreadyPresent(String),
    Rejected(Rejection),
    NotFound,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ManualReport {
    pub outcome: ManualOutcome,
    pub ledger: QuotaLedger,
}

#[derive(Debug, Error)]
pub enum AddError {
    #[error("unrecognised channel identifier: {0}")]
    InvalidIdentifier(String),

    #[error("platform call failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("record store failed: {0}")]
    Store(#[from] StoreError),
}

/// A failed add, with the calls issued before the failure.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct AddFailure {
    pub error: AddError,
    pub ledger: QuotaLedger,
}

/// Resolves `input` to a channel and adds it if it qualifies.
///
/// Handles and legacy names cost one search call to resolve.
///
/// # Errors
///
/// Returns an [`AddFailure`] carrying the ledger so far and one of:
/// - [`AddError::InvalidIdentifier`] when `input` is not a recognisable reference.
/// - [`AddError::Fetch`] when a platform call fails, including on quota.
/// - [`AddError::Store`] when reading the index or appending the record fails.
pub async fn add_channel(
    platform: &dyn ChannelPlatform,
    store: &dyn RecordStore,
    config: &DiscoveryConfig,
    input: &str,
) -> Result<ManualReport, AddFailure> {
    let mut ledger = QuotaLedger::new();
    match resolve_and_add(platform, store, config, input, &mut ledger).await {
        Ok(outcome) => Ok(ManualReport { outcome, ledger }),
        Err(error) => Err(AddFailure { error, ledger }),
    }
}

async fn resolve_and_add(
    platform: &dyn ChannelPlatform,
    store: &dyn RecordStore,
    config: &DiscoveryConfig,
    input: &str,
    ledger: &mut QuotaLedger,
) -> Result<ManualOutcome, AddError> {
    let identifier = ChannelIdentifier::parse(input)
        .ok_or_else(|| AddError::InvalidIdentifier(input.to_string()))?;

    let resolved = match &identifier {
        ChannelIdentifier::Id(id) => Some(id.clone()),
        ChannelIdentifier::Handle(handle) => {
            resolve_by_search(platform, &format!("@{handle}"), ledger).await?
        }
        ChannelIdentifier::LegacyName(name) => resolve_by_search(platform, name, ledger).await?,
    };
    let Some(channel_id) = resolved else {
        tracing::info!(%identifier, "no channel matched");
        return Ok(ManualOutcome::NotFound);
    };
    tracing::debug!(%identifier, %channel_id, "resolved channel identifier");

    let index = store.existing_index().await?;
    if index.contains_key(&channel_id) {
        return Ok(ManualOutcome::AlreadyPresent(channel_id));
    }

    let details = platform.details_by_id(std::slice::from_ref(&channel_id)).await;
    ledger.record(CallCategory::ChannelDetails);
    let Some(raw) = details?.into_iter().find(|c| c.id == channel_id) else {
        return Ok(ManualOutcome::NotFound);
    };

    let store_keywords = store.excluded_keywords().await?;
    let rules = EligibilityRules::new(config, &store_keywords);
    let candidate = match rules.evaluate(&raw) {
        Ok(candidate) => candidate,
        Err(rejection) => return Ok(ManualOutcome::Rejected(rejection)),
    };

    let record = match enrich_one(platform, candidate, config, Utc::now(), ledger).await? {
        Ok(record) => record,
        Err(rejection) => return Ok(ManualOutcome::Rejected(rejection)),
    };

    let inserted = store.append_new(std::slice::from_ref(&record)).await?;
    if inserted == 0 {
        // The index hides excluded rows; the insert still conflicts with them.
        tracing::info!(%channel_id, "channel already stored outside the index; nothing written");
        return Ok(ManualOutcome::AlreadyPresent(channel_id));
    }
    tracing::info!(%channel_id, name = %record.candidate.name, "channel added");
    Ok(ManualOutcome::Added(Box::new(record)))
}

/// One single-result channel search; the top hit is taken as the match.
async fn resolve_by_search(
    platform: &dyn ChannelPlatform,
    query: &str,
    ledger: &mut QuotaLedger,
) -> Result<Option<String>, FetchError> {
    let page = platform.search(query, SearchOrder::Relevance, 1, None).await;
    ledger.record(CallCategory::Search);
    Ok(page?.ids.into_iter().next())
}
