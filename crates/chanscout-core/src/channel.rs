//! Channel records exchanged between the pipeline and the record store.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Rendered in place of a social link when none could be extracted.
pub const SOCIAL_LINK_UNAVAILABLE: &str = "N/A";

/// A channel that passed the eligibility rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub channel_id: String,
    pub name: String,
    pub url: String,
    pub subscriber_count: u64,
    /// Truncated to the configured character limit.
    pub description: String,
    pub thumbnail_url: Option<String>,
    pub social_link: Option<String>,
    pub uploads_playlist_id: String,
}

impl CandidateRecord {
    /// Social link for display, falling back to [`SOCIAL_LINK_UNAVAILABLE`].
    #[must_use]
    pub fn social_link_or_sentinel(&self) -> &str {
        self.social_link.as_deref().unwrap_or(SOCIAL_LINK_UNAVAILABLE)
    }
}

/// A candidate plus the activity metrics computed from its recent uploads.
///
/// This is the persisted row shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    #[serde(flatten)]
    pub candidate: CandidateRecord,
    /// Uploads per month, rounded to one decimal.
    pub upload_frequency: f64,
    pub avg_views: u64,
    pub avg_likes: u64,
    pub avg_comments: u64,
    pub last_published_at: DateTime<Utc>,
    pub fetched_at: DateTime<Utc>,
}

impl EnrichedRecord {
    #[must_use]
    pub fn channel_id(&self) -> &str {
        &self.candidate.channel_id
    }
}

/// Opaque position of a record inside the store (its row id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StoreLocation(pub i64);

impl std::fmt::Display for StoreLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExistingEntry {
    pub location: StoreLocation,
    pub last_fetched_at: DateTime<Utc>,
}

/// Channel id → existing entry. Rows the store flags as excluded are never present.
pub type ExistingIndex = HashMap<String, ExistingEntry>;

/// A refreshed record and the store row it replaces.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordUpdate {
    pub record: EnrichedRecord,
    pub location: StoreLocation,
}
