//! Capability traits the pipeline is driven through.
//!
//! Production wires [`ChannelPlatform`] to the `YouTube` client and
//! [`RecordStore`] to Postgres; tests substitute in-memory fakes.

use async_trait::async_trait;
use chanscout_core::{EnrichedRecord, ExistingIndex, RecordUpdate, SearchOrder};
use chrono::{DateTime, Utc};

use crate::error::{FetchError, StoreError};

/// One page of channel search results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPage {
    pub ids: Vec<String>,
    pub next_page_token: Option<String>,
}

/// Thumbnail URLs by resolution; any of them may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawThumbnails {
    pub default: Option<String>,
    pub medium: Option<String>,
    pub high: Option<String>,
}

/// Channel detail payload as the platform returns it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawChannel {
    pub id: String,
    pub title: String,
    pub description: String,
    /// `None` when the channel hides it.
    pub subscriber_count: Option<u64>,
    pub thumbnails: RawThumbnails,
    pub uploads_playlist_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentItem {
    pub item_id: String,
    pub published_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemStats {
    pub item_id: String,
    pub view_count: u64,
    pub like_count: u64,
    pub comment_count: u64,
}

/// The four platform calls the pipeline makes. Each one costs quota.
#[async_trait]
pub trait ChannelPlatform: Send + Sync {
    async fn search(
        &self,
        keyword: &str,
        order: SearchOrder,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<SearchPage, FetchError>;

    /// Details for at most 50 ids. Unknown ids are absent from the result.
    async fn details_by_id(&self, ids: &[String]) -> Result<Vec<RawChannel>, FetchError>;

    /// Newest `limit` items of an uploads playlist. A playlist that does not
    /// exist yields an empty list, not an error.
    async fn recent_items(
        &self,
        playlist_id: &str,
        limit: u32,
    ) -> Result<Vec<RecentItem>, FetchError>;

    async fn stats_by_id(&self, item_ids: &[String]) -> Result<Vec<ItemStats>, FetchError>;
}

/// Persisted record set the pipeline reconciles against.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Known channels, excluding rows the store flags as excluded.
    async fn existing_index(&self) -> Result<ExistingIndex, StoreError>;

    /// Exclusion keywords maintained in the store.
    async fn excluded_keywords(&self) -> Result<Vec<String>, StoreError>;

    /// Inserts records whose key is not stored yet; returns how many were written.
    async fn append_new(&self, records: &[EnrichedRecord]) -> Result<u64, StoreError>;

    async fn apply_updates(&self, updates: &[RecordUpdate]) -> Result<(), StoreError>;
}
