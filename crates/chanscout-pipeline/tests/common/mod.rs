//! In-memory fakes of the platform and the record store.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chanscout_core::{
    DiscoveryConfig, EnrichedRecord, ExistingEntry, ExistingIndex, RecordUpdate, SearchOrder,
    StoreLocation,
};
use chanscout_pipeline::{
    ChannelPlatform, FetchError, ItemStats, RawChannel, RawThumbnails, RecentItem, RecordStore,
    SearchPage, StoreError,
};
use chrono::{DateTime, Duration, Utc};

pub const QUOTA_MESSAGE: &str = "quotaExceeded: The request cannot be completed because you have exceeded your quota.";

/// 24-char uploads id derived from a short channel id.
pub fn uploads_for(channel_id: &str) -> String {
    let body: String = channel_id
        .chars()
        .chain(std::iter::repeat('x'))
        .take(22)
        .collect();
    format!("UU{body}")
}

pub fn test_config(keywords: &[&str]) -> DiscoveryConfig {
    let mut config =
        DiscoveryConfig::with_keywords(keywords.iter().map(|k| (*k).to_string()).collect());
    config.orders = vec![SearchOrder::Relevance];
    config.inter_call_delay_ms = 0;
    config
}

pub fn days_ago(days: i64) -> DateTime<Utc> {
    Utc::now() - Duration::days(days)
}

#[derive(Default)]
pub struct FakePlatform {
    pages: HashMap<(String, Option<String>), SearchPage>,
    channels: HashMap<String, RawChannel>,
    items: HashMap<String, Vec<RecentItem>>,
    stats: HashMap<String, ItemStats>,
    quota_keywords: HashSet<String>,
    failing_keywords: HashSet<String>,
    quota_playlists: HashSet<String>,
    quota_on_details: bool,
    calls: Mutex<Vec<String>>,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Search results for `keyword` at `token`, pointing at `next`.
    pub fn with_page(
        mut self,
        keyword: &str,
        token: Option<&str>,
        ids: &[&str],
        next: Option<&str>,
    ) -> Self {
        self.pages.insert(
            (keyword.to_string(), token.map(str::to_string)),
            SearchPage {
                ids: ids.iter().map(|s| (*s).to_string()).collect(),
                next_page_token: next.map(str::to_string),
            },
        );
        self
    }

    /// An eligible channel whose uploads were published `days_ago` days back.
    pub fn with_active_channel(self, id: &str, description: &str, upload_days_ago: &[i64]) -> Self {
        let raw = RawChannel {
            id: id.to_string(),
            title: format!("{id} channel"),
            description: description.to_string(),
            subscriber_count: Some(5_000),
            thumbnails: RawThumbnails {
                default: Some(format!("https://yt3.example/{id}/default.jpg")),
                medium: None,
                high: Some(format!("https://yt3.example/{id}/high.jpg")),
            },
            uploads_playlist_id: Some(uploads_for(id)),
        };
        self.with_channel(raw, upload_days_ago)
    }

    pub fn with_channel(mut self, raw: RawChannel, upload_days_ago: &[i64]) -> Self {
        let playlist = raw.uploads_playlist_id.clone().unwrap_or_default();
        let items: Vec<RecentItem> = upload_days_ago
            .iter()
            .enumerate()
            .map(|(n, days)| RecentItem {
                item_id: format!("{}-v{n}", raw.id),
                published_at: days_ago(*days),
            })
            .collect();
        for (n, item) in items.iter().enumerate() {
            let n = u64::try_from(n).unwrap();
            self.stats.insert(
                item.item_id.clone(),
                ItemStats {
                    item_id: item.item_id.clone(),
                    view_count: 100 * (n + 1),
                    like_count: 10,
                    comment_count: 1,
                },
            );
        }
        self.items.insert(playlist, items);
        self.channels.insert(raw.id.clone(), raw);
        self
    }

    pub fn with_quota_on_search(mut self, keyword: &str) -> Self {
        self.quota_keywords.insert(keyword.to_string());
        self
    }

    pub fn with_failing_search(mut self, keyword: &str) -> Self {
        self.failing_keywords.insert(keyword.to_string());
        self
    }

    pub fn with_quota_on_playlist(mut self, channel_id: &str) -> Self {
        self.quota_playlists.insert(uploads_for(channel_id));
        self
    }

    pub fn with_quota_on_details(mut self) -> Self {
        self.quota_on_details = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_starting_with(&self, prefix: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    fn log(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ChannelPlatform for FakePlatform {
    async fn search(
        &self,
        keyword: &str,
        order: SearchOrder,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<SearchPage, FetchError> {
        self.log(format!("search:{keyword}:{order}:{page_size}:{page_token:?}"));
        if self.quota_keywords.contains(keyword) {
            return Err(FetchError::Message(QUOTA_MESSAGE.to_string()));
        }
        if self.failing_keywords.contains(keyword) {
            return Err(FetchError::Message("connection reset by peer".to_string()));
        }
        Ok(self
            .pages
            .get(&(keyword.to_string(), page_token.map(str::to_string)))
            .cloned()
            .unwrap_or_default())
    }

    async fn details_by_id(&self, ids: &[String]) -> Result<Vec<RawChannel>, FetchError> {
        self.log(format!("details:{}", ids.join(",")));
        if self.quota_on_details {
            return Err(FetchError::Message(QUOTA_MESSAGE.to_string()));
        }
        Ok(ids
            .iter()
            .filter_map(|id| self.channels.get(id).cloned())
            .collect())
    }

    async fn recent_items(
        &self,
        playlist_id: &str,
        limit: u32,
    ) -> Result<Vec<RecentItem>, FetchError> {
        self.log(format!("items:{playlist_id}"));
        if self.quota_playlists.contains(playlist_id) {
            return Err(FetchError::Message(QUOTA_MESSAGE.to_string()));
        }
        let limit = usize::try_from(limit).unwrap();
        Ok(self
            .items
            .get(playlist_id)
            .map(|items| items.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    async fn stats_by_id(&self, item_ids: &[String]) -> Result<Vec<ItemStats>, FetchError> {
        self.log(format!("stats:{}", item_ids.join(",")));
        Ok(item_ids
            .iter()
            .filter_map(|id| self.stats.get(id).cloned())
            .collect())
    }
}

#[derive(Default)]
pub struct MemoryStore {
    index: ExistingIndex,
    /// Stored ids left out of the index, like rows flagged as excluded.
    excluded_rows: HashSet<String>,
    keywords: Vec<String>,
    fail_index: bool,
    fail_writes: bool,
    appended: Mutex<Vec<EnrichedRecord>>,
    updated: Mutex<Vec<RecordUpdate>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, id: &str, location: i64, last_fetched_at: DateTime<Utc>) -> Self {
        self.index.insert(
            id.to_string(),
            ExistingEntry {
                location: StoreLocation(location),
                last_fetched_at,
            },
        );
        self
    }

    pub fn with_excluded_row(mut self, id: &str) -> Self {
        self.excluded_rows.insert(id.to_string());
        self
    }

    pub fn with_keyword(mut self, keyword: &str) -> Self {
        self.keywords.push(keyword.to_string());
        self
    }

    pub fn failing_index(mut self) -> Self {
        self.fail_index = true;
        self
    }

    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    pub fn appended(&self) -> Vec<EnrichedRecord> {
        self.appended.lock().unwrap().clone()
    }

    pub fn updated(&self) -> Vec<RecordUpdate> {
        self.updated.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn existing_index(&self) -> Result<ExistingIndex, StoreError> {
        if self.fail_index {
            return Err(StoreError::new("loading existing index", "connection refused"));
        }
        Ok(self.index.clone())
    }

    async fn excluded_keywords(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.keywords.clone())
    }

    async fn append_new(&self, records: &[EnrichedRecord]) -> Result<u64, StoreError> {
        if self.fail_writes {
            return Err(StoreError::new("appending records", "disk full"));
        }
        let mut appended = self.appended.lock().unwrap();
        let before = appended.len();
        appended.extend(
            records
                .iter()
                .filter(|r| !self.excluded_rows.contains(r.channel_id()))
                .cloned(),
        );
        Ok((appended.len() - before) as u64)
    }

    async fn apply_updates(&self, updates: &[RecordUpdate]) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::new("applying updates", "disk full"));
        }
        self.updated.lock().unwrap().extend_from_slice(updates);
        Ok(())
    }
}
