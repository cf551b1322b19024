//! `YouTube` Data API v3 response types.
//!
//! Only the fields the discovery pipeline reads are modelled. Counts arrive as
//! JSON strings (`"subscriberCount": "1200"`); the accessor methods parse them.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Parses a string-encoded counter, treating absent or malformed values as `None`.
fn parse_count(raw: Option<&str>) -> Option<u64> {
    raw.and_then(|s| s.trim().parse::<u64>().ok())
}

// ---------------------------------------------------------------------------
// Error envelope
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: u16,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub errors: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
}

// ---------------------------------------------------------------------------
// search
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchListResponse {
    #[serde(default)]
    pub next_page_token: Option<String>,
    #[serde(default)]
    pub items: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
pub struct SearchResult {
    pub id: SearchResultId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultId {
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub channel_id: Option<String>,
}

impl SearchListResponse {
    /// Channel ids in the order the API ranked them.
    #[must_use]
    pub fn channel_ids(&self) -> Vec<String> {
        self.items
            .iter()
            .filter_map(|item| item.id.channel_id.clone())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// channels
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ChannelListResponse {
    /// Omitted by the API when no id matched.
    #[serde(default)]
    pub items: Vec<Channel>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    pub id: String,
    #[serde(default)]
    pub snippet: Option<ChannelSnippet>,
    #[serde(default)]
    pub statistics: Option<ChannelStatistics>,
    #[serde(default)]
    pub content_details: Option<ChannelContentDetails>,
}

impl Channel {
    /// Subscriber count; `None` when hidden or missing.
    #[must_use]
    pub fn subscriber_count(&self) -> Option<u64> {
        let stats = self.statistics.as_ref()?;
        if stats.hidden_subscriber_count {
            return None;
        }
        parse_count(stats.subscriber_count.as_deref())
    }

    /// Id of the channel's "uploads" playlist.
    #[must_use]
    pub fn uploads_playlist_id(&self) -> Option<&str> {
        self.content_details
            .as_ref()
            .and_then(|d| d.related_playlists.uploads.as_deref())
            .filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelSnippet {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub custom_url: Option<String>,
    #[serde(default)]
    pub thumbnails: Thumbnails,
}

#[derive(Debug, Default, Deserialize)]
pub struct Thumbnails {
    #[serde(default)]
    pub default: Option<Thumbnail>,
    #[serde(default)]
    pub medium: Option<Thumbnail>,
    #[serde(default)]
    pub high: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
pub struct Thumbnail {
    pub url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelStatistics {
    #[serde(default)]
    pub subscriber_count: Option<String>,
    #[serde(default)]
    pub hidden_subscriber_count: bool,
    #[serde(default)]
    pub video_count: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelContentDetails {
    #[serde(default)]
    pub related_playlists: RelatedPlaylists,
}

#[derive(Debug, Default, Deserialize)]
pub struct RelatedPlaylists {
    #[serde(default)]
    pub uploads: Option<String>,
}

// ---------------------------------------------------------------------------
// playlistItems
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemListResponse {
    #[serde(default)]
    pub next_page_token: Option<String>,
    #[serde(default)]
    pub items: Vec<PlaylistItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItem {
    pub content_details: PlaylistItemContentDetails,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemContentDetails {
    pub video_id: String,
    /// Absent for private or deleted videos still listed in the playlist.
    #[serde(default)]
    pub video_published_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// videos
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct VideoListResponse {
    #[serde(default)]
    pub items: Vec<Video>,
}

#[derive(Debug, Deserialize)]
pub struct Video {
    pub id: String,
    #[serde(default)]
    pub statistics: Option<VideoStatistics>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoStatistics {
    #[serde(default)]
    pub view_count: Option<String>,
    #[serde(default)]
    pub like_count: Option<String>,
    #[serde(default)]
    pub comment_count: Option<String>,
}

impl VideoStatistics {
    #[must_use]
    pub fn views(&self) -> u64 {
        parse_count(self.view_count.as_deref()).unwrap_or(0)
    }

    /// Likes; `0` when the uploader hides them.
    #[must_use]
    pub fn likes(&self) -> u64 {
        parse_count(self.like_count.as_deref()).unwrap_or(0)
    }

    /// Comments; `0` when comments are disabled.
    #[must_use]
    pub fn comments(&self) -> u64 {
        parse_count(self.comment_count.as_deref()).unwrap_or(0)
    }
}
