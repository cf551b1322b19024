//! [`ChannelPlatform`] over the `YouTube` Data API client.

use async_trait::async_trait;
use chanscout_core::SearchOrder;
use chanscout_youtube::types::Channel;
use chanscout_youtube::YoutubeClient;

use crate::error::FetchError;
use crate::platform::{ChannelPlatform, ItemStats, RawChannel, RawThumbnails, RecentItem, SearchPage};

fn raw_channel(channel: Channel) -> RawChannel {
    let subscriber_count = channel.subscriber_count();
    let uploads_playlist_id = channel.uploads_playlist_id().map(str::to_string);
    let (title, description, thumbnails) = match channel.snippet {
        Some(snippet) => (
            snippet.title,
            snippet.description,
            RawThumbnails {
                default: snippet.thumbnails.default.map(|t| t.url),
                medium: snippet.thumbnails.medium.map(|t| t.url),
                high: snippet.thumbnails.high.map(|t| t.url),
            },
        ),
        None => (String::new(), String::new(), RawThumbnails::default()),
    };
    RawChannel {
        id: channel.id,
        title,
        description,
        subscriber_count,
        thumbnails,
        uploads_playlist_id,
    }
}

#[async_trait]
impl ChannelPlatform for YoutubeClient {
    async fn search(
        &self,
        keyword: &str,
        order: SearchOrder,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<SearchPage, FetchError> {
        let response = self
            .search_channels(keyword, order.as_str(), page_size, page_token)
            .await?;
        Ok(SearchPage {
            ids: response.channel_ids(),
            next_page_token: response.next_page_token,
        })
    }

    async fn details_by_id(&self, ids: &[String]) -> Result<Vec<RawChannel>, FetchError> {
        let channels = self.list_channels(ids).await?;
        Ok(channels.into_iter().map(raw_channel).collect())
    }

    async fn recent_items(
        &self,
        playlist_id: &str,
        limit: u32,
    ) -> Result<Vec<RecentItem>, FetchError> {
        let items = match self.list_playlist_items(playlist_id, limit).await {
            Ok(items) => items,
            Err(e) if e.is_not_found() => {
                tracing::debug!(playlist_id, "uploads playlist not found");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };
        // Private and deleted videos carry no publish time and are skipped.
        Ok(items
            .into_iter()
            .filter_map(|item| {
                let details = item.content_details;
                details.video_published_at.map(|published_at| RecentItem {
                    item_id: details.video_id,
                    published_at,
                })
            })
            .collect())
    }

    async fn stats_by_id(&self, item_ids: &[String]) -> Result<Vec<ItemStats>, FetchError> {
        let videos = self.list_video_statistics(item_ids).await?;
        Ok(videos
            .into_iter()
            .map(|video| {
                let stats = video.statistics.unwrap_or_default();
                ItemStats {
                    view_count: stats.views(),
                    like_count: stats.likes(),
                    comment_count: stats.comments(),
                    item_id: video.id,
                }
            })
            .collect())
    }
}
