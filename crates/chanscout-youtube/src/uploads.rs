use crate::client::{YoutubeClient, MAX_PAGE_SIZE};
use crate::error::YoutubeError;
use crate::types::{PlaylistItem, PlaylistItemListResponse, Video, VideoListResponse};

impl YoutubeClient {
    /// Lists the newest `max_items` entries of a playlist (at most 50).
    ///
    /// Uploads playlists are ordered newest first, so this is the channel's
    /// most recent uploads.
    ///
    /// # Errors
    ///
    /// A missing playlist surfaces as [`YoutubeError::Api`] with status 404;
    /// callers decide whether that is fatal.
    pub async fn list_playlist_items(
        &self,
        playlist_id: &str,
        max_items: u32,
    ) -> Result<Vec<PlaylistItem>, YoutubeError> {
        let max_results = max_items.clamp(1, MAX_PAGE_SIZE).to_string();
        let response: PlaylistItemListResponse = self
            .get_json(
                "playlistItems",
                &[
                    ("part", "contentDetails"),
                    ("playlistId", playlist_id),
                    ("maxResults", max_results.as_str()),
                ],
            )
            .await?;
        Ok(response.items)
    }

    /// Fetches view, like, and comment counters for up to 50 videos.
    ///
    /// # Errors
    ///
    /// Returns the errors of the underlying API call.
    pub async fn list_video_statistics(&self, ids: &[String]) -> Result<Vec<Video>, YoutubeError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let joined = ids
            .iter()
            .take(MAX_PAGE_SIZE as usize)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(",");
        let response: VideoListResponse = self
            .get_json("videos", &[("part", "statistics"), ("id", joined.as_str())])
            .await?;
        Ok(response.items)
    }
}
