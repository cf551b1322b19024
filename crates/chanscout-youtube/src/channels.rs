use crate::client::{YoutubeClient, MAX_PAGE_SIZE};
use crate::error::YoutubeError;
use crate::types::{Channel, ChannelListResponse};

impl YoutubeClient {
    /// Fetches snippet, statistics, and content details for up to 50 channels.
    ///
    /// Ids the platform does not know are silently absent from the result.
    /// An empty `ids` slice returns an empty list without a network call.
    ///
    /// # Errors
    ///
    /// Returns [`YoutubeError::Api`] if more than 50 ids are passed, otherwise
    /// the errors of any API call.
    pub async fn list_channels(&self, ids: &[String]) -> Result<Vec<Channel>, YoutubeError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        if ids.len() > MAX_PAGE_SIZE as usize {
            return Err(YoutubeError::Api {
                status: 400,
                reason: "tooManyIds".to_owned(),
                message: format!("{} ids exceeds the batch limit of {MAX_PAGE_SIZE}", ids.len()),
            });
        }
        let joined = ids.join(",");
        let response: ChannelListResponse = self
            .get_json(
                "channels",
                &[
                    ("part", "snippet,statistics,contentDetails"),
                    ("id", joined.as_str()),
                    ("maxResults", "50"),
                ],
            )
            .await?;
        Ok(response.items)
    }
}
