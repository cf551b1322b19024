use crate::client::{YoutubeClient, MAX_PAGE_SIZE};
use crate::error::YoutubeError;
use crate::types::SearchListResponse;

impl YoutubeClient {
    /// Searches for channels matching `query`, one page at a time.
    ///
    /// `order` is the API's ordering name (`relevance`, `date`, `viewCount`,
    /// ...). Pass the previous page's `next_page_token` to continue. Costs 100
    /// quota units per call regardless of how many results come back.
    ///
    /// # Errors
    ///
    /// Returns [`YoutubeError::QuotaExceeded`] when the daily quota is spent,
    /// or any other error of the underlying API call.
    pub async fn search_channels(
        &self,
        query: &str,
        order: &str,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<SearchListResponse, YoutubeError> {
        let max_results = page_size.clamp(1, MAX_PAGE_SIZE).to_string();
        let mut params = vec![
            ("part", "snippet"),
            ("type", "channel"),
            ("q", query),
            ("order", order),
            ("maxResults", max_results.as_str()),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token));
        }
        self.get_json("search", &params).await
    }
}
