// DramaBox catalog endpoints
// Thin request/response adapters on top of DramaBoxClient::request

use serde_json::Value;

use crate::converters::{extract_dramas, extract_streaming_links, extract_suggestions};
use crate::http_client::{DramaBoxClient, UpstreamError};
use crate::models::{ChapterBatchRequest, StreamingLink, SuggestRequest, TheaterRequest};

pub const THEATER_ENDPOINT: &str = "/he001/theater";
pub const SUGGEST_ENDPOINT: &str = "/search/suggest";
pub const CHAPTER_BATCH_ENDPOINT: &str = "/chapterv2/batch/load";

impl DramaBoxClient {
    /// Latest dramas for a channel page, flattened across theater columns
    pub async fn get_latest(
        &self,
        page_no: i64,
        channel_id: i64,
    ) -> Result<Vec<Value>, UpstreamError> {
        let request = TheaterRequest::new(page_no, channel_id);
        let response = self.request(THEATER_ENDPOINT, &request).await?;

        let dramas = extract_dramas(&response);
        tracing::info!(page_no, channel_id, count = dramas.len(), "Fetched latest dramas");
        Ok(dramas)
    }

    /// Search suggestions for a keyword
    pub async fn search(&self, keyword: &str) -> Result<Vec<Value>, UpstreamError> {
        let request = SuggestRequest {
            keyword: keyword.to_string(),
        };
        let response = self.request(SUGGEST_ENDPOINT, &request).await?;
        Ok(extract_suggestions(&response))
    }

    /// Streaming links for the chapter batch starting at `episode`
    pub async fn get_streaming_links(
        &self,
        book_id: &str,
        episode: i64,
    ) -> Result<Vec<StreamingLink>, UpstreamError> {
        let request = ChapterBatchRequest::new(book_id, episode);
        let response = self.request(CHAPTER_BATCH_ENDPOINT, &request).await?;
        Ok(extract_streaming_links(&response))
    }
}
