use serde::{Deserialize, Serialize};
use serde_json::Value;

// ==================================================================================================
// Request Models
// ==================================================================================================

/// Theater listing request (`/he001/theater`)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TheaterRequest {
    pub new_channel_style: u8,
    pub is_need_rank: u8,
    pub page_no: i64,
    pub index: u8,
    pub channel_id: i64,
}

impl TheaterRequest {
    pub fn new(page_no: i64, channel_id: i64) -> Self {
        Self {
            new_channel_style: 1,
            is_need_rank: 1,
            page_no,
            index: 1,
            channel_id,
        }
    }
}

/// Search suggestion request (`/search/suggest`)
#[derive(Debug, Clone, Serialize)]
pub struct SuggestRequest {
    pub keyword: String,
}

/// Chapter batch load request (`/chapterv2/batch/load`)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterBatchRequest {
    pub boundary_index: i64,
    pub coming_play_section_id: i64,
    pub index: i64,
    pub currency_play_source: String,
    pub need_end_recommend: u8,
    pub currency_play_source_name: String,
    pub pre_load: bool,
    pub rid: String,
    pub pull_cid: String,
    pub load_direction: u8,
    pub start_up_key: String,
    pub book_id: String,
}

impl ChapterBatchRequest {
    pub fn new(book_id: impl Into<String>, index: i64) -> Self {
        Self {
            boundary_index: 0,
            coming_play_section_id: -1,
            index,
            currency_play_source: "discover_new_rec_new".to_string(),
            need_end_recommend: 0,
            currency_play_source_name: String::new(),
            pre_load: false,
            rid: String::new(),
            pull_cid: String::new(),
            load_direction: 0,
            start_up_key: String::new(),
            book_id: book_id.into(),
        }
    }
}

// ==================================================================================================
// Response Models
// ==================================================================================================

/// Playable episode extracted from a chapter batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamingLink {
    pub index: Value,
    pub title: Value,
    pub stream_url: Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_theater_request_shape() {
        let value = serde_json::to_value(TheaterRequest::new(2, 43)).unwrap();
        assert_eq!(
            value,
            json!({
                "newChannelStyle": 1,
                "isNeedRank": 1,
                "pageNo": 2,
                "index": 1,
                "channelId": 43
            })
        );
    }

    #[test]
    fn test_chapter_batch_request_shape() {
        let value = serde_json::to_value(ChapterBatchRequest::new("41000102902", 3)).unwrap();
        assert_eq!(
            value,
            json!({
                "boundaryIndex": 0,
                "comingPlaySectionId": -1,
                "index": 3,
                "currencyPlaySource": "discover_new_rec_new",
                "needEndRecommend": 0,
                "currencyPlaySourceName": "",
                "preLoad": false,
                "rid": "",
                "pullCid": "",
                "loadDirection": 0,
                "startUpKey": "",
                "bookId": "41000102902"
            })
        );
    }

    #[test]
    fn test_streaming_link_serializes_camel_case() {
        let link = StreamingLink {
            index: json!(1),
            title: json!("Episode 1"),
            stream_url: Value::Null,
        };
        assert_eq!(
            serde_json::to_value(link).unwrap(),
            json!({"index": 1, "title": "Episode 1", "streamUrl": null})
        );
    }
}
