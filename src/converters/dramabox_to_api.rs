// DramaBox to API converter
//
// Missing or mistyped containers yield empty lists; the upstream omits them
// on empty pages.

use serde_json::Value;

use crate::models::StreamingLink;

/// Flatten `columnVoList[].bookList[]` from a theater response.
///
/// The column list normally sits at the top level; some responses wrap it
/// in `data`.
pub fn extract_dramas(response: &Value) -> Vec<Value> {
    let columns = response
        .get("columnVoList")
        .or_else(|| response.pointer("/data/columnVoList"))
        .and_then(Value::as_array);

    let Some(columns) = columns else {
        return Vec::new();
    };

    let dramas: Vec<Value> = columns
        .iter()
        .filter_map(|column| column.get("bookList").and_then(Value::as_array))
        .flatten()
        .cloned()
        .collect();

    tracing::debug!(
        "Found {} dramas from {} columns",
        dramas.len(),
        columns.len()
    );

    dramas
}

/// Suggestions from `data.suggestList`.
pub fn extract_suggestions(response: &Value) -> Vec<Value> {
    response
        .pointer("/data/suggestList")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

/// One link per `data.chapterList[]` entry, using the first CDN entry.
pub fn extract_streaming_links(response: &Value) -> Vec<StreamingLink> {
    let Some(chapters) = response
        .pointer("/data/chapterList")
        .and_then(Value::as_array)
    else {
        return Vec::new();
    };

    chapters
        .iter()
        .map(|chapter| StreamingLink {
            index: chapter.get("index").cloned().unwrap_or(Value::Null),
            title: chapter.get("title").cloned().unwrap_or(Value::Null),
            stream_url: chapter
                .get("cdnList")
                .and_then(Value::as_array)
                .and_then(|cdns| cdns.first())
                .cloned()
                .unwrap_or(Value::Null),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_dramas_flattens_columns() {
        let response = json!({
            "columnVoList": [
                {"title": "Hot", "bookList": [{"bookId": "1"}, {"bookId": "2"}]},
                {"title": "Banner"},
                {"title": "New", "bookList": [{"bookId": "3"}]}
            ]
        });

        let dramas = extract_dramas(&response);
        let ids: Vec<&str> = dramas
            .iter()
            .map(|d| d["bookId"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_extract_dramas_from_data_wrapper() {
        let response = json!({
            "data": {"columnVoList": [{"bookList": [{"bookId": "9"}]}]}
        });
        assert_eq!(extract_dramas(&response), vec![json!({"bookId": "9"})]);
    }

    #[test]
    fn test_extract_dramas_missing_list() {
        assert!(extract_dramas(&json!({"status": 0})).is_empty());
        assert!(extract_dramas(&json!({"columnVoList": "oops"})).is_empty());
    }

    #[test]
    fn test_extract_suggestions() {
        let response = json!({
            "data": {"suggestList": [{"bookName": "Pewaris"}, {"bookName": "Pewaris 2"}]}
        });
        assert_eq!(extract_suggestions(&response).len(), 2);
        assert!(extract_suggestions(&json!({"data": null})).is_empty());
    }

    #[test]
    fn test_extract_streaming_links() {
        let response = json!({
            "data": {
                "chapterList": [
                    {
                        "index": 1,
                        "title": "EP 1",
                        "cdnList": [{"cdnDomain": "a.example"}, {"cdnDomain": "b.example"}]
                    },
                    {"index": 2, "title": "EP 2", "cdnList": []},
                    {"index": 3, "title": "EP 3"}
                ]
            }
        });

        let links = extract_streaming_links(&response);
        assert_eq!(links.len(), 3);
        assert_eq!(links[0].index, json!(1));
        assert_eq!(links[0].stream_url, json!({"cdnDomain": "a.example"}));
        assert_eq!(links[1].stream_url, Value::Null);
        assert_eq!(links[2].title, json!("EP 3"));
        assert_eq!(links[2].stream_url, Value::Null);
    }

    #[test]
    fn test_extract_streaming_links_missing_data() {
        assert!(extract_streaming_links(&json!({})).is_empty());
    }
}
