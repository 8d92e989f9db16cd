use axum::{
    extract::{Path, Query, State},
    http::Uri,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::auth::TokenStore;
use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::http_client::DramaBoxClient;

/// Application version from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub token_store: Arc<TokenStore>,
    pub client: Arc<DramaBoxClient>,
    pub config: Arc<Config>,
}

#[derive(Debug, Deserialize)]
pub struct LatestQuery {
    page: Option<String>,
    #[serde(rename = "channelId")]
    channel_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StreamQuery {
    episode: Option<String>,
}

/// Read the leading decimal integer of a query value (`"2abc"` is 2,
/// `"1.9"` is 1). Leading whitespace and one sign are allowed.
fn leading_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let value = digits[..end].parse::<i64>().ok()?;
    Some(if negative { -value } else { value })
}

/// Integer query value, using `default` when the value is missing, has no
/// leading integer, or is zero.
fn int_or_default(raw: Option<&str>, default: i64) -> i64 {
    match raw.and_then(leading_int) {
        Some(0) | None => default,
        Some(value) => value,
    }
}

/// Service info routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root_handler))
        .route("/api/docs", get(docs_handler))
        .route("/api/health", get(health_handler))
}

/// DramaBox API routes
pub fn drama_routes() -> Router<AppState> {
    Router::new()
        .route("/api/latest", get(latest_handler))
        .route("/api/search", get(search_handler))
        .route("/api/stream/:book_id", get(stream_handler))
}

/// Full router with the 404 fallback
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(drama_routes())
        .fallback(not_found_handler)
        .with_state(state)
}

/// GET / - Service banner and endpoint map
async fn root_handler() -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "DramaBox API - Self-Hosted Version",
        "version": VERSION,
        "endpoints": {
            "latest": "/api/latest?page=1&channelId=43",
            "search": "/api/search?q=keyword",
            "stream": "/api/stream/:bookId?episode=1",
            "health": "/api/health"
        },
        "documentation": "/api/docs"
    }))
}

/// GET /api/docs - Endpoint documentation
async fn docs_handler() -> Json<Value> {
    Json(json!({
        "success": true,
        "documentation": {
            "latest": {
                "endpoint": "GET /api/latest",
                "description": "Get latest dramas",
                "parameters": {
                    "page": "Page number (default: 1)",
                    "channelId": "Channel ID (default: 43)"
                },
                "example": "/api/latest?page=1"
            },
            "search": {
                "endpoint": "GET /api/search",
                "description": "Search dramas by keyword",
                "parameters": {
                    "q": "Search keyword (required)"
                },
                "example": "/api/search?q=pewaris"
            },
            "stream": {
                "endpoint": "GET /api/stream/:bookId",
                "description": "Get streaming links for a drama",
                "parameters": {
                    "bookId": "Drama book ID (required, in path)",
                    "episode": "Episode number (default: 1)"
                },
                "example": "/api/stream/41000102902?episode=1"
            }
        }
    }))
}

/// GET /api/health - Health check with token cache summary
///
/// Never touches the token sources; reports the cache as it is.
async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let token = state.token_store.status().await;

    Json(json!({
        "success": true,
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "version": VERSION,
        "token": token
    }))
}

/// GET /api/latest - Latest dramas for a channel page
async fn latest_handler(
    State(state): State<AppState>,
    Query(query): Query<LatestQuery>,
) -> Result<Json<Value>> {
    let page = int_or_default(query.page.as_deref(), 1);
    let channel_id = int_or_default(
        query.channel_id.as_deref(),
        state.config.default_channel_id,
    );

    if page < 1 {
        return Err(ApiError::ValidationError(
            "Page number must be >= 1".to_string(),
        ));
    }

    let dramas = state
        .client
        .get_latest(page, channel_id)
        .await
        .map_err(|e| ApiError::upstream("Failed to fetch latest dramas", e))?;

    Ok(Json(json!({
        "success": true,
        "data": {
            "page": page,
            "channelId": channel_id,
            "dramas": dramas
        }
    })))
}

/// GET /api/search - Search suggestions
async fn search_handler(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Value>> {
    let keyword = match query.q {
        Some(q) if !q.trim().is_empty() => q,
        _ => {
            return Err(ApiError::ValidationError(
                "Search keyword (q) is required".to_string(),
            ))
        }
    };

    let results = state
        .client
        .search(&keyword)
        .await
        .map_err(|e| ApiError::upstream("Failed to search dramas", e))?;

    Ok(Json(json!({
        "success": true,
        "data": {
            "keyword": keyword,
            "results": results
        }
    })))
}

/// GET /api/stream/:book_id - Streaming links for a drama
async fn stream_handler(
    State(state): State<AppState>,
    Path(book_id): Path<String>,
    Query(query): Query<StreamQuery>,
) -> Result<Json<Value>> {
    let episode = int_or_default(query.episode.as_deref(), 1);

    if book_id.trim().is_empty() {
        return Err(ApiError::ValidationError("Book ID is required".to_string()));
    }

    if episode < 1 {
        return Err(ApiError::ValidationError(
            "Episode number must be >= 1".to_string(),
        ));
    }

    let links = state
        .client
        .get_streaming_links(&book_id, episode)
        .await
        .map_err(|e| ApiError::upstream("Failed to fetch streaming links", e))?;

    Ok(Json(json!({
        "success": true,
        "data": {
            "bookId": book_id,
            "episode": episode,
            "streamingLinks": links
        }
    })))
}

async fn not_found_handler(uri: Uri) -> ApiError {
    ApiError::NotFound(uri.path().to_string())
}
