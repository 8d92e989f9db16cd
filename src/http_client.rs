use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::auth::{self, Credential, TokenError, TokenStore};

// Client identity expected by the DramaBox API
const CLIENT_USER_AGENT: &str = "okhttp/4.10.0";
const CLIENT_CONTENT_TYPE: &str = "application/json; charset=UTF-8";
const APP_VERSION_CODE: &str = "430";
const APP_VERSION_NAME: &str = "4.3.0";
const CHANNEL_ID: &str = "DRA1000042";
const PACKAGE_NAME: &str = "com.storymatrix.drama";
const APN: &str = "1";
const LANGUAGE: &str = "in";
const PLATFORM: &str = "43";
const TIME_ZONE: &str = "+0800";

/// Upstream call errors
#[derive(Error, Debug)]
pub enum UpstreamError {
    /// The upstream no longer accepts the credential
    #[error("DramaBox rejected the credential: {status} - {message}")]
    AuthorizationRejected { status: u16, message: String },

    /// Any other upstream failure; never retried
    #[error("DramaBox API error ({kind}): {message}")]
    UpstreamCallFailed {
        status: Option<u16>,
        kind: &'static str,
        message: String,
    },

    /// No credential could be obtained
    #[error(transparent)]
    Token(#[from] TokenError),
}

impl UpstreamError {
    /// Upstream HTTP status, when the call got that far
    pub fn status(&self) -> Option<u16> {
        match self {
            UpstreamError::AuthorizationRejected { status, .. } => Some(*status),
            UpstreamError::UpstreamCallFailed { status, .. } => *status,
            UpstreamError::Token(_) => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            UpstreamError::UpstreamCallFailed {
                kind: "timeout",
                ..
            }
        )
    }
}

/// Build the headers for one upstream call
pub fn build_headers(credential: &Credential) -> Result<HeaderMap, UpstreamError> {
    let invalid = |e: reqwest::header::InvalidHeaderValue| UpstreamError::UpstreamCallFailed {
        status: None,
        kind: "invalid_credential",
        message: format!("credential cannot be sent as a header: {}", e),
    };

    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(CLIENT_CONTENT_TYPE));
    headers.insert(
        HeaderName::from_static("tn"),
        HeaderValue::from_str(&format!("Bearer {}", credential.token)).map_err(invalid)?,
    );
    headers.insert(
        HeaderName::from_static("device-id"),
        HeaderValue::from_str(&credential.device_id).map_err(invalid)?,
    );

    let fixed = [
        ("version", APP_VERSION_CODE),
        ("vn", APP_VERSION_NAME),
        ("cid", CHANNEL_ID),
        ("package-name", PACKAGE_NAME),
        ("apn", APN),
        ("language", LANGUAGE),
        ("current-language", LANGUAGE),
        ("p", PLATFORM),
        ("time-zone", TIME_ZONE),
    ];
    for (name, value) in fixed {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }

    Ok(headers)
}

/// HTTP client for the DramaBox API
/// Attaches the cached credential to each call and recovers from credential
/// rejection by forcing a token refresh.
pub struct DramaBoxClient {
    /// Shared HTTP client with connection pooling
    client: Client,

    /// Credential provider
    token_store: Arc<TokenStore>,

    /// API base URL, endpoints are appended verbatim
    base_url: String,

    /// Default number of retries after a rejected credential
    max_retries: u32,
}

impl DramaBoxClient {
    /// Create a new HTTP client
    /// Accepts `gzip` and decodes compressed responses transparently.
    pub fn new(
        token_store: Arc<TokenStore>,
        base_url: impl Into<String>,
        connect_timeout: Duration,
        request_timeout: Duration,
        max_retries: u32,
    ) -> Result<Self> {
        let client = Client::builder()
            .gzip(true)
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            token_store,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            max_retries,
        })
    }

    /// Call an endpoint with the default retry budget
    pub async fn request<T: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        payload: &T,
    ) -> Result<Value, UpstreamError> {
        self.call(endpoint, payload, self.max_retries).await
    }

    /// Call an endpoint, retrying only after a rejected credential
    ///
    /// Makes at most `max_retries + 1` attempts. A 401 forces a token
    /// refresh before the next attempt; a failed refresh ends the call.
    /// Every other failure is returned as-is.
    pub async fn call<T: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        payload: &T,
        max_retries: u32,
    ) -> Result<Value, UpstreamError> {
        let url = format!("{}{}", self.base_url, endpoint);
        let mut attempt = 0;

        loop {
            let credential = self.token_store.get_credential().await?;
            let headers = build_headers(&credential)?;

            tracing::debug!(
                url = %url,
                attempt = attempt + 1,
                max_retries,
                "Sending DramaBox request"
            );

            match self.send(&url, headers, payload).await {
                Ok(body) => return Ok(body),
                Err(UpstreamError::AuthorizationRejected { status, message })
                    if attempt < max_retries =>
                {
                    tracing::warn!(
                        status,
                        attempt = attempt + 1,
                        "Token rejected ({}), refreshing and retrying...",
                        message
                    );
                    self.token_store.force_refresh().await?;
                    attempt += 1;
                }
                Err(e) => {
                    tracing::error!(
                        url = %url,
                        attempt = attempt + 1,
                        error = %e,
                        "DramaBox request failed"
                    );
                    return Err(e);
                }
            }
        }
    }

    /// Issue one POST and decode the JSON body
    async fn send<T: Serialize + ?Sized>(
        &self,
        url: &str,
        headers: HeaderMap,
        payload: &T,
    ) -> Result<Value, UpstreamError> {
        let response = self
            .client
            .post(url)
            .headers(headers)
            .json(payload)
            .send()
            .await
            .map_err(|e| UpstreamError::UpstreamCallFailed {
                status: None,
                kind: auth::error_kind(&e),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, url = %url, "Received error response");

            if status == StatusCode::UNAUTHORIZED {
                return Err(UpstreamError::AuthorizationRejected {
                    status: status.as_u16(),
                    message,
                });
            }

            return Err(UpstreamError::UpstreamCallFailed {
                status: Some(status.as_u16()),
                kind: "status",
                message,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| UpstreamError::UpstreamCallFailed {
                status: Some(status.as_u16()),
                kind: auth::error_kind(&e),
                message: e.to_string(),
            })?;

        serde_json::from_str(&body).map_err(|e| UpstreamError::UpstreamCallFailed {
            status: Some(status.as_u16()),
            kind: "malformed",
            message: format!("invalid JSON body: {}", e),
        })
    }
}
