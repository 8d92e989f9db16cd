// Authentication types

use reqwest::header::HeaderValue;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Complete credential bundle issued by a token source
///
/// Every field is required; a bundle missing any of them is never constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub token: String,
    pub device_id: String,
    pub android_id: String,
}

/// Raw token source response
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub token: Option<String>,
    pub deviceid: Option<String>,
    pub androidid: Option<String>,
}

impl TokenResponse {
    /// Convert into a credential, rejecting partial bundles
    pub fn into_credential(self) -> Result<Credential, SourceFailure> {
        fn required(value: Option<String>, field: &str) -> Result<String, SourceFailure> {
            match value {
                Some(v) if !v.trim().is_empty() => Ok(v),
                _ => Err(SourceFailure::Malformed(format!(
                    "response does not contain {}",
                    field
                ))),
            }
        }

        let credential = Credential {
            token: required(self.token, "token")?,
            device_id: required(self.deviceid, "deviceid")?,
            android_id: required(self.androidid, "androidid")?,
        };

        // Both values travel as request headers on every upstream call
        HeaderValue::from_str(&format!("Bearer {}", credential.token)).map_err(|_| {
            SourceFailure::Malformed("token is not a valid header value".to_string())
        })?;
        HeaderValue::from_str(&credential.device_id).map_err(|_| {
            SourceFailure::Malformed("deviceid is not a valid header value".to_string())
        })?;

        Ok(credential)
    }
}

/// Cached credential with its expiry instant
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub credential: Credential,
    pub expires_at: Instant,
}

impl CacheEntry {
    pub fn new(credential: Credential, ttl: Duration) -> Self {
        Self {
            credential,
            expires_at: Instant::now() + ttl,
        }
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    /// Remaining lifetime, zero once expired
    pub fn remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }
}

/// Why a single token source attempt failed
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SourceFailure {
    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Token acquisition errors
#[derive(Error, Debug)]
pub enum TokenError {
    /// One source failed; triggers rotation to the next source
    #[error("token source {url} failed: {kind}")]
    SourceFetchFailed { url: String, kind: SourceFailure },

    /// Every configured source failed during one fetch cycle
    #[error("failed to fetch token from all {attempts} source(s), last error: {last}")]
    AllSourcesExhausted {
        attempts: usize,
        #[source]
        last: Box<TokenError>,
    },
}

/// Snapshot of the token cache for diagnostics
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenStatus {
    pub cached: bool,
    pub expires_in_secs: Option<u64>,
    /// Index of the source the next fetch cycle starts at
    pub source: usize,
    pub sources: usize,
}
