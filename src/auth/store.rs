use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;
use tokio::sync::RwLock;

use super::fetch;
use super::sources::SourceList;
use super::types::{CacheEntry, Credential, TokenError, TokenStatus};

/// Token store
/// Caches one credential bundle for a fixed TTL and fetches a new one from
/// the configured sources, rotating past failing sources.
///
/// Concurrent callers hitting a cold cache each run their own fetch cycle;
/// the last successful write wins.
pub struct TokenStore {
    /// Cached credential, if any
    cache: RwLock<Option<CacheEntry>>,

    /// Token sources and rotation cursor
    sources: RwLock<SourceList>,

    /// HTTP client for token sources, carrying the fetch timeout
    client: Client,

    /// Cache lifetime
    ttl: Duration,
}

impl TokenStore {
    /// Create a new TokenStore
    pub fn new(sources: Vec<String>, ttl: Duration, fetch_timeout: Duration) -> Result<Self> {
        let sources = SourceList::new(sources)?;

        let client = Client::builder()
            .timeout(fetch_timeout)
            .build()
            .context("Failed to create token HTTP client")?;

        Ok(Self {
            cache: RwLock::new(None),
            sources: RwLock::new(sources),
            client,
            ttl,
        })
    }

    /// Get a valid credential, fetching a new one if the cache is cold or expired
    pub async fn get_credential(&self) -> Result<Credential, TokenError> {
        {
            let cache = self.cache.read().await;
            if let Some(entry) = cache.as_ref() {
                if !entry.is_expired() {
                    tracing::debug!("Using cached token");
                    return Ok(entry.credential.clone());
                }
            }
        }

        // Evict an expired entry so a failed cycle leaves the cache empty
        {
            let mut cache = self.cache.write().await;
            if cache.as_ref().is_some_and(|entry| entry.is_expired()) {
                tracing::debug!("Cached token expired, evicting");
                *cache = None;
            }
        }

        tracing::info!("Fetching new token...");
        self.fetch_new_credential().await
    }

    /// Drop the cached credential and fetch a fresh one
    /// Used after the upstream rejects a credential we still considered valid
    pub async fn force_refresh(&self) -> Result<Credential, TokenError> {
        tracing::info!("Force refreshing token...");
        self.invalidate().await;
        self.fetch_new_credential().await
    }

    /// Drop the cached credential without fetching a replacement
    pub async fn invalidate(&self) {
        let mut cache = self.cache.write().await;
        if cache.take().is_some() {
            tracing::debug!("Token cache cleared");
        }
    }

    /// Diagnostic snapshot of the cache and source rotation
    pub async fn status(&self) -> TokenStatus {
        let (cached, expires_in_secs) = {
            let cache = self.cache.read().await;
            match cache.as_ref().filter(|entry| !entry.is_expired()) {
                Some(entry) => (true, Some(entry.remaining().as_secs())),
                None => (false, None),
            }
        };

        let sources = self.sources.read().await;
        TokenStatus {
            cached,
            expires_in_secs,
            source: sources.cursor(),
            sources: sources.len(),
        }
    }

    /// Index of the source the next fetch cycle starts at
    pub async fn current_source(&self) -> usize {
        self.sources.read().await.cursor()
    }

    /// Run one fetch cycle: try each source once, starting at the cursor
    async fn fetch_new_credential(&self) -> Result<Credential, TokenError> {
        let attempts = self.sources.read().await.len();
        let mut attempt = 0;

        loop {
            let (index, url) = {
                let sources = self.sources.read().await;
                let (index, url) = sources.current();
                (index, url.to_string())
            };

            tracing::debug!(
                source = index + 1,
                attempt = attempt + 1,
                url = %url,
                "Trying token source"
            );

            match fetch::fetch_from_source(&self.client, &url).await {
                Ok(credential) => {
                    let mut cache = self.cache.write().await;
                    *cache = Some(CacheEntry::new(credential.clone(), self.ttl));
                    tracing::info!(
                        source = index + 1,
                        ttl_secs = self.ttl.as_secs(),
                        "Token fetched and cached"
                    );
                    return Ok(credential);
                }
                Err(e) => {
                    tracing::warn!(source = index + 1, error = %e, "Token source failed");
                    self.sources.write().await.advance_past(index);

                    attempt += 1;
                    if attempt >= attempts {
                        tracing::error!(attempts, error = %e, "All token sources failed");
                        return Err(TokenError::AllSourcesExhausted {
                            attempts,
                            last: Box::new(e),
                        });
                    }
                }
            }
        }
    }
}
