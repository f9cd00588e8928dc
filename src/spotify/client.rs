use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, StatusCode, header::RETRY_AFTER};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Longest `Retry-After` the client is willing to honour.
const MAX_RETRY_AFTER_SECS: u64 = 120;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("access token rejected: {reason}")]
    AuthExpired { reason: String },

    #[error("remote API error (status {status}): {reason}")]
    Remote { status: u16, reason: String },

    #[error("connection refused after {attempts} attempts")]
    RetryExhausted { attempts: u32 },

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("batch response from {url} has {actual} entries, expected {expected}")]
    BatchMisaligned {
        url: String,
        expected: usize,
        actual: usize,
    },
}

/// Network-level failure below HTTP. Retried like a rate limit.
#[derive(Debug, Error)]
#[error("connection failed: {0}")]
pub struct TransportError(pub String);

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub reason: String,
    pub retry_after: Option<u64>,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        RawResponse {
            status: 200,
            reason: "OK".to_string(),
            retry_after: None,
            body: body.into(),
        }
    }

    pub fn status(status: u16, reason: &str) -> Self {
        RawResponse {
            status,
            reason: reason.to_string(),
            retry_after: None,
            body: Vec::new(),
        }
    }

    /// Reason to report for a failed call: the API's own error message when
    /// the body carries one, the HTTP reason phrase otherwise.
    fn failure_reason(&self) -> String {
        serde_json::from_slice::<Value>(&self.body)
            .ok()
            .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
            .unwrap_or_else(|| self.reason.clone())
    }
}

/// Authenticated GET against the remote API.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &str, token: &str) -> Result<RawResponse, TransportError>;
}

pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::with_client(Client::new())
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str, token: &str) -> Result<RawResponse, TransportError> {
        let response = self.client.get(url).bearer_auth(token).send().await?;

        let status = response.status();
        let retry_after = if status == StatusCode::TOO_MANY_REQUESTS {
            response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
        } else {
            None
        };
        let body = response.bytes().await?;

        Ok(RawResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            retry_after,
            body: body.to_vec(),
        })
    }
}

/// Attempt budget and linear backoff for rate-limited calls.
///
/// The n-th retry waits `initial_delay + (n - 1) * step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub step: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay,
            step: Duration::from_secs(1),
        }
    }

    /// No waiting between attempts.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_delay: Duration::ZERO,
            step: Duration::ZERO,
        }
    }

    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        self.initial_delay + self.step * retry.saturating_sub(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(10, Duration::from_secs(4))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Profile,
    SavedTracks,
    SavedAlbums,
    Playlists,
    AudioFeatures,
    Artists,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Profile => "/me",
            Endpoint::SavedTracks => "/me/tracks",
            Endpoint::SavedAlbums => "/me/albums",
            Endpoint::Playlists => "/me/playlists",
            Endpoint::AudioFeatures => "/audio-features",
            Endpoint::Artists => "/artists",
        }
    }
}

/// Handle on the Spotify Web API shared by every stage of a scrape.
#[derive(Clone)]
pub struct SpotifyClient {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    retry: RetryPolicy,
}

impl SpotifyClient {
    pub fn new(transport: Arc<dyn HttpTransport>, base_url: impl Into<String>, retry: RetryPolicy) -> Self {
        Self {
            transport,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            retry,
        }
    }

    pub fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// GETs `url` and decodes the JSON body.
    ///
    /// 429 responses and connection failures are retried with a linearly
    /// growing delay until the attempt budget runs out. 401 and every other
    /// non-200 status fail at once.
    pub async fn get<T: DeserializeOwned>(&self, url: &str, token: &str) -> Result<T, ApiError> {
        let attempts = self.retry.max_attempts.max(1);

        for attempt in 1..=attempts {
            debug!(url, attempt, "GET");
            let retry_after = match self.transport.get(url, token).await {
                Ok(response) if response.status == 200 => {
                    return serde_json::from_slice(&response.body).map_err(|source| {
                        ApiError::Decode {
                            url: url.to_string(),
                            source,
                        }
                    });
                }
                Ok(response) if response.status == 429 => {
                    warn!(url, attempt, "rate limited");
                    response.retry_after
                }
                Ok(response) if response.status == 401 => {
                    return Err(ApiError::AuthExpired {
                        reason: response.failure_reason(),
                    });
                }
                Ok(response) => {
                    return Err(ApiError::Remote {
                        status: response.status,
                        reason: response.failure_reason(),
                    });
                }
                Err(e) => {
                    warn!(url, attempt, error = %e, "could not fulfill GET");
                    None
                }
            };

            if attempt < attempts {
                let mut delay = self.retry.delay_for_retry(attempt);
                if let Some(secs) = retry_after.filter(|s| *s <= MAX_RETRY_AFTER_SECS) {
                    delay = delay.max(Duration::from_secs(secs));
                }
                sleep(delay).await;
            }
        }

        Err(ApiError::RetryExhausted { attempts })
    }
}
