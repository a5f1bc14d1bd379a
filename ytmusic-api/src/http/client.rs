//! Resilient transport: timeout, retry with backoff, deduplication and
//! typed failure classification on top of [`reqwest::Client`].
//!
//! Per attempt:
//!
//! 1. Ask the [`HeaderProvider`] for headers (may refresh an OAuth token),
//!    then apply call-specific overrides.
//! 2. Send through the [`RequestDeduplicator`], bounded by the configured
//!    timeout.
//! 3. Classify:
//!    - 401 / 403 → [`YtMusicError::Auth`], never retried
//!    - 429 / 503 with attempts left → back off and go to 1
//!    - other status >= 400 → [`YtMusicError::Server`]
//!    - success → decode JSON (`post` / `get`) or return text (`get_raw`);
//!      bad JSON is [`YtMusicError::Parse`], never retried
//! 4. Transport errors and timeouts are retried like a retryable status;
//!    once the budget is spent they become [`YtMusicError::Network`].

use crate::auth::{HeaderProvider, Headers};
use crate::config::HttpConfig;
use crate::error::{AuthReason, Result, YtMusicError};
use crate::http::dedup::RequestDeduplicator;
use crate::http::retry::{compute_backoff, is_retryable_status};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method};
use serde_json::Value;
use std::sync::Arc;
use tokio::task::JoinError;
use tracing::{debug, warn};

/// A settled transport response with its body fully read.
///
/// Cloned for every caller that shares a deduplicated call, so each owns an
/// independent copy of the body.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// A transport-level failure (connect, reset, body read, task abort).
#[derive(Debug, Clone)]
pub struct TransportFailure {
    pub message: String,
}

impl From<reqwest::Error> for TransportFailure {
    fn from(e: reqwest::Error) -> Self {
        Self {
            message: e.to_string(),
        }
    }
}

impl From<JoinError> for TransportFailure {
    fn from(e: JoinError) -> Self {
        Self {
            message: format!("request task failed: {e}"),
        }
    }
}

/// HTTP client with retry, timeout and request deduplication.
///
/// Construct one per session; the in-flight table is owned by this value.
pub struct HttpClient {
    http: Client,
    config: HttpConfig,
    headers: Arc<dyn HeaderProvider>,
    dedup: RequestDeduplicator<RawResponse, TransportFailure>,
}

impl HttpClient {
    /// Build a client. The underlying `reqwest` client carries the same
    /// timeout, so a timed-out attempt also aborts its socket I/O.
    pub fn new(config: HttpConfig, headers: Arc<dyn HeaderProvider>) -> Result<Self> {
        let http = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            http,
            config,
            headers,
            dedup: RequestDeduplicator::new(),
        })
    }

    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    /// Number of requests currently in flight.
    pub fn inflight(&self) -> usize {
        self.dedup.len()
    }

    /// POST `body` as JSON and decode a JSON response.
    pub async fn post(&self, url: &str, body: &Value, extra: Option<&Headers>) -> Result<Value> {
        let body = serde_json::to_string(body)?;
        let resp = self.execute(Method::POST, url, Some(body), extra).await?;
        decode_json(&resp)
    }

    /// GET and decode a JSON response.
    pub async fn get(&self, url: &str, extra: Option<&Headers>) -> Result<Value> {
        let resp = self.execute(Method::GET, url, None, extra).await?;
        decode_json(&resp)
    }

    /// GET and return the body as text without decoding (tracking pings).
    pub async fn get_raw(&self, url: &str, extra: Option<&Headers>) -> Result<String> {
        let resp = self.execute(Method::GET, url, None, extra).await?;
        Ok(String::from_utf8_lossy(&resp.body).into_owned())
    }

    async fn execute(
        &self,
        method: Method,
        url: &str,
        body: Option<String>,
        extra: Option<&Headers>,
    ) -> Result<RawResponse> {
        let max_retries = self.config.max_retries;
        let base_delay = self.config.retry_base_delay();
        let mut last_error = String::new();

        for attempt in 0..=max_retries {
            let mut headers = self.build_headers(extra).await?;
            if body.is_some() {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            }
            let mut request = self.http.request(method.clone(), url).headers(headers);
            if let Some(body) = &body {
                request = request.body(body.clone());
            }
            debug!(%method, url, attempt, "sending request");

            let call = async move {
                let resp = request.send().await?;
                let status = resp.status().as_u16();
                let body = resp.bytes().await?.to_vec();
                Ok::<_, TransportFailure>(RawResponse { status, body })
            };
            let outcome = tokio::time::timeout(
                self.config.timeout(),
                self.dedup.execute(url, body.as_deref(), move || call),
            )
            .await;

            match outcome {
                Ok(Ok(resp)) => match resp.status {
                    401 | 403 => {
                        let reason = if resp.status == 401 {
                            AuthReason::Expired
                        } else {
                            AuthReason::Invalid
                        };
                        return Err(YtMusicError::Auth {
                            reason,
                            message: format!("authentication failed with status {}", resp.status),
                        });
                    }
                    status if status >= 400 => {
                        if is_retryable_status(status) && attempt < max_retries {
                            let delay = compute_backoff(attempt, base_delay);
                            warn!(url, status, attempt, ?delay, "retryable status, backing off");
                            tokio::time::sleep(delay).await;
                            continue;
                        }
                        return Err(YtMusicError::Server {
                            status,
                            message: String::from_utf8_lossy(&resp.body).into_owned(),
                        });
                    }
                    _ => return Ok(resp),
                },
                Ok(Err(failure)) => last_error = failure.message,
                Err(_) => {
                    last_error = format!("request timed out after {:?}", self.config.timeout());
                }
            }

            if attempt < max_retries {
                let delay = compute_backoff(attempt, base_delay);
                warn!(url, attempt, error = %last_error, ?delay, "transport error, backing off");
                tokio::time::sleep(delay).await;
            }
        }

        Err(YtMusicError::Network {
            attempts: max_retries + 1,
            message: last_error,
        })
    }

    /// Provider headers with `extra` layered on top (overrides win).
    async fn build_headers(&self, extra: Option<&Headers>) -> Result<HeaderMap> {
        let mut merged = self.headers.headers().await?;
        if let Some(extra) = extra {
            merged.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        to_header_map(&merged)
    }
}

fn to_header_map(headers: &Headers) -> Result<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| YtMusicError::InvalidHeader(format!("{name}: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| YtMusicError::InvalidHeader(format!("{name}: {e}")))?;
        map.insert(name, value);
    }
    Ok(map)
}

fn decode_json(resp: &RawResponse) -> Result<Value> {
    serde_json::from_slice(&resp.body)
        .map_err(|e| YtMusicError::Parse(format!("response is not valid JSON: {e}")))
}
