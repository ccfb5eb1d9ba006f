//! Image Fetcher: HTTP GET with a browser-like profile, bounded retries and a
//! content-addressed cache in front.
//!
//! Outcomes:
//! - 2xx with a non-HTML body within the byte ceiling → `Bytes` (written to the cache)
//! - HTML bodies, oversized bodies, 401/403/404, other statuses → `Skipped`, no retry
//! - 429/5xx → retried; `TransientFailure` once attempts run out
//! - transport errors → retried; surfaced as `FetchError::Transport` once attempts run out

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use rand::Rng;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode, Url};
use thiserror::Error;
use tracing::{debug, warn};

use crate::images::cache::ImageCache;

pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
const ACCEPT: &str = "image/jpeg,image/png,image/gif,image/*;q=0.8,*/*;q=0.5";
const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";
const ACCEPT_ENCODING: &str = "gzip, deflate, br";
const GOOGLE_REFERER: &str = "https://www.google.com/";

pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;
const MAX_ATTEMPTS: u32 = 3;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("transport error after {attempts} attempts: {source}")]
    Transport {
        attempts: u32,
        #[source]
        source: reqwest::Error,
    },
}

/// Why an image was not retrieved. None of these are worth retrying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    InvalidUrl,
    HtmlContent { content_type: String },
    TooLarge { limit: usize },
    EmptyBody,
    Denied { status: u16 },
    UnexpectedStatus { status: u16 },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::InvalidUrl => write!(f, "not an http(s) URL"),
            SkipReason::HtmlContent { content_type } => {
                write!(f, "server returned HTML instead of an image ({content_type})")
            }
            SkipReason::TooLarge { limit } => write!(f, "image larger than {limit} bytes"),
            SkipReason::EmptyBody => write!(f, "empty response body"),
            SkipReason::Denied { status } => write!(f, "access denied or not found (HTTP {status})"),
            SkipReason::UnexpectedStatus { status } => write!(f, "unexpected HTTP status {status}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Bytes(Bytes),
    Skipped(SkipReason),
    /// Every attempt hit 429 or 5xx.
    TransientFailure { attempts: u32, last_status: u16 },
}

// ────────────────────────────────────────────────────────────────────────────
// Configuration
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub connect_timeout: Duration,
    /// Whole-request timeout, body included.
    pub request_timeout: Duration,
    pub max_bytes: usize,
    pub max_attempts: u32,
    /// Delay before retry n is `backoff_step × n` plus up to `max_jitter`.
    pub backoff_step: Duration,
    pub max_jitter: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(8),
            request_timeout: Duration::from_secs(25),
            max_bytes: MAX_IMAGE_BYTES,
            max_attempts: MAX_ATTEMPTS,
            backoff_step: Duration::from_millis(250),
            max_jitter: Duration::from_millis(200),
        }
    }
}

impl FetchConfig {
    /// Delay after failed attempt number `attempt` (1-based).
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let jitter_ms = self.max_jitter.as_millis() as u64;
        let jitter = if jitter_ms == 0 {
            0
        } else {
            rand::rng().random_range(0..jitter_ms)
        };
        self.backoff_step * attempt + Duration::from_millis(jitter)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Sleep capability
// ────────────────────────────────────────────────────────────────────────────

/// Waits between retries. Injected so tests can observe delays without waiting.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Fetcher
// ────────────────────────────────────────────────────────────────────────────

enum Attempt {
    Done(FetchOutcome),
    Retry(StatusCode),
}

#[derive(Clone)]
pub struct ImageFetcher {
    client: Client,
    config: FetchConfig,
    cache: Option<ImageCache>,
    sleeper: Arc<dyn Sleeper>,
}

impl ImageFetcher {
    pub fn new(config: FetchConfig, cache: Option<ImageCache>) -> Result<Self, FetchError> {
        Self::with_sleeper(config, cache, Arc::new(TokioSleeper))
    }

    pub fn with_sleeper(
        config: FetchConfig,
        cache: Option<ImageCache>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static(ACCEPT));
        headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE));
        headers.insert(header::ACCEPT_ENCODING, HeaderValue::from_static(ACCEPT_ENCODING));

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self {
            client,
            config,
            cache,
            sleeper,
        })
    }

    /// Returns the image bytes for `url`, from the cache when possible.
    ///
    /// Surrounding whitespace is ignored; the trimmed URL is validated, requested
    /// and used as the cache key.
    pub async fn fetch(&self, url: &str) -> Result<FetchOutcome, FetchError> {
        let url = url.trim();
        let Some(parsed) = parse_http_url(url) else {
            warn!(url, "Skipping image: not an http(s) URL");
            return Ok(FetchOutcome::Skipped(SkipReason::InvalidUrl));
        };

        if let Some(cached) = self.cached(url).await {
            debug!(url, bytes = cached.len(), "Image cache hit");
            return Ok(FetchOutcome::Bytes(Bytes::from(cached)));
        }

        let outcome = self.fetch_with_retries(url, &parsed).await?;

        if let FetchOutcome::Bytes(bytes) = &outcome {
            self.store(url, bytes).await;
        }
        Ok(outcome)
    }

    // Cache I/O is blocking filesystem work.
    async fn cached(&self, url: &str) -> Option<Vec<u8>> {
        let cache = self.cache.clone()?;
        let url = url.to_string();
        match tokio::task::spawn_blocking(move || cache.get(&url)).await {
            Ok(hit) => hit,
            Err(e) => {
                warn!(error = %e, "Cache read task failed, treating as miss");
                None
            }
        }
    }

    async fn store(&self, url: &str, bytes: &Bytes) {
        let Some(cache) = self.cache.clone() else {
            return;
        };
        let (key, bytes) = (url.to_string(), bytes.clone());
        match tokio::task::spawn_blocking(move || cache.put(&key, &bytes)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(url, error = %e, "Failed to cache image"),
            Err(e) => warn!(url, error = %e, "Cache write task failed"),
        }
    }

    async fn fetch_with_retries(&self, url: &str, parsed: &Url) -> Result<FetchOutcome, FetchError> {
        let referer = referer_for(parsed);
        let attempts = self.config.max_attempts.max(1);
        let mut last_transport: Option<reqwest::Error> = None;
        let mut last_status = StatusCode::SERVICE_UNAVAILABLE;

        for attempt in 1..=attempts {
            if attempt > 1 {
                let delay = self.config.backoff_delay(attempt - 1);
                debug!(url, attempt, delay_ms = delay.as_millis() as u64, "Backing off before retry");
                self.sleeper.sleep(delay).await;
            }

            match self.attempt(url, &referer).await {
                Ok(Attempt::Done(outcome)) => {
                    if let FetchOutcome::Skipped(reason) = &outcome {
                        warn!(url, %reason, "Skipping image");
                    }
                    return Ok(outcome);
                }
                Ok(Attempt::Retry(status)) => {
                    warn!(url, attempt, status = status.as_u16(), "Transient HTTP status");
                    last_status = status;
                }
                Err(e) => {
                    warn!(url, attempt, error = %e, "Transport error");
                    last_transport = Some(e);
                }
            }
        }

        if let Some(source) = last_transport {
            return Err(FetchError::Transport { attempts, source });
        }
        warn!(url, attempts, status = last_status.as_u16(), "Giving up after transient failures");
        Ok(FetchOutcome::TransientFailure {
            attempts,
            last_status: last_status.as_u16(),
        })
    }

    async fn attempt(&self, url: &str, referer: &str) -> Result<Attempt, reqwest::Error> {
        let mut response = self
            .client
            .get(url)
            .header(header::REFERER, referer)
            .send()
            .await?;
        let status = response.status();

        if status.is_success() {
            let content_type = response
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_ascii_lowercase();
            if content_type.contains("text/html") {
                return Ok(Attempt::Done(FetchOutcome::Skipped(SkipReason::HtmlContent {
                    content_type,
                })));
            }

            let limit = self.config.max_bytes;
            let too_large = Attempt::Done(FetchOutcome::Skipped(SkipReason::TooLarge { limit }));
            if response.content_length().is_some_and(|len| len > limit as u64) {
                return Ok(too_large);
            }

            let mut body = Vec::new();
            while let Some(chunk) = response.chunk().await? {
                if body.len() + chunk.len() > limit {
                    return Ok(too_large);
                }
                body.extend_from_slice(&chunk);
            }
            if body.is_empty() {
                return Ok(Attempt::Done(FetchOutcome::Skipped(SkipReason::EmptyBody)));
            }
            return Ok(Attempt::Done(FetchOutcome::Bytes(Bytes::from(body))));
        }

        let outcome = match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => {
                SkipReason::Denied {
                    status: status.as_u16(),
                }
            }
            StatusCode::TOO_MANY_REQUESTS => return Ok(Attempt::Retry(status)),
            s if s.is_server_error() => return Ok(Attempt::Retry(status)),
            _ => SkipReason::UnexpectedStatus {
                status: status.as_u16(),
            },
        };
        Ok(Attempt::Done(FetchOutcome::Skipped(outcome)))
    }
}

/// Accepts only absolute `http`/`https` URLs with a host.
pub fn parse_http_url(url: &str) -> Option<Url> {
    let parsed = Url::parse(url.trim()).ok()?;
    let http = matches!(parsed.scheme(), "http" | "https");
    (http && parsed.host_str().is_some()).then_some(parsed)
}

/// Google image hosts want a Google referer; everything else gets its own origin.
pub fn referer_for(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
    if host.ends_with("gstatic.com") || host.contains("google") {
        GOOGLE_REFERER.to_string()
    } else {
        format!("https://{host}/")
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
