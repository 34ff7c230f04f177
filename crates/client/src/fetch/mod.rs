//! Conditional HTTP fetches backed by the URL cache.
//!
//! ### Conditional GET
//! - Stored `ETag` is sent as `If-None-Match`, stored `Last-Modified` as
//!   `If-Modified-Since`; each only when non-empty.
//! - `200` stores the new body and validators, `304` serves the cached body.
//! - Anything else is an error; there is no retry.
//!
//! ### Safety Gates
//! - Only absolute http(s) URLs are requested.
//! - Bounded request timeout (default: 20s)
//! - Max redirects: 5
//! - Max body bytes: 5MB (configurable)

pub mod url;

use bytes::Bytes;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};
use std::time::{Duration, Instant};

pub use self::url::{UrlError, parse_http_url};

use refeed_core::cache::EntryStore;
use refeed_core::{CacheStore, Error, OutputConfig, Validators};

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "refeed/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 5MB)
    pub max_bytes: usize,

    /// Request timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "refeed/0.1".to_string(),
            max_bytes: 5 * 1024 * 1024,
            timeout: Duration::from_millis(20000),
            max_redirects: 5,
        }
    }
}

impl From<&OutputConfig> for FetchConfig {
    fn from(config: &OutputConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            max_bytes: config.max_bytes,
            timeout: config.timeout(),
            ..Default::default()
        }
    }
}

/// What the origin server said about a conditional request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// `200 OK` with a complete body and whatever validators came with it.
    Fresh { body: Bytes, etag: String, last_modified: String },
    /// `304 Not Modified`.
    NotModified,
}

/// Body of a fetch together with its change flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched {
    pub body: Bytes,
    /// `true` for a fresh `200` response, `false` when served from cache after `304`.
    pub changed: bool,
}

/// HTTP client that makes every GET conditional on the cached validators.
pub struct ConditionalFetcher<S> {
    http: Client,
    config: FetchConfig,
    cache: CacheStore<S>,
}

impl<S: EntryStore> ConditionalFetcher<S> {
    /// Create a fetcher that reads and updates `cache`.
    pub fn new(config: FetchConfig, cache: CacheStore<S>) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::Fetch { url: String::new(), reason: format!("failed to build HTTP client: {e}") })?;

        Ok(Self { http, config, cache })
    }

    /// Fetch `url`, serving the cached body when the origin reports no change.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidUrl`] for a non-http(s) target
    /// - [`Error::Fetch`] / [`Error::FetchTimeout`] / [`Error::FetchTooLarge`] for transport failures
    /// - [`Error::CacheInconsistency`] for a `304` with nothing cached
    pub async fn fetch(&self, url: &str) -> Result<Fetched, Error> {
        let validators = self.cache.lookup_validators(url).await?;

        match self.request(url, &validators).await? {
            FetchOutcome::Fresh { body, etag, last_modified } => {
                self.cache.replace(url, &etag, &last_modified, &body).await?;
                Ok(Fetched { body, changed: true })
            }
            FetchOutcome::NotModified => {
                let body = self.cache.read_body(url).await.map_err(|e| match e {
                    Error::UnknownKey(_) => Error::CacheInconsistency(url.to_string()),
                    other => other,
                })?;
                tracing::debug!(url, bytes = body.len(), "not modified, serving cached body");
                Ok(Fetched { body: Bytes::from(body), changed: false })
            }
        }
    }

    /// Issue one GET carrying `validators`, without touching the cache.
    pub async fn request(&self, url: &str, validators: &Validators) -> Result<FetchOutcome, Error> {
        let start = Instant::now();
        let target = parse_http_url(url).map_err(|e| Error::InvalidUrl(e.to_string()))?;

        let response = self
            .http
            .get(target)
            .headers(conditional_headers(url, validators))
            .send()
            .await
            .map_err(|e| transport_error(url, &e))?;

        let status = response.status();
        if status == StatusCode::NOT_MODIFIED {
            tracing::debug!(url, fetch_ms = start.elapsed().as_millis() as u64, "304 not modified");
            return Ok(FetchOutcome::NotModified);
        }
        if status != StatusCode::OK {
            return Err(Error::Fetch { url: url.to_string(), reason: format!("unexpected status {}", status.as_u16()) });
        }

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(Error::FetchTooLarge(format!("{url}: {len} bytes exceeds {}", self.config.max_bytes)));
        }

        let etag = header_string(response.headers(), header::ETAG);
        let last_modified = header_string(response.headers(), header::LAST_MODIFIED);

        let body = response.bytes().await.map_err(|e| transport_error(url, &e))?;

        if body.len() > self.config.max_bytes {
            return Err(Error::FetchTooLarge(format!(
                "{url}: {} bytes exceeds {}",
                body.len(),
                self.config.max_bytes
            )));
        }

        tracing::debug!(
            url,
            fetch_ms = start.elapsed().as_millis() as u64,
            bytes = body.len(),
            etag = %etag,
            "200 fresh body"
        );

        Ok(FetchOutcome::Fresh { body, etag, last_modified })
    }

    /// Get reference to the cache.
    pub fn cache(&self) -> &CacheStore<S> {
        &self.cache
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }
}

fn conditional_headers(url: &str, validators: &Validators) -> HeaderMap {
    let mut headers = HeaderMap::new();

    if !validators.etag.is_empty() {
        match HeaderValue::from_str(&validators.etag) {
            Ok(value) => {
                headers.insert(header::IF_NONE_MATCH, value);
            }
            Err(_) => tracing::warn!(url, etag = %validators.etag, "stored etag is not a valid header value"),
        }
    }

    if !validators.last_modified.is_empty() {
        match HeaderValue::from_str(&validators.last_modified) {
            Ok(value) => {
                headers.insert(header::IF_MODIFIED_SINCE, value);
            }
            Err(_) => tracing::warn!(
                url,
                last_modified = %validators.last_modified,
                "stored last-modified is not a valid header value"
            ),
        }
    }

    headers
}

fn header_string(headers: &HeaderMap, name: header::HeaderName) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_default()
}

fn transport_error(url: &str, err: &reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::FetchTimeout(url.to_string())
    } else {
        Error::Fetch { url: url.to_string(), reason: format!("network error: {err}") }
    }
}
