//! Target URL checks performed before any network I/O.
//!
//! The URL is only validated, never rewritten: the string the caller passed is
//! also the cache key, so normalizing it here would split one resource across
//! several cache rows.

/// Error type for target URL failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Parse `input` as an absolute http or https URL.
///
/// Leading and trailing whitespace is rejected rather than trimmed, since the
/// raw string doubles as the cache key.
pub fn parse_http_url(input: &str) -> Result<url::Url, UrlError> {
    if input.trim().is_empty() {
        return Err(UrlError::Empty);
    }
    if input.trim() != input {
        return Err(UrlError::InvalidUrl(format!("surrounding whitespace in {input:?}")));
    }

    let parsed = url::Url::parse(input).map_err(|e| UrlError::InvalidUrl(format!("{input}: {e}")))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    if parsed.host_str().is_none() {
        return Err(UrlError::InvalidUrl(format!("{input}: missing host")));
    }

    Ok(parsed)
}
