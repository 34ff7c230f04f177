//! Unified error types for refeed.
//!
//! Every variant carries a stable code prefix in its message so log lines
//! and process exit statuses can be correlated.

use tokio_rusqlite::rusqlite;

/// Unified error type shared by the cache, the fetch pipeline and the CLI.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Network failure or an HTTP status other than 200/304.
    #[error("FETCH_ERROR: {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// The bounded request timeout elapsed.
    #[error("FETCH_TIMEOUT: {0}")]
    FetchTimeout(String),

    /// Response body exceeded the configured byte limit.
    #[error("FETCH_TOO_LARGE: {0}")]
    FetchTooLarge(String),

    /// Target is not an absolute http(s) URL.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// Server answered 304 but the cache holds no entry for the URL.
    #[error("CACHE_INCONSISTENCY: not modified but no cached body for {0}")]
    CacheInconsistency(String),

    /// No cache entry exists for the given URL.
    #[error("UNKNOWN_KEY: {0}")]
    UnknownKey(String),

    /// Stored body could not be decoded.
    #[error("CACHE_CORRUPT: {0}")]
    CacheCorrupt(String),

    /// Database operation failed.
    #[error("CACHE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("CACHE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// Malformed feed document.
    #[error("PARSE_ERROR: {0}")]
    Parse(String),

    /// An item's publication date is missing or not RFC 2822.
    #[error("DATE_PARSE_ERROR: {value:?}: {reason}")]
    DateParse { value: String, reason: String },

    /// CSS selector could not be parsed.
    #[error("INVALID_SELECTOR: {0}")]
    InvalidSelector(String),

    /// Writing the output document failed.
    #[error("OUTPUT_ERROR: {0}")]
    Output(String),
}

impl Error {
    /// Stable machine-readable code for the variant.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Fetch { .. } => "FETCH_ERROR",
            Error::FetchTimeout(_) => "FETCH_TIMEOUT",
            Error::FetchTooLarge(_) => "FETCH_TOO_LARGE",
            Error::InvalidUrl(_) => "INVALID_URL",
            Error::CacheInconsistency(_) => "CACHE_INCONSISTENCY",
            Error::UnknownKey(_) => "UNKNOWN_KEY",
            Error::CacheCorrupt(_) => "CACHE_CORRUPT",
            Error::Database(_) | Error::MigrationFailed(_) => "CACHE_ERROR",
            Error::Parse(_) => "PARSE_ERROR",
            Error::DateParse { .. } => "DATE_PARSE_ERROR",
            Error::InvalidSelector(_) => "INVALID_SELECTOR",
            Error::Output(_) => "OUTPUT_ERROR",
        }
    }

    /// Process exit status the CLI reports for this error.
    ///
    /// `2` is reserved for configuration errors, which are not part of this enum.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::Fetch { .. } | Error::FetchTimeout(_) | Error::FetchTooLarge(_) | Error::InvalidUrl(_) => 3,
            Error::CacheInconsistency(_)
            | Error::UnknownKey(_)
            | Error::CacheCorrupt(_)
            | Error::Database(_)
            | Error::MigrationFailed(_) => 4,
            Error::Parse(_) | Error::DateParse { .. } | Error::InvalidSelector(_) => 5,
            Error::Output(_) => 6,
        }
    }
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}
