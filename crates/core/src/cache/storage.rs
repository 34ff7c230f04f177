//! Plain storage interface for cache rows, plus a tracing decorator.
//!
//! [`EntryStore`] knows nothing about compression or HTTP; it moves encoded
//! rows in and out. [`Logged`] wraps any store and reports each call.

use async_trait::async_trait;
use serde::Serialize;

use crate::Error;

/// One persisted row, with the body already encoded for storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEntry {
    pub url: String,
    pub etag: String,
    pub last_modified: String,
    pub body: String,
    pub fetched_at: String,
}

/// Aggregate statistics over the stored rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: i64,
    pub stored_bytes: i64,
    pub oldest: Option<String>,
    pub newest: Option<String>,
}

/// Row-level storage keyed by URL.
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Stored `(etag, last_modified)` pair for `url`, if a row exists.
    async fn load_validators(&self, url: &str) -> Result<Option<(String, String)>, Error>;

    /// Stored (encoded) body for `url`, if a row exists.
    async fn load_body(&self, url: &str) -> Result<Option<String>, Error>;

    /// Delete any row for `entry.url` and insert `entry`, as one transaction.
    async fn replace(&self, entry: StoredEntry) -> Result<(), Error>;

    /// Delete the row for `url`. Returns whether a row existed.
    async fn delete(&self, url: &str) -> Result<bool, Error>;

    /// Delete every row. Returns the number deleted.
    async fn delete_all(&self) -> Result<u64, Error>;

    async fn stats(&self) -> Result<CacheStats, Error>;
}

/// Decorator that traces every call made to the wrapped store.
#[derive(Debug, Clone)]
pub struct Logged<S> {
    inner: S,
}

impl<S> Logged<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<S: EntryStore> EntryStore for Logged<S> {
    async fn load_validators(&self, url: &str) -> Result<Option<(String, String)>, Error> {
        let result = self.inner.load_validators(url).await;
        match &result {
            Ok(Some((etag, last_modified))) => {
                tracing::debug!(url, etag = %etag, last_modified = %last_modified, "cache validators hit")
            }
            Ok(None) => tracing::debug!(url, "cache validators miss"),
            Err(e) => tracing::warn!(url, error = %e, "cache validator lookup failed"),
        }
        result
    }

    async fn load_body(&self, url: &str) -> Result<Option<String>, Error> {
        let result = self.inner.load_body(url).await;
        match &result {
            Ok(Some(body)) => tracing::debug!(url, stored_bytes = body.len(), "cache body hit"),
            Ok(None) => tracing::debug!(url, "cache body miss"),
            Err(e) => tracing::warn!(url, error = %e, "cache body read failed"),
        }
        result
    }

    async fn replace(&self, entry: StoredEntry) -> Result<(), Error> {
        let url = entry.url.clone();
        let stored_bytes = entry.body.len();
        let result = self.inner.replace(entry).await;
        match &result {
            Ok(()) => tracing::debug!(url = %url, stored_bytes, "cache entry replaced"),
            Err(e) => tracing::warn!(url = %url, error = %e, "cache replace failed"),
        }
        result
    }

    async fn delete(&self, url: &str) -> Result<bool, Error> {
        let result = self.inner.delete(url).await;
        if let Ok(existed) = &result {
            tracing::debug!(url, existed, "cache entry deleted");
        }
        result
    }

    async fn delete_all(&self) -> Result<u64, Error> {
        let result = self.inner.delete_all().await;
        if let Ok(count) = &result {
            tracing::debug!(count, "cache purged");
        }
        result
    }

    async fn stats(&self) -> Result<CacheStats, Error> {
        self.inner.stats().await
    }
}
