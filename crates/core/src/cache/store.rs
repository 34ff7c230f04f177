//! URL-keyed response cache: validators and compressed bodies.
//!
//! [`CacheStore`] sits on top of any [`EntryStore`]. It owns the body codec
//! and the rule that an entry is replaced as a whole, never patched.

use chrono::Utc;

use super::codec::{decode_body, encode_body};
use super::storage::{CacheStats, EntryStore, StoredEntry};
use crate::Error;

/// Conditional-request validators remembered for a URL.
///
/// Both fields are empty strings when nothing is cached or the origin sent
/// no such header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validators {
    pub etag: String,
    pub last_modified: String,
}

/// Persistent mapping from URL to the last fresh response seen for it.
#[derive(Debug, Clone)]
pub struct CacheStore<S> {
    store: S,
}

impl<S: EntryStore> CacheStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Validators stored for `url`, or empty validators when absent.
    pub async fn lookup_validators(&self, url: &str) -> Result<Validators, Error> {
        Ok(self
            .store
            .load_validators(url)
            .await?
            .map(|(etag, last_modified)| Validators { etag, last_modified })
            .unwrap_or_default())
    }

    /// Decoded body stored for `url`.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownKey`] if no entry exists
    /// - [`Error::CacheCorrupt`] if the stored payload does not decode
    pub async fn read_body(&self, url: &str) -> Result<Vec<u8>, Error> {
        let stored = self
            .store
            .load_body(url)
            .await?
            .ok_or_else(|| Error::UnknownKey(url.to_string()))?;
        decode_body(&stored)
    }

    /// Replace whatever is stored for `url` with a complete new entry.
    pub async fn replace(&self, url: &str, etag: &str, last_modified: &str, body: &[u8]) -> Result<(), Error> {
        let entry = StoredEntry {
            url: url.to_string(),
            etag: etag.to_string(),
            last_modified: last_modified.to_string(),
            body: encode_body(body)?,
            fetched_at: Utc::now().to_rfc3339(),
        };
        self.store.replace(entry).await
    }

    /// Forget the entry for `url`. Returns whether one existed.
    pub async fn remove(&self, url: &str) -> Result<bool, Error> {
        self.store.delete(url).await
    }

    /// Forget every entry. Returns how many were removed.
    pub async fn purge(&self) -> Result<u64, Error> {
        self.store.delete_all().await
    }

    pub async fn stats(&self) -> Result<CacheStats, Error> {
        self.store.stats().await
    }
}
