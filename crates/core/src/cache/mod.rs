//! SQLite-backed conditional-fetch cache.
//!
//! Stores, per URL, the validators and body of the last fresh response so a
//! later request can be made conditional. Layers, innermost first:
//!
//! - [`CacheDb`]: SQLite connection and the [`EntryStore`] row operations
//! - [`Logged`]: optional tracing decorator around any [`EntryStore`]
//! - [`CacheStore`]: body codec and validator semantics

pub mod codec;
pub mod connection;
pub mod entries;
pub mod migrations;
pub mod storage;
pub mod store;

pub use crate::Error;

pub use connection::CacheDb;
pub use storage::{CacheStats, EntryStore, Logged, StoredEntry};
pub use store::{CacheStore, Validators};
