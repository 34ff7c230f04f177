//! Core types and shared functionality for refeed.
//!
//! This crate provides:
//! - The URL-keyed conditional-fetch cache with a SQLite backend
//! - Unified error types
//! - Layered configuration and the write gate

pub mod cache;
pub mod config;
pub mod error;
pub mod gate;

pub use cache::{CacheDb, CacheStore, Logged, Validators};
pub use config::{AppConfig, ConfigError, OutputConfig, WriteMode};
pub use error::Error;
pub use gate::should_write;
