//! Command implementations.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use refeed_client::{ConditionalFetcher, FeedAssembler, FetchConfig};
use refeed_core::cache::CacheStats;
use refeed_core::{AppConfig, CacheDb, CacheStore, Error, Logged, should_write};

use crate::args::{CacheAction, Command};

type Cache = CacheStore<Logged<CacheDb>>;

/// What a `run` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub source_changed: bool,
    pub written: bool,
}

/// Output from `cache purge`.
#[derive(Debug, Clone, Serialize)]
pub struct PurgeOutput {
    /// Number of entries deleted.
    pub deleted: u64,
}

pub async fn dispatch(config: &AppConfig, command: Command) -> Result<()> {
    match command {
        Command::Run => {
            run(config).await?;
        }
        Command::Cache { action: CacheAction::Stats } => {
            let stats = cache_stats(config).await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Command::Cache { action: CacheAction::Purge { url } } => {
            let deleted = cache_purge(config, url.as_deref()).await?;
            println!("{}", serde_json::to_string_pretty(&PurgeOutput { deleted })?);
        }
    }
    Ok(())
}

/// Rebuild the feed and write it when the change gate allows.
pub async fn run(config: &AppConfig) -> Result<RunReport> {
    let output = config.output()?;
    let cache = open_cache(config).await?;

    let fetcher = ConditionalFetcher::new(FetchConfig::from(&output), cache)?;
    let assembled = FeedAssembler::new(fetcher).build(&output).await?;

    let written = should_write(output.write_mode, assembled.source_changed);
    if written {
        write_atomically(&output.destination, assembled.document.as_bytes()).await?;
        tracing::info!(
            destination = %output.destination.display(),
            bytes = assembled.document.len(),
            source_changed = assembled.source_changed,
            "feed written"
        );
    } else {
        tracing::info!(
            destination = %output.destination.display(),
            write_mode = %output.write_mode,
            "source feed unchanged, destination left as is"
        );
    }

    Ok(RunReport { source_changed: assembled.source_changed, written })
}

pub async fn cache_stats(config: &AppConfig) -> Result<CacheStats> {
    let cache = open_cache(config).await?;
    Ok(cache.stats().await?)
}

/// Delete the entry for `url`, or all entries.
pub async fn cache_purge(config: &AppConfig, url: Option<&str>) -> Result<u64> {
    let cache = open_cache(config).await?;
    let deleted = match url {
        Some(url) => u64::from(cache.remove(url).await?),
        None => cache.purge().await?,
    };
    tracing::info!(deleted, "cache purged");
    Ok(deleted)
}

async fn open_cache(config: &AppConfig) -> Result<Cache> {
    if let Some(parent) = config.db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("failed to create cache directory {}", parent.display()))?;
    }

    let db = CacheDb::open(&config.db_path).await?;
    tracing::debug!(db_path = %config.db_path.display(), "cache opened");
    Ok(CacheStore::new(Logged::new(db)))
}

/// Replace `destination` with `contents` via a synced sibling temp file and rename.
async fn write_atomically(destination: &Path, contents: &[u8]) -> Result<(), Error> {
    let destination = destination.to_path_buf();
    let contents = contents.to_vec();
    tokio::task::spawn_blocking(move || persist_file(&destination, &contents))
        .await
        .map_err(|e| Error::Output(format!("write task failed: {e}")))?
}

fn persist_file(destination: &Path, contents: &[u8]) -> Result<(), Error> {
    if destination.file_name().is_none() {
        return Err(Error::Output(format!("{} is not a file path", destination.display())));
    }

    let parent = match destination.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(|e| Error::Output(format!("failed to create {}: {e}", parent.display())))?;

    // unique name per writer; dropped (and deleted) on every early return
    let mut tmp = tempfile::Builder::new()
        .prefix(".refeed-")
        .suffix(".tmp")
        .tempfile_in(parent)
        .map_err(|e| Error::Output(format!("failed to create temp file in {}: {e}", parent.display())))?;

    tmp.write_all(contents)
        .map_err(|e| Error::Output(format!("failed to write {}: {e}", tmp.path().display())))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| Error::Output(format!("failed to sync {}: {e}", tmp.path().display())))?;

    tmp.persist(destination)
        .map_err(|e| Error::Output(format!("failed to replace {}: {}", destination.display(), e.error)))?;

    Ok(())
}
