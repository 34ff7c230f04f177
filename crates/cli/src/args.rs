//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use refeed_core::WriteMode;
use serde::Serialize;

#[derive(Debug, Parser)]
#[command(name = "refeed", version)]
#[command(about = "Rebuild an RSS feed with the full content of each linked page", long_about = None)]
pub struct Cli {
    /// TOML configuration file (falls back to REFEED_CONFIG_FILE)
    #[arg(global = true, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON lines on stderr
    #[arg(global = true, long, default_value_t = false)]
    pub log_json: bool,

    #[command(flatten)]
    pub overrides: Overrides,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Configuration flags. Each one set on the command line beats every other
/// source; unset ones are left out of the override layer entirely.
#[derive(Debug, Default, Clone, Args, Serialize)]
pub struct Overrides {
    /// Source RSS feed URL
    #[arg(global = true, long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,

    /// CSS selector for the content to pull from each item page
    #[arg(global = true, long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,

    /// Output file for the rebuilt feed
    #[arg(global = true, long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<PathBuf>,

    /// SQLite cache file
    #[arg(global = true, long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_path: Option<PathBuf>,

    #[arg(global = true, long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,

    /// Number of source items to rebuild
    #[arg(global = true, long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_items: Option<usize>,

    /// `always` or `changed`
    #[arg(global = true, long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub write_mode: Option<WriteMode>,

    /// Channel title to use instead of the source's
    #[arg(global = true, long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feed_title: Option<String>,

    /// Channel link to use instead of the source's
    #[arg(global = true, long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feed_link: Option<String>,

    #[arg(global = true, long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,

    #[arg(global = true, long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_bytes: Option<usize>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Build the feed and write it if the source changed (default)
    Run,
    /// Inspect or clear the fetch cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum CacheAction {
    /// Print entry count, stored bytes and fetch-time range as JSON
    Stats,
    /// Remove one entry, or every entry when no URL is given
    Purge {
        #[arg(long)]
        url: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_defaults_to_none() {
        let cli = Cli::try_parse_from(["refeed", "--source-url", "https://e.com/rss"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.overrides.source_url.as_deref(), Some("https://e.com/rss"));
    }

    #[test]
    fn test_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["refeed", "run", "--num-items", "3", "--write-mode", "always", "--log-json"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Run)));
        assert_eq!(cli.overrides.num_items, Some(3));
        assert_eq!(cli.overrides.write_mode, Some(WriteMode::Always));
        assert!(cli.log_json);
    }

    #[test]
    fn test_cache_purge_url() {
        let cli = Cli::try_parse_from(["refeed", "cache", "purge", "--url", "https://e.com/a"]).unwrap();
        match cli.command {
            Some(Command::Cache { action: CacheAction::Purge { url } }) => {
                assert_eq!(url.as_deref(), Some("https://e.com/a"))
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_bad_write_mode_rejected() {
        assert!(Cli::try_parse_from(["refeed", "--write-mode", "sometimes"]).is_err());
    }

    #[test]
    fn test_overrides_skip_unset_fields() {
        let overrides = Overrides { num_items: Some(4), ..Default::default() };
        let json = serde_json::to_value(&overrides).unwrap();
        assert_eq!(json, serde_json::json!({ "num_items": 4 }));
    }
}
