//! Client code for refeed.
//!
//! This crate provides the conditional HTTP fetch pipeline, RSS parsing and
//! rendering, CSS-selector extraction and the feed assembler used by the CLI.

pub mod assemble;
pub mod extract;
pub mod feed;
pub mod fetch;

pub use assemble::{Assembled, FeedAssembler};
pub use extract::{Extractor, SelectorExtractor, extract_fragment};
pub use feed::{FeedEntry, OutputItem, SourceFeed, parse_feed, render_feed};
pub use fetch::{ConditionalFetcher, FetchConfig, FetchOutcome, Fetched, UrlError, parse_http_url};
