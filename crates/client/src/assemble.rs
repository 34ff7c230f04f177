//! Full-content feed assembly.
//!
//! Fetches the source feed, then each of the first N item pages, and emits a
//! new RSS document whose item descriptions are the extracted fragments.
//! Every fetch is awaited before the next one starts.

use refeed_core::cache::EntryStore;
use refeed_core::{Error, OutputConfig};

use crate::extract::{Extractor, SelectorExtractor};
use crate::feed::{OutputItem, parse_feed, render_feed};
use crate::fetch::ConditionalFetcher;

/// Serialized output document plus the source feed's change flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assembled {
    pub document: String,
    /// Whether the source feed came back fresh. Item page flags do not count.
    pub source_changed: bool,
}

/// Rebuilds a feed with page content pulled in through a [`ConditionalFetcher`].
pub struct FeedAssembler<S> {
    fetcher: ConditionalFetcher<S>,
}

impl<S: EntryStore> FeedAssembler<S> {
    pub fn new(fetcher: ConditionalFetcher<S>) -> Self {
        Self { fetcher }
    }

    /// Build the output document for `config`.
    ///
    /// The selector is parsed before any request is made.
    ///
    /// # Errors
    ///
    /// Any fetch, cache, parse or extraction error is returned as is; nothing
    /// is produced on failure.
    pub async fn build(&self, config: &OutputConfig) -> Result<Assembled, Error> {
        let extractor = SelectorExtractor::new(&config.selector)?;
        self.build_with(config, &extractor).await
    }

    /// Build the output document using a caller-supplied extractor.
    pub async fn build_with<E: Extractor + ?Sized>(
        &self, config: &OutputConfig, extractor: &E,
    ) -> Result<Assembled, Error> {
        let source = self.fetcher.fetch(&config.source_url).await?;
        let feed = parse_feed(&source.body)?;

        tracing::info!(
            source = %config.source_url,
            changed = source.changed,
            items = feed.items.len(),
            taking = config.num_items.min(feed.items.len()),
            "source feed loaded"
        );

        let mut items = Vec::with_capacity(config.num_items.min(feed.items.len()));
        for entry in feed.items.into_iter().take(config.num_items) {
            let page = self.fetcher.fetch(&entry.link).await?;
            let fragment = extractor.extract_bytes(&page.body)?;

            tracing::debug!(
                link = %entry.link,
                page_changed = page.changed,
                fragment_bytes = fragment.len(),
                "item assembled"
            );

            items.push(OutputItem {
                title: entry.name,
                link: entry.link,
                published_at: entry.published_at,
                description: fragment,
            });
        }

        let title = config.feed_title.as_deref().unwrap_or(&feed.title);
        let link = config.feed_link.as_deref().unwrap_or(&feed.link);
        let document = render_feed(title, link, &feed.description, &items)?;

        Ok(Assembled { document, source_changed: source.changed })
    }

    /// Get reference to the fetcher.
    pub fn fetcher(&self) -> &ConditionalFetcher<S> {
        &self.fetcher
    }
}
