//! RSS 2.0 output document serialization.
//!
//! Only data from the inputs is emitted: no `lastBuildDate`, no generator.
//! The same inputs always serialize to the same bytes.

use chrono::{DateTime, FixedOffset};
use rss::{Channel, Item};

use refeed_core::Error;

/// One item of the rebuilt feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputItem {
    pub title: String,
    pub link: String,
    pub published_at: DateTime<FixedOffset>,
    /// Extracted page fragment, emitted as the item description.
    pub description: String,
}

/// Serialize a channel and its items as an RSS 2.0 document.
pub fn render_feed(title: &str, link: &str, description: &str, items: &[OutputItem]) -> Result<String, Error> {
    let mut channel = Channel::default();
    channel.set_title(title);
    channel.set_link(link);
    channel.set_description(description);
    channel.set_items(items.iter().map(to_rss_item).collect::<Vec<_>>());

    let buf = channel
        .write_to(Vec::new())
        .map_err(|e| Error::Output(format!("failed to serialize feed: {e}")))?;

    String::from_utf8(buf).map_err(|e| Error::Output(format!("serialized feed is not UTF-8: {e}")))
}

fn to_rss_item(item: &OutputItem) -> Item {
    let mut rss_item = Item::default();
    rss_item.set_title(item.title.clone());
    rss_item.set_link(item.link.clone());
    rss_item.set_pub_date(item.published_at.to_rfc2822());
    rss_item.set_description(item.description.clone());
    rss_item
}
