//! RSS 2.0 source feed parsing and output rendering.

pub mod render;

pub use render::{OutputItem, render_feed};

use chrono::{DateTime, FixedOffset};
use rss::{Channel, Item};

use refeed_core::Error;

/// Channel metadata and items of a parsed source feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFeed {
    pub title: String,
    pub link: String,
    pub description: String,
    /// Items in document order.
    pub items: Vec<FeedEntry>,
}

/// One `<item>` of the source feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    /// Item title text, empty when absent.
    pub name: String,
    /// Item link text, empty when absent.
    pub link: String,
    pub published_at: DateTime<FixedOffset>,
}

/// Parse an RSS 2.0 document.
///
/// # Errors
///
/// - [`Error::Parse`] when the document is not well-formed RSS
/// - [`Error::DateParse`] when any item's `pubDate` is missing or not RFC 2822
pub fn parse_feed(document: &[u8]) -> Result<SourceFeed, Error> {
    let channel = Channel::read_from(document).map_err(|e| Error::Parse(e.to_string()))?;

    let items = channel.items().iter().map(parse_item).collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(title = channel.title(), items = items.len(), "parsed source feed");

    Ok(SourceFeed {
        title: channel.title().to_string(),
        link: channel.link().to_string(),
        description: channel.description().to_string(),
        items,
    })
}

fn parse_item(item: &Item) -> Result<FeedEntry, Error> {
    let name = item.title().unwrap_or_default().to_string();
    let link = item.link().unwrap_or_default().to_string();

    let raw = item
        .pub_date()
        .ok_or_else(|| Error::DateParse { value: String::new(), reason: format!("item {name:?} has no pubDate") })?;
    let published_at = DateTime::parse_from_rfc2822(raw.trim())
        .map_err(|e| Error::DateParse { value: raw.to_string(), reason: e.to_string() })?;

    Ok(FeedEntry { name, link, published_at })
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Example Blog</title>
    <link>https://blog.example.com/</link>
    <description>Posts about things</description>
    <item>
      <title>Second post</title>
      <link>https://blog.example.com/2</link>
      <pubDate>Tue, 02 Jan 2024 10:00:00 +0100</pubDate>
    </item>
    <item>
      <title>First post</title>
      <link>https://blog.example.com/1</link>
      <pubDate>Mon, 01 Jan 2024 00:00:00 GMT</pubDate>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn test_parse_channel_and_items() {
        let feed = parse_feed(FEED.as_bytes()).unwrap();
        assert_eq!(feed.title, "Example Blog");
        assert_eq!(feed.link, "https://blog.example.com/");
        assert_eq!(feed.description, "Posts about things");
        assert_eq!(feed.items.len(), 2);

        assert_eq!(feed.items[0].name, "Second post");
        assert_eq!(feed.items[0].link, "https://blog.example.com/2");
        assert_eq!(feed.items[0].published_at.offset().local_minus_utc(), 3600);
        assert_eq!(feed.items[1].name, "First post");
        assert_eq!(feed.items[1].published_at.timestamp(), 1_704_067_200);
    }

    #[test]
    fn test_parse_keeps_document_order() {
        let feed = parse_feed(FEED.as_bytes()).unwrap();
        let names: Vec<_> = feed.items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["Second post", "First post"]);
    }

    #[test]
    fn test_parse_missing_title_and_link_are_empty() {
        let xml = r#"<rss version="2.0"><channel><title>t</title><link>l</link><description>d</description>
            <item><description>only text</description><pubDate>Mon, 01 Jan 2024 00:00:00 GMT</pubDate></item>
            </channel></rss>"#;
        let feed = parse_feed(xml.as_bytes()).unwrap();
        assert_eq!(feed.items[0].name, "");
        assert_eq!(feed.items[0].link, "");
    }

    #[test]
    fn test_parse_empty_channel() {
        let xml = r#"<rss version="2.0"><channel><title>t</title><link>l</link><description>d</description></channel></rss>"#;
        let feed = parse_feed(xml.as_bytes()).unwrap();
        assert!(feed.items.is_empty());
    }

    #[test]
    fn test_parse_malformed_document() {
        let result = parse_feed(b"this is not xml");
        assert!(matches!(result, Err(Error::Parse(_))));

        let result = parse_feed(b"<html><body>nope</body></html>");
        assert!(matches!(result, Err(Error::Parse(_))));
    }

    #[test]
    fn test_parse_bad_pub_date() {
        let xml = r#"<rss version="2.0"><channel><title>t</title><link>l</link><description>d</description>
            <item><title>x</title><link>https://e.com/x</link><pubDate>yesterday</pubDate></item>
            </channel></rss>"#;
        let result = parse_feed(xml.as_bytes());
        assert!(matches!(result, Err(Error::DateParse { value, .. }) if value == "yesterday"));
    }

    #[test]
    fn test_parse_missing_pub_date() {
        let xml = r#"<rss version="2.0"><channel><title>t</title><link>l</link><description>d</description>
            <item><title>x</title><link>https://e.com/x</link></item>
            </channel></rss>"#;
        let result = parse_feed(xml.as_bytes());
        assert!(matches!(result, Err(Error::DateParse { .. })));
    }
}
