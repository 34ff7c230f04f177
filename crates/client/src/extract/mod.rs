//! Fragment extraction from item pages by CSS selector.
//!
//! ### Algorithm
//! - Parse the page leniently with `scraper` (html5ever), so malformed markup
//!   still yields a tree.
//! - Select every element matching the selector, in document order.
//! - Concatenate the inner HTML of each match; no separator is inserted.
//!
//! A selector that matches nothing yields an empty fragment, not an error.
//!
//! ### Stable Abstraction
//! - Callers depend on the `Extractor` trait, so the selection engine can be
//!   swapped without touching the assembler.

use scraper::{Html, Selector};

use refeed_core::Error;

/// Stable extractor trait for pulling a fragment out of an HTML page.
pub trait Extractor: Send + Sync {
    /// Extract the fragment from a decoded HTML document.
    fn extract(&self, html: &str) -> Result<String, Error>;

    /// Extract from raw page bytes.
    ///
    /// Bytes that are not valid UTF-8 are replaced rather than rejected.
    fn extract_bytes(&self, body: &[u8]) -> Result<String, Error> {
        self.extract(&String::from_utf8_lossy(body))
    }
}

/// Extractor backed by a pre-parsed CSS selector.
#[derive(Debug, Clone)]
pub struct SelectorExtractor {
    source: String,
    selector: Selector,
}

impl SelectorExtractor {
    /// Parse `selector` once so it can be applied to many pages.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSelector`] when the selector does not parse.
    pub fn new(selector: &str) -> Result<Self, Error> {
        let parsed = Selector::parse(selector).map_err(|e| Error::InvalidSelector(format!("{selector}: {e}")))?;
        Ok(Self { source: selector.to_string(), selector: parsed })
    }
}

impl Extractor for SelectorExtractor {
    fn extract(&self, html: &str) -> Result<String, Error> {
        let document = Html::parse_document(html);

        let mut fragment = String::new();
        let mut matches = 0usize;
        for element in document.select(&self.selector) {
            fragment.push_str(&element.inner_html());
            matches += 1;
        }

        if matches == 0 {
            tracing::debug!(selector = %self.source, "selector matched nothing");
        }

        Ok(fragment)
    }
}

/// Extract the fragment selected by `selector` from raw page bytes.
///
/// Convenience wrapper that parses the selector on every call; prefer
/// [`SelectorExtractor`] when processing several pages.
pub fn extract_fragment(body: &[u8], selector: &str) -> Result<String, Error> {
    SelectorExtractor::new(selector)?.extract_bytes(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTICLE_HTML: &str = r#"
        <!DOCTYPE html>
        <html>
        <head><title>Post</title></head>
        <body>
            <nav><a href="/">Home</a></nav>
            <div class="content"><p>Full text of the post.</p></div>
            <footer>footer</footer>
        </body>
        </html>
    "#;

    #[test]
    fn test_extract_single_match() {
        let extractor = SelectorExtractor::new("div.content").unwrap();
        let fragment = extractor.extract(ARTICLE_HTML).unwrap();
        assert_eq!(fragment, "<p>Full text of the post.</p>");
    }

    #[test]
    fn test_extract_multiple_matches_concatenated() {
        let html = r#"<html><body><div class="c">A</div><div class="c">B</div></body></html>"#;
        let fragment = extract_fragment(html.as_bytes(), "div.c").unwrap();
        assert_eq!(fragment, "AB");
    }

    #[test]
    fn test_extract_no_match_is_empty() {
        let fragment = extract_fragment(ARTICLE_HTML.as_bytes(), "div.missing").unwrap();
        assert_eq!(fragment, "");
    }

    #[test]
    fn test_extract_keeps_nested_markup() {
        let html = r#"<article><div class="c"><h2>T</h2><p>x <em>y</em></p></div></article>"#;
        let fragment = extract_fragment(html.as_bytes(), ".c").unwrap();
        assert_eq!(fragment, "<h2>T</h2><p>x <em>y</em></p>");
    }

    #[test]
    fn test_extract_malformed_html() {
        let html = "<div class=\"c\"><p>unclosed";
        let fragment = extract_fragment(html.as_bytes(), "div.c").unwrap();
        assert_eq!(fragment, "<p>unclosed</p>");
    }

    #[test]
    fn test_extract_invalid_utf8_is_lossy() {
        let mut body = b"<div class=\"c\">ok".to_vec();
        body.push(0xFF);
        body.extend_from_slice(b"</div>");
        let fragment = extract_fragment(&body, "div.c").unwrap();
        assert!(fragment.starts_with("ok"));
    }

    #[test]
    fn test_invalid_selector() {
        let result = SelectorExtractor::new("div[");
        assert!(matches!(result, Err(Error::InvalidSelector(_))));

        let result = extract_fragment(b"<p>x</p>", ">>>");
        assert!(matches!(result, Err(Error::InvalidSelector(_))));
    }
}
