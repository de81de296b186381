//! HTML parser for extracting links
//!
//! A link is recorded for every `<a>` element carrying a non-empty `href`
//! attribute. The `href` is stored exactly as written in the document, and
//! the link text is the element's first child when that child is a text node.

use crate::crawler::ByteStream;
use crate::config::DEFAULT_MAX_BODY_BYTES;
use crate::ParseError;
use async_trait::async_trait;
use scraper::{Html, Selector};

/// A hyperlink found in a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Link text, possibly empty
    pub text: String,

    /// Raw `href` attribute value, never empty
    pub href: String,
}

impl Link {
    pub fn new(text: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            href: href.into(),
        }
    }
}

/// Turns a response body into links
#[async_trait]
pub trait LinkExtractor: Send + Sync {
    /// Consumes `body` and returns the links it contains
    ///
    /// The body is released before this returns, whatever the outcome.
    async fn extract_links(&self, body: ByteStream, source_url: &str)
        -> Result<Vec<Link>, ParseError>;
}

/// [`LinkExtractor`] for UTF-8 HTML documents
#[derive(Debug, Clone)]
pub struct HtmlLinkExtractor {
    max_body_bytes: usize,
}

impl HtmlLinkExtractor {
    pub fn new(max_body_bytes: usize) -> Self {
        Self { max_body_bytes }
    }
}

impl Default for HtmlLinkExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_BODY_BYTES)
    }
}

#[async_trait]
impl LinkExtractor for HtmlLinkExtractor {
    async fn extract_links(
        &self,
        mut body: ByteStream,
        source_url: &str,
    ) -> Result<Vec<Link>, ParseError> {
        let bytes = read_body(&mut body, source_url, self.max_body_bytes).await?;
        drop(body);

        let html = String::from_utf8(bytes).map_err(|e| {
            ParseError::new(source_url, "document is not valid UTF-8").with_source(e)
        })?;

        let links = parse_links(&html);
        tracing::trace!(url = source_url, links = links.len(), "Links extracted");
        Ok(links)
    }
}

async fn read_body(
    body: &mut ByteStream,
    source_url: &str,
    limit: usize,
) -> Result<Vec<u8>, ParseError> {
    let mut buf = Vec::new();

    while let Some(chunk) = body.next_chunk().await {
        let chunk = chunk.map_err(|e| {
            ParseError::new(source_url, "failed to read response body").with_source(e)
        })?;

        if buf.len() + chunk.len() > limit {
            return Err(ParseError::new(
                source_url,
                format!("document exceeds size limit of {} bytes", limit),
            ));
        }
        buf.extend_from_slice(&chunk);
    }

    Ok(buf)
}

/// Extracts every `<a href>` link from an HTML document
///
/// # Example
///
/// ```
/// use linkscrape::crawler::parse_links;
///
/// let links = parse_links(r#"<html><body><a href="/x">X</a></body></html>"#);
/// assert_eq!(links[0].href, "/x");
/// assert_eq!(links[0].text, "X");
/// ```
pub fn parse_links(html: &str) -> Vec<Link> {
    let document = Html::parse_document(html);
    let mut links = Vec::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            let href = element.value().attr("href").unwrap_or_default();
            if href.is_empty() {
                continue;
            }

            let text = element
                .first_child()
                .and_then(|node| node.value().as_text())
                .map(|text| text.to_string())
                .unwrap_or_default();

            links.push(Link::new(text, href));
        }
    }

    links
}
