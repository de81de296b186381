//! Fetching and link extraction
//!
//! This module contains the two leaf collaborators of the scrape pipeline:
//! - [`Fetcher`]: turns a URL into a response body ([`ByteStream`])
//! - [`LinkExtractor`]: turns a response body into [`Link`] records
//!
//! Both are object-safe traits so the pipeline can be driven by fakes in tests.

mod body;
mod fetcher;
mod parser;

pub use body::ByteStream;
pub use fetcher::{build_http_client, Fetcher, HttpFetcher};
pub use parser::{parse_links, HtmlLinkExtractor, Link, LinkExtractor};
