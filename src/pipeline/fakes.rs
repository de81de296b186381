//! In-memory collaborators for pipeline tests

use crate::crawler::{ByteStream, Fetcher, HtmlLinkExtractor, Link, LinkExtractor};
use crate::storage::{LinkStore, StorageError, StorageResult};
use crate::{DeadlineExceeded, FetchError, ParseError};
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::Stream;
use std::collections::{HashMap, HashSet};
use std::io;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub(crate) const PAGE: &str = r#"<html><body><a href="/x">X</a></body></html>"#;

/// Single-chunk body that counts how often it was dropped
struct ProbedBody {
    chunk: Option<Bytes>,
    released: Arc<AtomicUsize>,
}

impl Stream for ProbedBody {
    type Item = io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Poll::Ready(self.chunk.take().map(Ok))
    }
}

impl Drop for ProbedBody {
    fn drop(&mut self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

/// Serves [`PAGE`] for every URL except the ones told to fail
#[derive(Default)]
pub(crate) struct ScriptedFetcher {
    pub not_found: HashSet<String>,
    pub delay: Option<Duration>,
    pub calls: AtomicUsize,
    pub released: Arc<AtomicUsize>,
}

impl ScriptedFetcher {
    pub fn failing(urls: &[&str]) -> Self {
        Self {
            not_found: urls.iter().map(|u| u.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str, cancel: &CancellationToken) -> Result<ByteStream, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::select! {
                _ = cancel.cancelled() => {
                    return Err(FetchError::new(url, "cancelled before response").with_source(DeadlineExceeded));
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }

        if self.not_found.contains(url) {
            return Err(FetchError::new(url, "unexpected HTTP status").with_status(404));
        }

        let body = ProbedBody {
            chunk: Some(Bytes::from_static(PAGE.as_bytes())),
            released: Arc::clone(&self.released),
        };
        Ok(ByteStream::from_stream(url, body, cancel.clone()))
    }
}

/// Real HTML extraction, except for URLs scripted to fail or panic
#[derive(Default)]
pub(crate) struct ScriptedExtractor {
    pub fail: HashSet<String>,
    pub panic: HashSet<String>,
    pub calls: AtomicUsize,
}

impl ScriptedExtractor {
    pub fn failing(urls: &[&str]) -> Self {
        Self {
            fail: urls.iter().map(|u| u.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn panicking(urls: &[&str]) -> Self {
        Self {
            panic: urls.iter().map(|u| u.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LinkExtractor for ScriptedExtractor {
    async fn extract_links(
        &self,
        body: ByteStream,
        source_url: &str,
    ) -> Result<Vec<Link>, ParseError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.panic.contains(source_url) {
            panic!("extractor blew up on {}", source_url);
        }
        if self.fail.contains(source_url) {
            return Err(ParseError::new(source_url, "failed to parse HTML document"));
        }

        HtmlLinkExtractor::default()
            .extract_links(body, source_url)
            .await
    }
}

/// Keeps links in a map; records how many bodies were released at store time
#[derive(Default)]
pub(crate) struct MemoryStore {
    pub fail: HashSet<String>,
    pub rows: Mutex<HashMap<String, Vec<Link>>>,
    pub calls: AtomicUsize,
    pub released_probe: Option<Arc<AtomicUsize>>,
    pub released_at_store: Mutex<Vec<usize>>,
}

impl MemoryStore {
    pub fn failing(urls: &[&str]) -> Self {
        Self {
            fail: urls.iter().map(|u| u.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn stored(&self, url: &str) -> usize {
        self.rows
            .lock()
            .unwrap()
            .get(url)
            .map(|links| links.len())
            .unwrap_or(0)
    }
}

#[async_trait]
impl LinkStore for MemoryStore {
    async fn ensure_schema(&self) -> StorageResult<()> {
        Ok(())
    }

    async fn store_links(&self, url: &str, links: &[Link]) -> StorageResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(probe) = &self.released_probe {
            self.released_at_store
                .lock()
                .unwrap()
                .push(probe.load(Ordering::SeqCst));
        }

        if self.fail.contains(url) {
            return Err(StorageError::Poisoned);
        }

        self.rows
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .extend_from_slice(links);
        Ok(())
    }
}
