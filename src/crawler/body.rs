//! Response body handle passed from the fetcher to the link extractor

use crate::DeadlineExceeded;
use bytes::Bytes;
use futures_util::stream::{self, BoxStream, Stream, StreamExt};
use std::fmt;
use std::io;
use tokio_util::sync::CancellationToken;

/// An owned, readable response body
///
/// Reading honours the pipeline's cancellation token: once it fires, the next
/// read fails with [`io::ErrorKind::TimedOut`]. The underlying connection is
/// released when the value is dropped, so whoever owns the stream decides
/// how long the connection stays open.
pub struct ByteStream {
    url: String,
    inner: BoxStream<'static, io::Result<Bytes>>,
    cancel: CancellationToken,
}

impl ByteStream {
    /// Wraps an arbitrary chunk stream
    pub fn from_stream<S>(url: impl Into<String>, stream: S, cancel: CancellationToken) -> Self
    where
        S: Stream<Item = io::Result<Bytes>> + Send + 'static,
    {
        Self {
            url: url.into(),
            inner: stream.boxed(),
            cancel,
        }
    }

    /// Streams the body of an HTTP response
    pub fn from_response(
        url: impl Into<String>,
        response: reqwest::Response,
        cancel: CancellationToken,
    ) -> Self {
        let chunks = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| io::Error::new(io::ErrorKind::Other, e)));
        Self::from_stream(url, chunks, cancel)
    }

    /// A body that is already fully in memory
    pub fn from_bytes(url: impl Into<String>, body: impl Into<Bytes>) -> Self {
        let body = body.into();
        Self::from_stream(
            url,
            stream::iter(std::iter::once(Ok(body))),
            CancellationToken::new(),
        )
    }

    /// The URL this body was fetched from
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Reads the next chunk, or `None` at end of body
    pub async fn next_chunk(&mut self) -> Option<io::Result<Bytes>> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                Some(Err(io::Error::new(io::ErrorKind::TimedOut, DeadlineExceeded)))
            }
            chunk = self.inner.next() => chunk,
        }
    }
}

impl fmt::Debug for ByteStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteStream")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

impl Drop for ByteStream {
    fn drop(&mut self) {
        tracing::trace!(url = %self.url, "Response body released");
    }
}
