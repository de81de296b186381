//! linkscrape: a concurrent link harvester
//!
//! This crate fetches a list of pages through a bounded worker pool, extracts
//! the hyperlinks found in each page and persists them to SQLite. Every
//! submitted URL ends up in exactly one bucket of the final
//! [`pipeline::Report`].

pub mod config;
pub mod crawler;
pub mod output;
pub mod pipeline;
pub mod storage;

use std::error::Error as StdError;
use std::fmt;
use std::io;
use thiserror::Error;

pub use pipeline::OutcomeKind;
pub use storage::StorageError;

/// Boxed underlying cause carried by fetch and parse errors
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Classified failure of a single Job
///
/// The variant records which stage failed; the original library or system
/// error stays reachable through [`std::error::Error::source`].
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("database insertion failed for {url}: {source}")]
    Storage {
        url: String,
        #[source]
        source: StorageError,
    },

    #[error("unclassified failure for {url}: {message}")]
    Unclassified { url: String, message: String },
}

impl ScrapeError {
    /// Returns the report bucket this error belongs to
    pub fn kind(&self) -> OutcomeKind {
        match self {
            Self::Fetch(_) => OutcomeKind::FetchFailure,
            Self::Parse(_) => OutcomeKind::ParseFailure,
            Self::Validation(_) => OutcomeKind::ValidationFailure,
            Self::Storage { .. } => OutcomeKind::StorageFailure,
            Self::Unclassified { .. } => OutcomeKind::Unclassified,
        }
    }

    /// Returns true if a timeout or the pipeline deadline is anywhere in the cause chain
    pub fn is_timeout(&self) -> bool {
        if let Self::Fetch(err) = self {
            if err.is_cancelled() {
                return true;
            }
        }

        let mut current: Option<&(dyn StdError + 'static)> = self.source();
        while let Some(err) = current {
            if is_timeout_error(err) {
                return true;
            }
            current = err.source();
        }
        false
    }
}

fn is_timeout_error(err: &(dyn StdError + 'static)) -> bool {
    if err.is::<DeadlineExceeded>() {
        return true;
    }
    if let Some(e) = err.downcast_ref::<reqwest::Error>() {
        return e.is_timeout();
    }
    if let Some(e) = err.downcast_ref::<io::Error>() {
        if e.kind() == io::ErrorKind::TimedOut {
            return true;
        }
        return e
            .get_ref()
            .map(|inner| is_timeout_error(inner))
            .unwrap_or(false);
    }
    false
}

/// Cause attached to operations stopped by the pipeline deadline or a shutdown request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("pipeline deadline exceeded")]
pub struct DeadlineExceeded;

/// Failure to obtain a response body for a URL
#[derive(Debug)]
pub struct FetchError {
    pub url: String,
    /// HTTP status code, or 0 if no HTTP response was received
    pub status_code: u16,
    pub reason: String,
    pub source: Option<BoxError>,
}

impl FetchError {
    pub fn new(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status_code: 0,
            reason: reason.into(),
            source: None,
        }
    }

    pub fn with_status(mut self, status_code: u16) -> Self {
        self.status_code = status_code;
        self
    }

    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// True if the fetch was stopped by the pipeline context
    pub fn is_cancelled(&self) -> bool {
        self.source
            .as_deref()
            .map(|e| e.is::<DeadlineExceeded>())
            .unwrap_or(false)
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.status_code != 0 {
            write!(
                f,
                "failed to fetch {} (status {}): {}",
                self.url, self.status_code, self.reason
            )?;
        } else {
            write!(f, "failed to fetch {}: {}", self.url, self.reason)?;
        }
        if let Some(source) = &self.source {
            write!(f, ": {}", source)?;
        }
        Ok(())
    }
}

impl StdError for FetchError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn StdError + 'static))
    }
}

/// Failure to turn a response body into links
#[derive(Debug)]
pub struct ParseError {
    pub url: String,
    pub reason: String,
    pub source: Option<BoxError>,
}

impl ParseError {
    pub fn new(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            reason: reason.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse HTML from {}: {}", self.url, self.reason)?;
        if let Some(source) = &self.source {
            write!(f, ": {}", source)?;
        }
        Ok(())
    }
}

impl StdError for ParseError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn StdError + 'static))
    }
}

/// Invalid input, such as a malformed seed URL
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("validation failed for field '{field}' (value '{value}'): {constraint}")]
pub struct ValidationError {
    pub field: String,
    pub value: String,
    pub constraint: String,
}

impl ValidationError {
    pub fn new(
        field: impl Into<String>,
        value: impl Into<String>,
        constraint: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            constraint: constraint.into(),
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{ByteStream, Fetcher, HtmlLinkExtractor, HttpFetcher, Link, LinkExtractor};
pub use pipeline::{Pipeline, PipelineSettings, Report, ScrapeResult};
pub use storage::{LinkStore, SqliteLinkStore};
