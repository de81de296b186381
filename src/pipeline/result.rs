//! Jobs and their classified outcomes

use crate::crawler::Link;
use crate::ScrapeError;
use std::fmt;

/// A URL waiting to be processed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    url: String,
}

impl Job {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn into_url(self) -> String {
        self.url
    }
}

/// Report bucket a processed Job falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeKind {
    Success,
    FetchFailure,
    ParseFailure,
    ValidationFailure,
    StorageFailure,
    Unclassified,
}

impl OutcomeKind {
    pub const ALL: [OutcomeKind; 6] = [
        OutcomeKind::Success,
        OutcomeKind::FetchFailure,
        OutcomeKind::ParseFailure,
        OutcomeKind::ValidationFailure,
        OutcomeKind::StorageFailure,
        OutcomeKind::Unclassified,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::FetchFailure => "fetch error",
            Self::ParseFailure => "parse error",
            Self::ValidationFailure => "validation error",
            Self::StorageFailure => "database error",
            Self::Unclassified => "unhandled error",
        }
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of processing one Job
///
/// Links are only present when they were durably stored; a failure at any
/// stage carries the error and no links.
#[derive(Debug)]
pub struct ScrapeResult {
    pub url: String,
    pub outcome: Result<Vec<Link>, ScrapeError>,
}

impl ScrapeResult {
    pub fn new(url: impl Into<String>, outcome: Result<Vec<Link>, ScrapeError>) -> Self {
        Self {
            url: url.into(),
            outcome,
        }
    }

    pub fn success(url: impl Into<String>, links: Vec<Link>) -> Self {
        Self::new(url, Ok(links))
    }

    pub fn failure(url: impl Into<String>, error: impl Into<ScrapeError>) -> Self {
        Self::new(url, Err(error.into()))
    }

    pub fn kind(&self) -> OutcomeKind {
        match &self.outcome {
            Ok(_) => OutcomeKind::Success,
            Err(err) => err.kind(),
        }
    }

    /// Stored links; empty for failures
    pub fn links(&self) -> &[Link] {
        match &self.outcome {
            Ok(links) => links,
            Err(_) => &[],
        }
    }

    pub fn error(&self) -> Option<&ScrapeError> {
        self.outcome.as_ref().err()
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}
