//! Aggregated outcome of one pipeline run

use crate::pipeline::result::{OutcomeKind, ScrapeResult};
use std::fmt;
use std::time::Duration;

/// All results of a run, partitioned by outcome
///
/// Built by the collector after the results channel closed and read-only
/// afterwards. URLs that never produced a result (dropped before being
/// enqueued, or left in the queue when the deadline fired) are listed in
/// `not_attempted`.
#[derive(Debug, Default)]
pub struct Report {
    pub successes: Vec<ScrapeResult>,
    pub fetch_failures: Vec<ScrapeResult>,
    pub parse_failures: Vec<ScrapeResult>,
    pub validation_failures: Vec<ScrapeResult>,
    pub storage_failures: Vec<ScrapeResult>,
    pub unclassified_failures: Vec<ScrapeResult>,
    pub not_attempted: Vec<String>,
    pub elapsed: Duration,
}

impl Report {
    /// Files a result under its outcome kind
    pub fn record(&mut self, result: ScrapeResult) {
        let bucket = match result.kind() {
            OutcomeKind::Success => &mut self.successes,
            OutcomeKind::FetchFailure => &mut self.fetch_failures,
            OutcomeKind::ParseFailure => &mut self.parse_failures,
            OutcomeKind::ValidationFailure => &mut self.validation_failures,
            OutcomeKind::StorageFailure => &mut self.storage_failures,
            OutcomeKind::Unclassified => &mut self.unclassified_failures,
        };
        bucket.push(result);
    }

    pub fn bucket(&self, kind: OutcomeKind) -> &[ScrapeResult] {
        match kind {
            OutcomeKind::Success => &self.successes,
            OutcomeKind::FetchFailure => &self.fetch_failures,
            OutcomeKind::ParseFailure => &self.parse_failures,
            OutcomeKind::ValidationFailure => &self.validation_failures,
            OutcomeKind::StorageFailure => &self.storage_failures,
            OutcomeKind::Unclassified => &self.unclassified_failures,
        }
    }

    /// Number of results received, one per dequeued Job
    pub fn total_results(&self) -> usize {
        OutcomeKind::ALL
            .into_iter()
            .map(|kind| self.bucket(kind).len())
            .sum()
    }

    /// Results plus URLs that were never attempted
    pub fn total_urls(&self) -> usize {
        self.total_results() + self.not_attempted.len()
    }

    /// Every failed result, grouped by kind
    pub fn failures(&self) -> impl Iterator<Item = &ScrapeResult> {
        OutcomeKind::ALL
            .into_iter()
            .filter(|kind| *kind != OutcomeKind::Success)
            .flat_map(move |kind| self.bucket(kind).iter())
    }

    /// Links stored across all successful pages
    pub fn links_stored(&self) -> usize {
        self.successes.iter().map(|r| r.links().len()).sum()
    }

    pub fn counts(&self) -> OutcomeCounts {
        OutcomeCounts {
            succeeded: self.successes.len(),
            fetch_failed: self.fetch_failures.len(),
            parse_failed: self.parse_failures.len(),
            validation_failed: self.validation_failures.len(),
            storage_failed: self.storage_failures.len(),
            unclassified: self.unclassified_failures.len(),
            not_attempted: self.not_attempted.len(),
        }
    }
}

/// Bucket sizes of a [`Report`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutcomeCounts {
    pub succeeded: usize,
    pub fetch_failed: usize,
    pub parse_failed: usize,
    pub validation_failed: usize,
    pub storage_failed: usize,
    pub unclassified: usize,
    pub not_attempted: usize,
}

impl OutcomeCounts {
    pub fn failed(&self) -> usize {
        self.fetch_failed
            + self.parse_failed
            + self.validation_failed
            + self.storage_failed
            + self.unclassified
    }
}

impl fmt::Display for OutcomeCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} succeeded, {} failed (fetch {}, parse {}, validation {}, database {}, unhandled {}), {} not attempted",
            self.succeeded,
            self.failed(),
            self.fetch_failed,
            self.parse_failed,
            self.validation_failed,
            self.storage_failed,
            self.unclassified,
            self.not_attempted
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::Link;
    use crate::{FetchError, ParseError, ScrapeError};

    fn sample_report() -> Report {
        let mut report = Report::default();
        report.record(ScrapeResult::success(
            "http://ok.test/a",
            vec![Link::new("X", "/x"), Link::new("Y", "/y")],
        ));
        report.record(ScrapeResult::success("http://ok.test/b", vec![]));
        report.record(ScrapeResult::failure(
            "http://ok.test/404",
            FetchError::new("http://ok.test/404", "unexpected HTTP status").with_status(404),
        ));
        report.record(ScrapeResult::failure(
            "http://ok.test/bad",
            ParseError::new("http://ok.test/bad", "document is not valid UTF-8"),
        ));
        report.record(ScrapeResult::failure(
            "http://ok.test/odd",
            ScrapeError::Unclassified {
                url: "http://ok.test/odd".to_string(),
                message: "boom".to_string(),
            },
        ));
        report.not_attempted.push("http://ok.test/late".to_string());
        report
    }

    #[test]
    fn test_record_sorts_into_buckets() {
        let report = sample_report();
        assert_eq!(report.successes.len(), 2);
        assert_eq!(report.fetch_failures.len(), 1);
        assert_eq!(report.parse_failures.len(), 1);
        assert_eq!(report.unclassified_failures.len(), 1);
        assert!(report.storage_failures.is_empty());
        assert!(report.validation_failures.is_empty());
    }

    #[test]
    fn test_totals() {
        let report = sample_report();
        assert_eq!(report.total_results(), 5);
        assert_eq!(report.total_urls(), 6);
        assert_eq!(report.links_stored(), 2);
        assert_eq!(report.failures().count(), 3);
    }

    #[test]
    fn test_counts_display() {
        let counts = sample_report().counts();
        assert_eq!(counts.failed(), 3);
        assert_eq!(
            counts.to_string(),
            "2 succeeded, 3 failed (fetch 1, parse 1, validation 0, database 0, unhandled 1), 1 not attempted"
        );
    }
}
