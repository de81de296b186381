//! Result collector
//!
//! Drains the results channel until every sender is gone. The coordinator
//! keeps no sender of its own; the last one is dropped by the join barrier
//! once all workers have exited.

use crate::pipeline::report::Report;
use crate::pipeline::result::ScrapeResult;
use tokio::sync::mpsc;

/// Receives every result and files it into a [`Report`]
pub(crate) async fn collect_results(mut results: mpsc::Receiver<ScrapeResult>) -> Report {
    let mut report = Report::default();

    while let Some(result) = results.recv().await {
        log_outcome(&result);
        report.record(result);
    }

    report
}

fn log_outcome(result: &ScrapeResult) {
    match result.error() {
        None => {
            tracing::info!(
                url = %result.url,
                links = result.links().len(),
                "Scraped and stored links"
            );
        }
        Some(err) => {
            tracing::warn!(
                url = %result.url,
                kind = %err.kind(),
                timeout = err.is_timeout(),
                "{}",
                err
            );
        }
    }
}
