//! Worker loop: fetch, extract, store, report
//!
//! Each worker pulls one Job at a time and runs the three stages in order.
//! The first failing stage decides the outcome and later stages are skipped.
//! Exactly one [`ScrapeResult`] is sent for every dequeued Job.

use crate::crawler::{Fetcher, Link, LinkExtractor};
use crate::pipeline::queue::JobReceiver;
use crate::pipeline::result::{Job, ScrapeResult};
use crate::storage::LinkStore;
use crate::ScrapeError;
use futures_util::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Everything a worker needs, cloned once per worker
#[derive(Clone)]
pub(crate) struct WorkerContext {
    pub fetcher: Arc<dyn Fetcher>,
    pub extractor: Arc<dyn LinkExtractor>,
    pub store: Arc<dyn LinkStore>,
    pub jobs: JobReceiver,
    pub results: mpsc::Sender<ScrapeResult>,
    pub cancel: CancellationToken,
}

/// Runs one worker until the queue is drained or the context is cancelled
///
/// Returns the number of Jobs this worker processed.
pub(crate) async fn run_worker(id: usize, ctx: WorkerContext) -> usize {
    tracing::info!(worker = id, "Worker started");
    let mut processed = 0;

    while let Some(job) = ctx.jobs.next(&ctx.cancel).await {
        let result = process_job_guarded(&ctx, &job).await;
        processed += 1;

        if ctx.results.send(result).await.is_err() {
            tracing::error!(worker = id, url = job.url(), "Results channel closed, dropping result");
            break;
        }
    }

    tracing::info!(worker = id, processed, "Worker finished");
    processed
}

/// Processes a Job, turning a panic in any stage into an unclassified failure
async fn process_job_guarded(ctx: &WorkerContext, job: &Job) -> ScrapeResult {
    let outcome = AssertUnwindSafe(process_job(ctx, job.url()))
        .catch_unwind()
        .await
        .unwrap_or_else(|panic| {
            Err(ScrapeError::Unclassified {
                url: job.url().to_string(),
                message: format!("worker panicked: {}", panic_message(panic.as_ref())),
            })
        });

    ScrapeResult::new(job.url(), outcome)
}

async fn process_job(ctx: &WorkerContext, url: &str) -> Result<Vec<Link>, ScrapeError> {
    let body = ctx.fetcher.fetch(url, &ctx.cancel).await?;

    // The extractor owns the body; it is released when this call returns
    let links = ctx.extractor.extract_links(body, url).await?;

    ctx.store
        .store_links(url, &links)
        .await
        .map_err(|source| ScrapeError::Storage {
            url: url.to_string(),
            source,
        })?;

    Ok(links)
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic payload"
    }
}
