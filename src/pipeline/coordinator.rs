//! Pipeline coordinator
//!
//! Owns the run deadline, starts the worker pool, seeds the job queue and
//! waits for the collector to see the results channel close.

use crate::config::{Config, PipelineConfig};
use crate::crawler::{build_http_client, Fetcher, HtmlLinkExtractor, HttpFetcher, LinkExtractor};
use crate::pipeline::collector::collect_results;
use crate::pipeline::queue::{enqueue_all, job_channel};
use crate::pipeline::report::Report;
use crate::pipeline::result::{Job, ScrapeResult};
use crate::pipeline::worker::{run_worker, WorkerContext};
use crate::storage::{LinkStore, SqliteLinkStore};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;

/// Worker count and deadline for one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineSettings {
    /// Number of concurrent workers; values below 1 are raised to 1
    pub workers: usize,

    /// Time after which in-flight work is cancelled and queued Jobs abandoned
    pub timeout: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self::from(&PipelineConfig::default())
    }
}

impl From<&PipelineConfig> for PipelineSettings {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            workers: config.workers.max(1),
            timeout: config.timeout(),
        }
    }
}

/// The fetch → parse → store pipeline
pub struct Pipeline {
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn LinkExtractor>,
    store: Arc<dyn LinkStore>,
    settings: PipelineSettings,
}

impl Pipeline {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        extractor: Arc<dyn LinkExtractor>,
        store: Arc<dyn LinkStore>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            store,
            settings,
        }
    }

    /// Builds the HTTP-backed pipeline described by `config`
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be constructed.
    pub fn from_config(config: &Config, store: SqliteLinkStore) -> Result<Self, reqwest::Error> {
        let client = build_http_client(&config.user_agent, config.pipeline.fetch_timeout())?;

        Ok(Self::new(
            Arc::new(HttpFetcher::new(client)),
            Arc::new(HtmlLinkExtractor::new(config.pipeline.max_body_bytes)),
            Arc::new(store),
            PipelineSettings::from(&config.pipeline),
        ))
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Processes `urls` under the configured deadline
    pub async fn run(&self, urls: Vec<String>) -> Report {
        self.run_until(urls, &CancellationToken::new()).await
    }

    /// Processes `urls` until done, the deadline passes, or `shutdown` fires
    ///
    /// Every URL ends up either as exactly one result in the report or in
    /// [`Report::not_attempted`].
    pub async fn run_until(&self, urls: Vec<String>, shutdown: &CancellationToken) -> Report {
        let started = Instant::now();
        let total = urls.len();
        let workers = self.settings.workers.max(1);

        let cancel = shutdown.child_token();
        let _cancel_on_return = cancel.clone().drop_guard();
        let deadline = spawn_deadline(cancel.clone(), self.settings.timeout);

        tracing::info!(
            urls = total,
            workers,
            timeout = ?self.settings.timeout,
            "Starting pipeline"
        );

        let (job_tx, jobs) = job_channel(total);
        let (result_tx, result_rx) = mpsc::channel(total.max(1));

        let mut pool = JoinSet::new();
        for id in 0..workers {
            let ctx = WorkerContext {
                fetcher: Arc::clone(&self.fetcher),
                extractor: Arc::clone(&self.extractor),
                store: Arc::clone(&self.store),
                jobs: jobs.clone(),
                results: result_tx.clone(),
                cancel: cancel.clone(),
            };
            pool.spawn(run_worker(id, ctx));
        }

        let submitted = enqueue_all(job_tx, urls, &cancel).await;
        let barrier = tokio::spawn(join_workers(pool, result_tx));

        let mut report = collect_results(result_rx).await;
        deadline.abort();

        match barrier.await {
            Ok(processed) if processed != report.total_results() => {
                tracing::error!(
                    processed,
                    results = report.total_results(),
                    "Worker job count does not match collected results"
                );
            }
            Ok(_) => {}
            Err(e) => tracing::error!(error = %e, "Join barrier task failed"),
        }

        let abandoned = jobs.drain().await;
        if !abandoned.is_empty() {
            tracing::warn!(abandoned = abandoned.len(), "Jobs left in queue after cancellation");
        }

        report.not_attempted = submitted.dropped;
        report
            .not_attempted
            .extend(abandoned.into_iter().map(Job::into_url));
        report.elapsed = started.elapsed();

        if cancel.is_cancelled() && !shutdown.is_cancelled() {
            tracing::warn!(timeout = ?self.settings.timeout, "Pipeline deadline exceeded");
        }
        tracing::info!(
            elapsed = ?report.elapsed,
            "Pipeline finished: {}",
            report.counts()
        );

        report
    }
}

/// Cancels `cancel` once `timeout` elapses
fn spawn_deadline(cancel: CancellationToken, timeout: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            _ = cancel.cancelled() => {}
            _ = tokio::time::sleep(timeout) => cancel.cancel(),
        }
    })
}

/// Waits for every worker, then closes the results channel
///
/// `results` is the last sender not owned by a worker, so dropping it here
/// means the collector sees the channel close only after all workers exited.
async fn join_workers(mut pool: JoinSet<usize>, results: mpsc::Sender<ScrapeResult>) -> usize {
    let mut processed = 0;

    while let Some(joined) = pool.join_next().await {
        match joined {
            Ok(count) => processed += count,
            Err(e) => tracing::error!(error = %e, "Worker task failed"),
        }
    }

    drop(results);
    processed
}
