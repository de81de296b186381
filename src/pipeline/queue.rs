//! Job queue and enqueue loop
//!
//! The queue is a bounded `mpsc` channel sized to hold every URL, so seeding
//! it never waits under normal operation. Workers share the single receiver.

use crate::pipeline::result::Job;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;

/// Creates a job queue able to hold `capacity` jobs
pub(crate) fn job_channel(capacity: usize) -> (mpsc::Sender<Job>, JobReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (
        tx,
        JobReceiver {
            inner: Arc::new(Mutex::new(rx)),
        },
    )
}

/// Receiving end of the job queue, shared by every worker
#[derive(Clone)]
pub(crate) struct JobReceiver {
    inner: Arc<Mutex<mpsc::Receiver<Job>>>,
}

impl JobReceiver {
    /// Waits for the next job
    ///
    /// Returns `None` once the queue is closed and drained, or as soon as
    /// `cancel` fires. Cancellation wins over a job that is already waiting.
    pub(crate) async fn next(&self, cancel: &CancellationToken) -> Option<Job> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            job = async { self.inner.lock().await.recv().await } => job,
        }
    }

    /// Removes every job still sitting in the queue
    pub(crate) async fn drain(&self) -> Vec<Job> {
        let mut rx = self.inner.lock().await;
        let mut left = Vec::new();
        while let Ok(job) = rx.try_recv() {
            left.push(job);
        }
        left
    }
}

/// What the enqueue loop managed to hand to the workers
#[derive(Debug, Default)]
pub(crate) struct EnqueueOutcome {
    pub enqueued: usize,
    /// URLs never offered because the token fired first
    pub dropped: Vec<String>,
}

/// Offers every URL to the queue in order, then closes it
///
/// Each offer races `cancel`; once it fires no further job is created and
/// the remaining URLs are returned as dropped. The sender is consumed, so the
/// queue is closed exactly once, after the last offer completed.
pub(crate) async fn enqueue_all(
    tx: mpsc::Sender<Job>,
    urls: Vec<String>,
    cancel: &CancellationToken,
) -> EnqueueOutcome {
    let mut outcome = EnqueueOutcome::default();
    let mut pending = urls.into_iter();

    while let Some(url) = pending.next() {
        let permit = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            permit = tx.reserve() => permit.ok(),
        };

        match permit {
            Some(permit) => {
                permit.send(Job::new(url));
                outcome.enqueued += 1;
            }
            None => {
                outcome.dropped.push(url);
                outcome.dropped.extend(pending.by_ref());
                break;
            }
        }
    }

    drop(tx);

    if !outcome.dropped.is_empty() {
        tracing::warn!(
            enqueued = outcome.enqueued,
            dropped = outcome.dropped.len(),
            "Context cancelled, stopped job submission"
        );
    }

    outcome
}
