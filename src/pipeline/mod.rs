//! Concurrent fetch → parse → store pipeline
//!
//! The [`Pipeline`] wires four pieces together:
//! - a bounded job queue seeded once with every URL ([`queue`])
//! - a fixed pool of workers, each running fetch, extract and store for one
//!   URL at a time and emitting exactly one [`ScrapeResult`] ([`worker`])
//! - a join barrier that closes the results channel once every worker exited
//! - a collector that sorts results into the [`Report`] buckets ([`collector`])
//!
//! A single [`tokio_util::sync::CancellationToken`] carries the run deadline.
//! Workers and the enqueue loop only read it.

mod collector;
mod coordinator;
mod queue;
mod report;
mod result;
mod worker;

#[cfg(test)]
mod fakes;

pub use coordinator::{Pipeline, PipelineSettings};
pub use report::{OutcomeCounts, Report};
pub use result::{Job, OutcomeKind, ScrapeResult};
