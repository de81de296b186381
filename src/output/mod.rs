//! Output module for presenting scrape results
//!
//! This module handles:
//! - Rendering the per-run [`crate::pipeline::Report`] for the operator
//! - Summarising what is already stored in the link database

pub mod stats;
mod summary;

pub use stats::{load_statistics, print_statistics, LinkStatistics};
pub use summary::{format_report, print_report};
