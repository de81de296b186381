//! Statistics from the link database
//!
//! This module provides functionality for extracting and displaying
//! what previous runs stored, used by the `--stats` mode.

use crate::storage::{SqliteLinkStore, StorageResult};

/// Stored link summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkStatistics {
    /// Total number of stored links
    pub total_links: u64,

    /// Links per scraped page, busiest first
    pub links_by_url: Vec<(String, u64)>,
}

impl LinkStatistics {
    /// Number of pages with at least one stored link
    pub fn pages(&self) -> usize {
        self.links_by_url.len()
    }
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `store` - The link store to query
///
/// # Returns
///
/// * `Ok(LinkStatistics)` - Successfully loaded statistics
/// * `Err(StorageError)` - Failed to query statistics
pub fn load_statistics(store: &SqliteLinkStore) -> StorageResult<LinkStatistics> {
    Ok(LinkStatistics {
        total_links: store.count_links()?,
        links_by_url: store.link_counts_by_url()?,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &LinkStatistics) {
    println!("=== Link Statistics ===\n");

    println!("Overview:");
    println!("  Pages with links: {}", stats.pages());
    println!("  Total links stored: {}", stats.total_links);
    println!();

    if stats.links_by_url.is_empty() {
        println!("No links stored yet.");
        return;
    }

    println!("Links by Page:");
    for (url, count) in &stats.links_by_url {
        let percentage = if stats.total_links > 0 {
            (*count as f64 / stats.total_links as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", url, count, percentage);
    }
}
