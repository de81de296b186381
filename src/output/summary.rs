//! Operator-facing rendering of a [`Report`]

use crate::pipeline::{OutcomeKind, Report};
use std::fmt::Write;

/// Renders the report as plain text
///
/// Failures are grouped by kind, each line carrying the full error chain
/// message. Not-attempted URLs are listed last.
pub fn format_report(report: &Report) -> String {
    let mut out = String::new();
    let counts = report.counts();

    let _ = writeln!(out, "=== Scrape Report ===\n");
    let _ = writeln!(out, "Overview:");
    let _ = writeln!(out, "  URLs submitted: {}", report.total_urls());
    let _ = writeln!(out, "  {}", counts);
    let _ = writeln!(out, "  Links stored: {}", report.links_stored());
    let _ = writeln!(out, "  Elapsed: {:.2?}", report.elapsed);

    if !report.successes.is_empty() {
        let _ = writeln!(out, "\nSucceeded ({}):", report.successes.len());
        for result in &report.successes {
            let _ = writeln!(out, "  - {} ({} links)", result.url, result.links().len());
        }
    }

    for kind in OutcomeKind::ALL {
        if kind == OutcomeKind::Success {
            continue;
        }
        let bucket = report.bucket(kind);
        if bucket.is_empty() {
            continue;
        }

        let _ = writeln!(out, "\n{} ({}):", capitalize(kind.label()), bucket.len());
        for result in bucket {
            if let Some(err) = result.error() {
                let marker = if err.is_timeout() { " [timeout]" } else { "" };
                let _ = writeln!(out, "  - {}{}", err, marker);
            }
        }
    }

    if !report.not_attempted.is_empty() {
        let _ = writeln!(out, "\nNot attempted ({}):", report.not_attempted.len());
        for url in &report.not_attempted {
            let _ = writeln!(out, "  - {}", url);
        }
    }

    out
}

/// Prints the report to stdout
pub fn print_report(report: &Report) {
    print!("{}", format_report(report));
}

fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
