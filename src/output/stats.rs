//! Statistics aggregated from crawl outcomes
//!
//! This module provides functionality for summarizing the outcomes of a
//! crawl and displaying the summary.

use crate::state::FetchOutcome;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CrawlStatistics {
    /// Total number of URLs with an outcome
    pub total_urls: u64,

    /// Outcomes that received a response
    pub successes: u64,

    /// Outcomes that carry a failure description
    pub failures: u64,

    /// Outcomes that point to a redirect target
    pub redirects: u64,

    /// Total body bytes read
    pub total_bytes: u64,

    /// Total in-scope links found across pages
    pub total_links: u64,

    /// Links not seen before their page was parsed
    pub new_links: u64,

    /// Count of outcomes by HTTP status
    pub by_status: HashMap<u16, u64>,

    /// Count of outcomes by content type
    pub by_content_type: HashMap<String, u64>,
}

impl CrawlStatistics {
    /// Aggregates a list of outcomes
    pub fn from_outcomes(outcomes: &[FetchOutcome]) -> Self {
        let mut stats = Self::default();

        for outcome in outcomes {
            stats.total_urls += 1;

            if outcome.is_success() {
                stats.successes += 1;
            }
            if outcome.failure().is_some() {
                stats.failures += 1;
            }
            if outcome.is_redirect() {
                stats.redirects += 1;
            }

            stats.total_bytes += outcome.size() as u64;
            stats.total_links += outcome.link_count() as u64;
            stats.new_links += outcome.new_link_count() as u64;

            if let Some(status) = outcome.status() {
                *stats.by_status.entry(status).or_insert(0) += 1;
            }
            if let Some(content_type) = outcome.content_type() {
                *stats
                    .by_content_type
                    .entry(content_type.to_string())
                    .or_insert(0) += 1;
            }
        }

        stats
    }

    /// Percentage of URLs that received a response
    pub fn success_rate(&self) -> f64 {
        if self.total_urls > 0 {
            (self.successes as f64 / self.total_urls as f64) * 100.0
        } else {
            0.0
        }
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Total URLs: {}", stats.total_urls);
    println!("  Redirects: {}", stats.redirects);
    println!("  Failures: {}", stats.failures);
    println!("  Bytes read: {}", stats.total_bytes);
    println!(
        "  Links found: {} ({} new)",
        stats.total_links, stats.new_links
    );
    println!();

    if !stats.by_status.is_empty() {
        println!("URLs by Status:");
        // Ordered by status code
        let status_counts: BTreeMap<_, _> = stats.by_status.iter().collect();

        for (status, count) in status_counts {
            let percentage = (*count as f64 / stats.total_urls as f64) * 100.0;
            println!("  {}: {} ({:.1}%)", status, count, percentage);
        }
        println!();
    }

    if !stats.by_content_type.is_empty() {
        println!("URLs by Content Type:");
        let mut type_counts: Vec<_> = stats.by_content_type.iter().collect();
        type_counts.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

        for (content_type, count) in type_counts {
            println!("  {}: {}", content_type, count);
        }
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} / {} URLs answered)",
        stats.success_rate(),
        stats.successes,
        stats.total_urls
    );
}
