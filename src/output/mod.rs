//! Output module for crawl reports and statistics
//!
//! This module handles:
//! - Collecting outcomes into a crawl report
//! - Printing per-URL report lines and summary statistics
//! - Exporting the report as JSON

mod report;
pub mod stats;

pub use report::{format_outcome, print_report, CrawlReport};
pub use stats::{print_statistics, CrawlStatistics};
