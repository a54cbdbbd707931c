//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry logic
//! - Response parsing and link extraction
//! - Separating new links from seen ones
//! - Overall crawl coordination

mod coordinator;
mod dedup;
mod fetcher;
mod parser;

pub use coordinator::{run_crawl, Coordinator};
pub use dedup::{difference, SeenFilter};
pub use fetcher::{build_http_client, FetchReply, Fetcher};
pub use parser::{decode_body, parse_content_type, FetchedPage, ResponseParser};

use crate::config::Config;
use crate::output::CrawlReport;
use crate::CrawlError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the crawl scope from the roots
/// 2. Build the HTTP client
/// 3. Fetch pages and follow redirects
/// 4. Extract in-scope links and queue the new ones
/// 5. Collect every outcome into a report
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl ran to completion
/// * `Err(CrawlError)` - The crawl could not be set up
pub async fn crawl(config: &Config) -> Result<CrawlReport, CrawlError> {
    run_crawl(config).await
}
