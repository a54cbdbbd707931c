//! Crawl report: the outcomes of one crawl and how long it took

use crate::output::stats::{print_statistics, CrawlStatistics};
use crate::state::FetchOutcome;
use serde::Serialize;
use std::time::Duration;

/// Everything a finished crawl produced
#[derive(Debug, Clone, Default, Serialize)]
pub struct CrawlReport {
    /// Outcomes in completion order
    outcomes: Vec<FetchOutcome>,

    /// Wall-clock time of the crawl
    #[serde(rename = "elapsed_secs", serialize_with = "serialize_secs")]
    elapsed: Duration,
}

fn serialize_secs<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}

impl CrawlReport {
    pub fn new(outcomes: Vec<FetchOutcome>, elapsed: Duration) -> Self {
        Self { outcomes, elapsed }
    }

    pub fn outcomes(&self) -> &[FetchOutcome] {
        &self.outcomes
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Finds the outcome recorded for a URL
    pub fn outcome_for(&self, url: &str) -> Option<&FetchOutcome> {
        self.outcomes.iter().find(|o| o.url() == url)
    }

    pub fn statistics(&self) -> CrawlStatistics {
        CrawlStatistics::from_outcomes(&self.outcomes)
    }

    /// Serializes the report as pretty-printed JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Formats one outcome as a single report line
///
/// Failures show the error in place of the status; redirects end with the
/// target.
pub fn format_outcome(outcome: &FetchOutcome) -> String {
    let mut line = match (outcome.status(), outcome.failure()) {
        (_, Some(failure)) => format!("{} failed: {}", outcome.url(), failure),
        (Some(status), None) => format!(
            "{} [{}] {} bytes, {} links ({} new)",
            outcome.url(),
            status,
            outcome.size(),
            outcome.link_count(),
            outcome.new_link_count()
        ),
        (None, None) => outcome.url().to_string(),
    };

    if let Some(content_type) = outcome.content_type() {
        line.push_str(&format!(" {}", content_type));
        if let Some(encoding) = outcome.encoding() {
            line.push_str(&format!("; {}", encoding));
        }
    }

    if let Some(next_url) = outcome.next_url() {
        line.push_str(&format!(" -> {}", next_url));
    }

    line
}

/// Prints every outcome followed by the statistics summary
pub fn print_report(report: &CrawlReport) {
    println!("=== Crawl Report ===\n");

    for outcome in report.outcomes() {
        println!("  {}", format_outcome(outcome));
    }
    println!();

    print_statistics(&report.statistics());
    println!("Finished in {:.2}s", report.elapsed().as_secs_f64());
}
