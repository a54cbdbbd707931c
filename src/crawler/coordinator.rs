//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that ties the other parts together:
//! - Seeding the frontier with the root URLs
//! - Keeping a bounded number of fetch tasks in flight
//! - Following redirects within a per-chain budget
//! - Enqueuing newly discovered in-scope links
//! - Collecting every outcome into a report

use crate::config::Config;
use crate::crawler::dedup::{difference, SeenFilter};
use crate::crawler::fetcher::{FetchReply, Fetcher};
use crate::crawler::parser::{FetchedPage, ResponseParser};
use crate::output::CrawlReport;
use crate::state::FetchOutcome;
use crate::url::{fix_url, CrawlScope, Link};
use crate::CrawlError;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use tracing::Span;
use url::Url;

/// A URL waiting to be fetched and the redirect budget of its chain
#[derive(Debug, Clone)]
struct QueuedUrl {
    url: Url,
    max_redirect: u32,
}

/// What a finished fetch task hands back to the crawl loop
#[derive(Debug)]
enum TaskResult {
    /// Body read; still to be parsed against the seen set
    Page {
        page: FetchedPage,
        max_redirect: u32,
    },

    /// Nothing left to parse
    Done(FetchOutcome),
}

/// Main crawler coordinator structure
///
/// The seen filter lives in the crawl loop only. Tasks fetch and read
/// bodies; parsing and deduplication happen as each task is joined, so the
/// filter is never shared between tasks.
pub struct Coordinator<S = HashSet<Link>> {
    roots: Vec<String>,
    parser: Arc<ResponseParser>,
    fetcher: Fetcher,
    max_redirect: u32,
    max_tasks: usize,
    seen: S,
    span: Span,
}

impl Coordinator {
    /// Creates a coordinator from the crawl configuration
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(CrawlError)` - No roots, a bad exclude pattern, or the HTTP
    ///   client could not be built
    pub fn new(config: &Config) -> Result<Self, CrawlError> {
        if config.roots.is_empty() {
            return Err(CrawlError::NoRoots);
        }

        let span = tracing::info_span!("crawl");
        let exclude = config.crawler.exclude_regex()?;
        let scope = CrawlScope::with_span(
            config.roots.as_slice(),
            exclude,
            config.crawler.strict,
            tracing::debug_span!(parent: &span, "scope"),
        );
        let parser = ResponseParser::new(Arc::new(scope))
            .with_span(tracing::info_span!(parent: &span, "parser"));
        let fetcher = Fetcher::from_config(config)?
            .with_span(tracing::info_span!(parent: &span, "fetcher"));

        Ok(Self {
            roots: config.roots.clone(),
            parser: Arc::new(parser),
            fetcher,
            max_redirect: config.crawler.max_redirect,
            max_tasks: config.crawler.max_tasks.max(1),
            seen: HashSet::new(),
            span,
        })
    }
}

impl<S: SeenFilter> Coordinator<S> {
    /// Replaces the seen filter
    pub fn with_seen_filter<T: SeenFilter>(self, seen: T) -> Coordinator<T> {
        Coordinator {
            roots: self.roots,
            parser: self.parser,
            fetcher: self.fetcher,
            max_redirect: self.max_redirect,
            max_tasks: self.max_tasks,
            seen,
            span: self.span,
        }
    }

    pub fn scope(&self) -> &CrawlScope {
        self.parser.scope()
    }

    /// Runs the crawl to completion
    ///
    /// Terminates when the frontier is empty and no task is in flight. The
    /// fetcher's connection pool is closed before returning.
    pub async fn run(mut self) -> CrawlReport {
        let start_time = Instant::now();
        let mut frontier = self.seed();
        let mut outcomes = Vec::new();
        let mut tasks = JoinSet::new();

        tracing::info!(
            parent: &self.span,
            "Starting crawl of {} roots with up to {} tasks",
            frontier.len(),
            self.max_tasks
        );

        loop {
            while tasks.len() < self.max_tasks {
                let Some(queued) = frontier.pop_front() else {
                    break;
                };
                tasks.spawn(fetch_task(self.fetcher.clone(), queued));
            }

            let joined = match tasks.join_next().await {
                Some(joined) => joined,
                None => {
                    tracing::info!(parent: &self.span, "Frontier is empty, crawl complete");
                    break;
                }
            };

            match joined {
                Ok(result) => {
                    let outcome = self.handle_result(result, &mut frontier);
                    outcomes.push(outcome);
                }
                Err(e) if e.is_cancelled() => {
                    tracing::debug!(parent: &self.span, "Fetch task cancelled");
                }
                Err(e) => {
                    tracing::error!(parent: &self.span, "Fetch task failed: {}", e);
                }
            }

            if outcomes.len() % 10 == 0 && !outcomes.is_empty() {
                tracing::info!(
                    parent: &self.span,
                    "Progress: {} urls done, {} in frontier, {} in flight",
                    outcomes.len(),
                    frontier.len(),
                    tasks.len()
                );
            }
        }

        tracing::info!(
            parent: &self.span,
            "Crawl completed: {} urls in {:?}",
            outcomes.len(),
            start_time.elapsed()
        );

        self.fetcher.close();

        CrawlReport::new(outcomes, start_time.elapsed())
    }

    /// Queues every root with the full redirect budget and marks it seen
    fn seed(&mut self) -> VecDeque<QueuedUrl> {
        let mut frontier = VecDeque::new();

        for root in &self.roots {
            let fixed = fix_url(root);
            let link = match Link::parse(&fixed) {
                Ok(link) => link,
                Err(e) => {
                    tracing::warn!(parent: &self.span, "Skipping root {}: {}", root, e);
                    continue;
                }
            };

            if self.seen.contains(&link) {
                continue;
            }
            self.seen.add(link.clone());
            frontier.push_back(QueuedUrl {
                url: link.into_url(),
                max_redirect: self.max_redirect,
            });
        }

        frontier
    }

    /// Turns a finished task into its outcome, queueing follow-up work
    fn handle_result(
        &mut self,
        result: TaskResult,
        frontier: &mut VecDeque<QueuedUrl>,
    ) -> FetchOutcome {
        let (page, max_redirect) = match result {
            TaskResult::Done(outcome) => return outcome,
            TaskResult::Page { page, max_redirect } => (page, max_redirect),
        };

        let (outcome, links) = self.parser.parse_page(&page, &self.seen);

        if let Some(next_url) = outcome.next_url() {
            self.follow_redirect(outcome.url(), next_url, max_redirect, frontier);
        } else {
            let new_links = difference(&links, &self.seen);
            if !new_links.is_empty() {
                tracing::debug!(
                    parent: &self.span,
                    "Queueing {} new links from {}",
                    new_links.len(),
                    outcome.url()
                );
            }
            for link in new_links {
                frontier.push_back(QueuedUrl {
                    url: link.into_url(),
                    max_redirect: self.max_redirect,
                });
            }
            for link in links {
                self.seen.add(link);
            }
        }

        outcome
    }

    /// Queues a redirect target while the chain's budget lasts
    fn follow_redirect(
        &mut self,
        from: &str,
        next_url: &str,
        max_redirect: u32,
        frontier: &mut VecDeque<QueuedUrl>,
    ) {
        let link = match Link::parse(next_url) {
            Ok(link) => link,
            Err(e) => {
                tracing::warn!(parent: &self.span, "Bad redirect target {}: {}", next_url, e);
                return;
            }
        };

        if self.seen.contains(&link) {
            tracing::debug!(parent: &self.span, "Redirect to {} already seen", next_url);
        } else if max_redirect > 0 {
            tracing::info!(parent: &self.span, "Redirect from {} to {}", from, next_url);
            self.seen.add(link.clone());
            frontier.push_back(QueuedUrl {
                url: link.into_url(),
                max_redirect: max_redirect - 1,
            });
        } else {
            tracing::error!(
                parent: &self.span,
                "Redirect limit reached for {} from {}",
                next_url,
                from
            );
        }
    }
}

/// Fetches one URL and reads its body
async fn fetch_task(fetcher: Fetcher, queued: QueuedUrl) -> TaskResult {
    match fetcher.fetch(&queued.url, queued.max_redirect).await {
        FetchReply::Fetched {
            response,
            max_redirect,
            ..
        } => match FetchedPage::read(response).await {
            Ok(page) => TaskResult::Page { page, max_redirect },
            Err(outcome) => TaskResult::Done(outcome),
        },
        FetchReply::Exhausted(outcome) => TaskResult::Done(outcome),
    }
}

/// Runs a complete crawl with the default seen filter
pub async fn run_crawl(config: &Config) -> Result<CrawlReport, CrawlError> {
    let coordinator = Coordinator::new(config)?;
    Ok(coordinator.run().await)
}
