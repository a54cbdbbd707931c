//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the shared, connection-pooled HTTP client
//! - GET requests with redirect following disabled
//! - Bounded retry on transient client errors

use crate::config::{Config, UserAgentConfig};
use crate::state::{run_attempts, FetchOutcome};
use reqwest::{redirect::Policy, Client, Response};
use std::time::Duration;
use tracing::Span;
use url::Url;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchReply {
    /// A response was received, whatever its status
    Fetched {
        /// The response, body not yet read
        response: Response,
        /// The requested URL
        url: Url,
        /// Redirect budget remaining for this chain
        max_redirect: u32,
    },

    /// Every attempt raised a transient error
    Exhausted(FetchOutcome),
}

/// Builds an HTTP client with proper configuration
///
/// Redirects are never followed by the client. They are surfaced to the
/// caller, which enforces the redirect budget.
///
/// # Arguments
///
/// * `config` - The user agent configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use sumi_scope::config::UserAgentConfig;
/// use sumi_scope::crawler::build_http_client;
///
/// let config = UserAgentConfig::default();
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::none()) // Handle redirects manually
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches URLs with bounded retry over one shared connection pool
///
/// Clones share the same pool, so a single `Fetcher` can serve many
/// concurrent tasks. The pool is released when the last clone is dropped or
/// closed.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    max_tries: u32,
    backoff: Duration,
    span: Span,
}

impl Fetcher {
    /// Creates a fetcher over an existing client
    pub fn new(client: Client, max_tries: u32) -> Self {
        Self {
            client,
            max_tries,
            backoff: Duration::ZERO,
            span: tracing::info_span!("fetcher"),
        }
    }

    /// Creates a fetcher and its client from the crawl configuration
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let client = build_http_client(&config.user_agent)?;
        Ok(Self::new(client, config.crawler.max_tries)
            .with_backoff(Duration::from_millis(config.crawler.retry_backoff_ms)))
    }

    /// Sets the base delay for exponential backoff between attempts
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Reports attempts under the given span
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn max_tries(&self) -> u32 {
        self.max_tries
    }

    /// Fetches one URL
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | Response received (any status) | Return it immediately |
    /// | Connection, timeout, protocol error | Retry until `max_tries` |
    /// | All tries failed | `Exhausted` with the last error |
    ///
    /// Never fails: running out of tries is a reportable outcome. Dropping
    /// the future cancels the fetch without producing an outcome.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to fetch
    /// * `max_redirect` - Redirect budget carried along with the response
    pub async fn fetch(&self, url: &Url, max_redirect: u32) -> FetchReply {
        let attempts = run_attempts(
            self.max_tries,
            self.backoff,
            &self.span,
            url.as_str(),
            |_| self.client.get(url.clone()).send(),
        )
        .await;

        match attempts {
            Ok(response) => FetchReply::Fetched {
                response,
                url: url.clone(),
                max_redirect,
            },
            Err(exhausted) => {
                FetchReply::Exhausted(FetchOutcome::failed(url.as_str(), exhausted.last_error))
            }
        }
    }

    /// Drops this handle to the connection pool
    ///
    /// There is no explicit shutdown: `reqwest` releases the pool when the
    /// last `Client` clone is dropped, so clones still held by in-flight
    /// tasks keep it alive until they finish.
    pub fn close(self) {
        tracing::debug!(parent: &self.span, "Closing HTTP connection pool");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_fetcher(max_tries: u32) -> Fetcher {
        let client = build_http_client(&UserAgentConfig::default()).unwrap();
        Fetcher::new(client, max_tries)
    }

    /// Returns a URL on a local port nothing is listening on
    fn closed_port_url() -> Url {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        Url::parse(&format!("http://127.0.0.1:{}/", port)).unwrap()
    }

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(&UserAgentConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn test_from_config_uses_max_tries() {
        let mut config = Config::default();
        config.crawler.max_tries = 7;
        let fetcher = Fetcher::from_config(&config).unwrap();
        assert_eq!(fetcher.max_tries(), 7);
    }

    #[tokio::test]
    async fn test_fetch_returns_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
            .expect(1)
            .mount(&server)
            .await;

        let url = Url::parse(&server.uri()).unwrap();
        match test_fetcher(4).fetch(&url, 10).await {
            FetchReply::Fetched {
                response,
                url: fetched,
                max_redirect,
            } => {
                assert_eq!(response.status().as_u16(), 200);
                assert_eq!(fetched, url);
                assert_eq!(max_redirect, 10);
            }
            FetchReply::Exhausted(outcome) => panic!("unexpected failure: {:?}", outcome),
        }
    }

    #[tokio::test]
    async fn test_fetch_does_not_retry_server_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/busy", server.uri())).unwrap();
        let reply = test_fetcher(4).fetch(&url, 10).await;
        assert!(matches!(reply, FetchReply::Fetched { ref response, .. } if response.status().as_u16() == 503));
    }

    #[tokio::test]
    async fn test_fetch_does_not_follow_redirects() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/old"))
            .respond_with(ResponseTemplate::new(301).insert_header("location", "/new"))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/old", server.uri())).unwrap();
        match test_fetcher(4).fetch(&url, 3).await {
            FetchReply::Fetched {
                response,
                max_redirect,
                ..
            } => {
                assert_eq!(response.status().as_u16(), 301);
                assert_eq!(max_redirect, 3);
            }
            FetchReply::Exhausted(outcome) => panic!("unexpected failure: {:?}", outcome),
        }
    }

    #[tokio::test]
    async fn test_fetch_exhausts_on_connection_errors() {
        let url = closed_port_url();
        match test_fetcher(2).fetch(&url, 10).await {
            FetchReply::Exhausted(outcome) => {
                assert_eq!(outcome.url(), url.as_str());
                assert_eq!(outcome.status(), None);
                assert_eq!(outcome.size(), 0);
                assert_eq!(outcome.link_count(), 0);
                assert_eq!(outcome.new_link_count(), 0);
                assert!(outcome.failure().is_some());
            }
            FetchReply::Fetched { response, .. } => {
                panic!("unexpected response: {}", response.status())
            }
        }
    }
}
