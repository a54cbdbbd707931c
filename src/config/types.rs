use regex::Regex;
use serde::Deserialize;

/// Main configuration structure for Sumi-Scope
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Root URLs; their hosts define the crawl scope
    #[serde(default)]
    pub roots: Vec<String>,

    #[serde(default)]
    pub crawler: CrawlerConfig,

    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum length of a redirect chain
    #[serde(rename = "max-redirect")]
    pub max_redirect: u32,

    /// Maximum attempts per fetch on network errors
    #[serde(rename = "max-tries")]
    pub max_tries: u32,

    /// Maximum number of concurrent fetches
    #[serde(rename = "max-tasks")]
    pub max_tasks: usize,

    /// Base delay between retries (milliseconds), doubled per attempt
    #[serde(rename = "retry-backoff-ms")]
    pub retry_backoff_ms: u64,

    /// Regex; URLs matching it are never crawled
    pub exclude: Option<String>,

    /// Strict host matching (`www.` toggle) instead of lenient
    pub strict: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_redirect: 10,
            max_tries: 4,
            max_tasks: 100,
            retry_backoff_ms: 0,
            exclude: None,
            strict: true,
        }
    }
}

impl CrawlerConfig {
    /// Compiles the exclude pattern, if any
    pub fn exclude_regex(&self) -> Result<Option<Regex>, regex::Error> {
        self.exclude.as_deref().map(Regex::new).transpose()
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "SumiScope".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: String::new(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the `User-Agent` header value
    ///
    /// `Name/Version (+ContactURL)`, or `Name/Version` without a contact URL.
    pub fn header_value(&self) -> String {
        if self.contact_url.is_empty() {
            format!("{}/{}", self.crawler_name, self.crawler_version)
        } else {
            format!(
                "{}/{} (+{})",
                self.crawler_name, self.crawler_version, self.contact_url
            )
        }
    }
}
