use crate::url::{extract_host, fix_url, is_numeric_host, lenient_host, toggle_www, Link};
use regex::Regex;
use std::collections::HashSet;
use tracing::Span;
use url::Url;

/// Immutable crawl scope: root domains, matching mode and exclusion pattern
///
/// Built once from the root URLs at startup and read-only afterwards, so it
/// can be shared between tasks behind an `Arc` without locking.
#[derive(Debug, Clone)]
pub struct CrawlScope {
    root_domains: HashSet<String>,
    exclude: Option<Regex>,
    strict: bool,
    span: Span,
}

impl CrawlScope {
    /// Builds a scope from root URLs
    ///
    /// Each root is passed through [`fix_url`] and parsed. Its host (port
    /// discarded) becomes a root domain: numeric hosts verbatim, other hosts
    /// lower-cased and stored literally in strict mode or reduced with
    /// [`lenient_host`] in lenient mode. Roots without a host are skipped.
    ///
    /// # Examples
    ///
    /// ```
    /// use sumi_scope::url::CrawlScope;
    ///
    /// let scope = CrawlScope::new(&["example.com"], None, true);
    /// assert!(scope.is_allowed("https://www.example.com/page"));
    /// assert!(!scope.is_allowed("https://blog.example.com/page"));
    /// ```
    pub fn new<S: AsRef<str>>(roots: &[S], exclude: Option<Regex>, strict: bool) -> Self {
        Self::with_span(roots, exclude, strict, tracing::debug_span!("scope"))
    }

    /// Builds a scope that reports its decisions under the given span
    pub fn with_span<S: AsRef<str>>(
        roots: &[S],
        exclude: Option<Regex>,
        strict: bool,
        span: Span,
    ) -> Self {
        let mut root_domains = HashSet::new();

        for root in roots {
            let fixed = fix_url(root.as_ref());
            let host = match Url::parse(&fixed).ok().as_ref().and_then(extract_host) {
                Some(host) => host,
                None => {
                    tracing::warn!(parent: &span, "Skipping root without a host: {}", root.as_ref());
                    continue;
                }
            };

            if is_numeric_host(&host) || strict {
                root_domains.insert(host);
            } else {
                root_domains.insert(lenient_host(&host));
            }
        }

        tracing::debug!(
            parent: &span,
            "Scope built with {} root domains (strict: {})",
            root_domains.len(),
            strict
        );

        Self {
            root_domains,
            exclude,
            strict,
            span,
        }
    }

    /// Decides whether a URL belongs to the crawl scope
    ///
    /// Rules, first match wins:
    /// 1. The exclusion pattern matches the URL text → reject
    /// 2. Scheme is not `http` or `https` → reject
    /// 3. Host equals a root domain → accept
    /// 4. Host is numeric → reject
    /// 5. Strict: accept iff the `www.` toggle of the host is a root domain;
    ///    lenient: accept iff the last-two-label reduction is a root domain
    ///
    /// Unparseable URLs are rejected. The result depends only on the URL and
    /// the scope.
    pub fn is_allowed(&self, url: &str) -> bool {
        if self.is_excluded(url) {
            return false;
        }
        match Url::parse(url) {
            Ok(parsed) => self.scheme_and_host_okay(&parsed),
            Err(_) => false,
        }
    }

    /// Same decision as [`CrawlScope::is_allowed`] for an already parsed link
    pub fn is_link_allowed(&self, link: &Link) -> bool {
        !self.is_excluded(link.as_str()) && self.scheme_and_host_okay(link.as_url())
    }

    /// Checks whether a host should be crawled
    ///
    /// A literal match after lower-casing is always good. For hosts that do
    /// not look like IP addresses, approximate matches are allowed depending
    /// on the strict flag.
    pub fn host_okay(&self, host: &str) -> bool {
        let host = host.to_lowercase();
        if self.root_domains.contains(&host) {
            return true;
        }
        if is_numeric_host(&host) {
            return false;
        }
        if self.strict {
            self.root_domains.contains(&toggle_www(&host))
        } else {
            self.root_domains.contains(&lenient_host(&host))
        }
    }

    pub fn root_domains(&self) -> &HashSet<String> {
        &self.root_domains
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    fn is_excluded(&self, url: &str) -> bool {
        self.exclude
            .as_ref()
            .map(|pattern| pattern.is_match(url))
            .unwrap_or(false)
    }

    fn scheme_and_host_okay(&self, url: &Url) -> bool {
        if url.scheme() != "http" && url.scheme() != "https" {
            tracing::debug!(parent: &self.span, "Skipping non-http scheme in {}", url);
            return false;
        }

        let okay = extract_host(url)
            .map(|host| self.host_okay(&host))
            .unwrap_or(false);
        if !okay {
            tracing::debug!(parent: &self.span, "Skipping non-root host in {}", url);
        }
        okay
    }
}
