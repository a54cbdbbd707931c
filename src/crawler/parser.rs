//! Response parser for extracting in-scope links
//!
//! This module turns a fetched response into a fetch outcome and the set of
//! in-scope links found in its body. Extraction is a lenient scan for
//! `href` attribute values rather than a full markup parse, so malformed
//! pages still yield their links.

use crate::crawler::dedup::{difference, SeenFilter};
use crate::state::FetchOutcome;
use crate::url::{CrawlScope, Link};
use encoding_rs::{Encoding, UTF_8};
use regex::Regex;
use reqwest::header::{CONTENT_TYPE, LOCATION};
use reqwest::Response;
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, OnceLock};
use tracing::Span;
use url::Url;

/// Charset assumed when a 200 response names none
pub const DEFAULT_ENCODING: &str = "utf-8";

/// Content types whose bodies are scanned for links
const LINK_CONTENT_TYPES: &[&str] = &["text/html", "application/xml"];

/// Redirect statuses that carry a `Location` to follow
const REDIRECT_STATUSES: &[u16] = &[301, 302, 303, 307, 308];

static HREF_PATTERN: OnceLock<Regex> = OnceLock::new();

fn href_pattern() -> &'static Regex {
    HREF_PATTERN.get_or_init(|| {
        Regex::new(r#"(?i)href=["']([^\s"'<>]+)"#).expect("href pattern is a valid regex")
    })
}

/// A response with its body fully read
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL of the response
    pub url: Url,

    /// HTTP status code
    pub status: u16,

    /// Raw `Content-Type` header value
    pub content_type: Option<String>,

    /// Raw `Location` header value
    pub location: Option<String>,

    /// Response body
    pub body: Vec<u8>,
}

impl FetchedPage {
    /// Reads the whole body of a response
    ///
    /// A body that cannot be read becomes an outcome carrying the error, so
    /// the page degrades to zero links instead of failing the crawl.
    pub async fn read(response: Response) -> Result<Self, FetchOutcome> {
        let url = response.url().clone();
        let status = response.status().as_u16();
        let content_type = header_str(&response, CONTENT_TYPE);
        let location = header_str(&response, LOCATION);

        match response.bytes().await {
            Ok(body) => Ok(Self {
                url,
                status,
                content_type,
                location,
                body: body.to_vec(),
            }),
            Err(e) => Err(FetchOutcome::unreadable(url.as_str(), status, e.to_string())),
        }
    }
}

fn header_str(response: &Response, name: reqwest::header::HeaderName) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

/// Splits a `Content-Type` value into its main type and parameters
///
/// The main type and parameter names are lower-cased; quoted parameter
/// values are unquoted.
///
/// # Examples
///
/// ```
/// use sumi_scope::crawler::parse_content_type;
///
/// let (mime, params) = parse_content_type("text/html; charset=ISO-8859-1");
/// assert_eq!(mime, "text/html");
/// assert_eq!(params.get("charset").map(String::as_str), Some("ISO-8859-1"));
/// ```
pub fn parse_content_type(value: &str) -> (String, HashMap<String, String>) {
    let mut parts = value.split(';');
    let mime = parts.next().unwrap_or("").trim().to_lowercase();

    let params = parts
        .filter_map(|part| {
            let (key, val) = part.split_once('=')?;
            let key = key.trim().to_lowercase();
            if key.is_empty() {
                return None;
            }
            let val = val.trim().trim_matches('"').to_string();
            Some((key, val))
        })
        .collect();

    (mime, params)
}

/// Decodes a body with the named charset, falling back to UTF-8
///
/// Undecodable bytes are replaced rather than rejected.
pub fn decode_body<'a>(body: &'a [u8], charset: &str) -> Cow<'a, str> {
    let encoding = Encoding::for_label(charset.trim().as_bytes()).unwrap_or(UTF_8);
    let (text, _, _) = encoding.decode(body);
    text
}

/// Turns responses into outcomes and in-scope link sets
#[derive(Debug, Clone)]
pub struct ResponseParser {
    scope: Arc<CrawlScope>,
    span: Span,
}

impl ResponseParser {
    pub fn new(scope: Arc<CrawlScope>) -> Self {
        Self {
            scope,
            span: tracing::info_span!("parser"),
        }
    }

    /// Reports extraction under the given span
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn scope(&self) -> &CrawlScope {
        &self.scope
    }

    /// Reads a response and extracts its in-scope links
    ///
    /// The outcome's `new_link_count` is the number of returned links that
    /// `seen` does not report. `seen` is not modified.
    pub async fn parse_links<S: SeenFilter + ?Sized>(
        &self,
        response: Response,
        seen: &S,
    ) -> (FetchOutcome, HashSet<Link>) {
        match FetchedPage::read(response).await {
            Ok(page) => self.parse_page(&page, seen),
            Err(outcome) => {
                tracing::warn!(
                    parent: &self.span,
                    "Failed to read body of {}: {}",
                    outcome.url(),
                    outcome.failure().unwrap_or_default()
                );
                (outcome, HashSet::new())
            }
        }
    }

    /// Builds the outcome and link set for a page whose body is read
    ///
    /// # Rules
    ///
    /// - Redirect status with a `Location` header → redirect outcome, no links
    /// - Status 200 → content type and charset (default `utf-8`) recorded;
    ///   `text/html` and `application/xml` bodies are scanned for links
    /// - Any other status → outcome with no links
    pub fn parse_page<S: SeenFilter + ?Sized>(
        &self,
        page: &FetchedPage,
        seen: &S,
    ) -> (FetchOutcome, HashSet<Link>) {
        let size = page.body.len();

        if let Some(next_url) = redirect_target(page) {
            return (
                FetchOutcome::redirect(page.url.as_str(), next_url.as_str(), page.status, size),
                HashSet::new(),
            );
        }

        let mut links = HashSet::new();
        let mut content_type = None;
        let mut encoding = None;

        if page.status == 200 {
            let (mime, params) = match page.content_type.as_deref() {
                Some(value) => {
                    let (mime, params) = parse_content_type(value);
                    (Some(mime).filter(|m| !m.is_empty()), params)
                }
                None => (None, HashMap::new()),
            };
            let charset = params
                .get("charset")
                .cloned()
                .unwrap_or_else(|| DEFAULT_ENCODING.to_string());

            if let Some(mime) = mime.as_deref() {
                if LINK_CONTENT_TYPES.contains(&mime) {
                    let text = decode_body(&page.body, &charset);
                    links = self.extract_links(&text, &page.url);
                }
            }

            content_type = mime;
            encoding = Some(charset);
        }

        let new_link_count = difference(&links, seen).len();
        let outcome = FetchOutcome::page(
            page.url.as_str(),
            page.status,
            size,
            content_type,
            encoding,
            links.len(),
            new_link_count,
        );

        (outcome, links)
    }

    /// Scans text for `href` values and keeps the in-scope links
    ///
    /// Values are resolved against `base` and defragmented. Values that do
    /// not resolve are dropped.
    pub fn extract_links(&self, text: &str, base: &Url) -> HashSet<Link> {
        let raw: HashSet<&str> = href_pattern()
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str())
            .collect();

        if !raw.is_empty() {
            tracing::info!(parent: &self.span, "Got {} distinct urls from {}", raw.len(), base);
        }

        raw.into_iter()
            .filter_map(|value| Link::resolve(value, base))
            .filter(|link| self.scope.is_link_allowed(link))
            .collect()
    }
}

fn redirect_target(page: &FetchedPage) -> Option<Url> {
    if !REDIRECT_STATUSES.contains(&page.status) {
        return None;
    }
    let location = page.location.as_deref()?;
    page.url.join(location).ok()
}
