//! Fetch outcome record
//!
//! One record summarizes one fetch attempt sequence: the failure after
//! exhausted retries, a redirect, or a received page with its link counts.

use serde::Serialize;

/// Immutable summary of one fetch
///
/// Fields are private and only set by the named constructors, so a record
/// cannot change after it is handed to the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchOutcome {
    url: String,
    next_url: Option<String>,
    status: Option<u16>,
    failure: Option<String>,
    size: usize,
    content_type: Option<String>,
    encoding: Option<String>,
    link_count: usize,
    new_link_count: usize,
}

impl FetchOutcome {
    /// Outcome for a URL whose retries were all exhausted
    ///
    /// No status, zero size and zero link counts; `failure` carries the last
    /// transient error.
    pub fn failed(url: impl Into<String>, failure: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            next_url: None,
            status: None,
            failure: Some(failure.into()),
            size: 0,
            content_type: None,
            encoding: None,
            link_count: 0,
            new_link_count: 0,
        }
    }

    /// Outcome for a response whose body could not be read
    pub fn unreadable(url: impl Into<String>, status: u16, failure: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            ..Self::failed(url, failure)
        }
    }

    /// Outcome for a redirect response pointing at `next_url`
    pub fn redirect(
        url: impl Into<String>,
        next_url: impl Into<String>,
        status: u16,
        size: usize,
    ) -> Self {
        Self {
            url: url.into(),
            next_url: Some(next_url.into()),
            status: Some(status),
            failure: None,
            size,
            content_type: None,
            encoding: None,
            link_count: 0,
            new_link_count: 0,
        }
    }

    /// Outcome for a received page
    ///
    /// `new_link_count` never exceeds `link_count`.
    pub fn page(
        url: impl Into<String>,
        status: u16,
        size: usize,
        content_type: Option<String>,
        encoding: Option<String>,
        link_count: usize,
        new_link_count: usize,
    ) -> Self {
        Self {
            url: url.into(),
            next_url: None,
            status: Some(status),
            failure: None,
            size,
            content_type,
            encoding,
            link_count,
            new_link_count: new_link_count.min(link_count),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn next_url(&self) -> Option<&str> {
        self.next_url.as_deref()
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn encoding(&self) -> Option<&str> {
        self.encoding.as_deref()
    }

    pub fn link_count(&self) -> usize {
        self.link_count
    }

    pub fn new_link_count(&self) -> usize {
        self.new_link_count
    }

    /// Returns true if a response was received and its body read
    pub fn is_success(&self) -> bool {
        self.status.is_some() && self.failure.is_none()
    }

    /// Returns true if this outcome points at a redirect target
    pub fn is_redirect(&self) -> bool {
        self.next_url.is_some()
    }
}
