use crate::UrlError;
use std::fmt;
use url::Url;

/// Prefixes a scheme-less URL with `http://`
///
/// Anything already containing `://` is returned unchanged. Root and seed
/// URLs go through this before they reach scope construction or a fetch.
///
/// # Examples
///
/// ```
/// use sumi_scope::url::fix_url;
///
/// assert_eq!(fix_url("example.com"), "http://example.com");
/// assert_eq!(fix_url("https://example.com"), "https://example.com");
/// ```
pub fn fix_url(raw: &str) -> String {
    if raw.contains("://") {
        raw.to_string()
    } else {
        format!("http://{}", raw)
    }
}

/// An absolute URL with its fragment removed
///
/// Two links that differ only by fragment are the same link. Equality and
/// hashing follow the serialized form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Link(Url);

impl Link {
    /// Parses an absolute URL string into a link, dropping its fragment
    pub fn parse(raw: &str) -> Result<Self, UrlError> {
        let url = Url::parse(raw).map_err(|e| UrlError::Parse(e.to_string()))?;
        Ok(Self::from_url(url))
    }

    /// Resolves a raw extracted value against the page URL
    ///
    /// Returns `None` when the value does not resolve to an absolute URL.
    /// Malformed values are dropped rather than failing the whole page.
    ///
    /// # Examples
    ///
    /// ```
    /// use sumi_scope::url::Link;
    /// use url::Url;
    ///
    /// let base = Url::parse("http://example.com/dir/").unwrap();
    /// let link = Link::resolve("/a#frag", &base).unwrap();
    /// assert_eq!(link.as_str(), "http://example.com/a");
    /// ```
    pub fn resolve(raw: &str, base: &Url) -> Option<Self> {
        base.join(raw).ok().map(Self::from_url)
    }

    fn from_url(mut url: Url) -> Self {
        url.set_fragment(None);
        Self(url)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }

    pub fn into_url(self) -> Url {
        self.0
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl From<Url> for Link {
    fn from(url: Url) -> Self {
        Self::from_url(url)
    }
}
