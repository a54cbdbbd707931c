use url::Url;

/// Extracts the host from a URL, lower-cased and without its port
///
/// `Url` keeps the port separately from the host, so the port is never part
/// of the returned string. Root domains and candidate hosts both go through
/// this function, which keeps their normalization symmetric.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sumi_scope::url::extract_host;
///
/// let url = Url::parse("https://EXAMPLE.COM:8080/path").unwrap();
/// assert_eq!(extract_host(&url), Some("example.com".to_string()));
/// ```
pub fn extract_host(url: &Url) -> Option<String> {
    url.host_str()
        .filter(|h| !h.is_empty())
        .map(|h| h.to_lowercase())
}

/// Returns true if the host is a literal numeric address
///
/// A host made only of digits and dots is treated as an IP literal. IP
/// literals are matched exactly and never approximately.
pub fn is_numeric_host(host: &str) -> bool {
    host.chars().all(|c| c.is_ascii_digit() || c == '.')
}
