//! Approximate host matching rules
//!
//! Both rules are coarse approximations of "same site".

/// Reduces a host to its last two labels joined without the dot
///
/// `a.b.example.com` and `example.com` both reduce to `examplecom`. Hosts
/// that share a final label pair are treated as equivalent, which also makes
/// unrelated sites under a public suffix such as `co.uk` equivalent.
///
/// # Examples
///
/// ```
/// use sumi_scope::url::lenient_host;
///
/// assert_eq!(lenient_host("a.b.example.com"), "examplecom");
/// assert_eq!(lenient_host("example.com"), "examplecom");
/// assert_eq!(lenient_host("localhost"), "localhost");
/// ```
pub fn lenient_host(host: &str) -> String {
    let labels: Vec<&str> = host.split('.').collect();
    let start = labels.len().saturating_sub(2);
    labels[start..].concat()
}

/// Toggles a leading `www.` on a host
///
/// Strips the prefix when present, prepends it otherwise. Strict matching
/// accepts a host when its toggle is a root domain.
///
/// # Examples
///
/// ```
/// use sumi_scope::url::toggle_www;
///
/// assert_eq!(toggle_www("www.example.com"), "example.com");
/// assert_eq!(toggle_www("example.com"), "www.example.com");
/// ```
pub fn toggle_www(host: &str) -> String {
    match host.strip_prefix("www.") {
        Some(bare) => bare.to_string(),
        None => format!("www.{}", host),
    }
}
