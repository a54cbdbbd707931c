//! Separating new links from links already seen
//!
//! The "seen" store is an injected capability. It may be probabilistic and
//! report false positives (a new link reported as seen), which only means a
//! page is skipped. It must not report false negatives, which would fetch a
//! page twice.

use crate::url::Link;
use std::collections::HashSet;

/// Membership store for links the crawl has already handled
pub trait SeenFilter {
    /// Returns true if the link may have been seen
    fn contains(&self, link: &Link) -> bool;

    /// Marks a link as seen
    fn add(&mut self, link: Link);
}

impl SeenFilter for HashSet<Link> {
    fn contains(&self, link: &Link) -> bool {
        HashSet::contains(self, link)
    }

    fn add(&mut self, link: Link) {
        self.insert(link);
    }
}

/// Returns the candidates that `seen` does not report as present
///
/// `seen` is only queried. Marking the returned links as seen is the
/// caller's job and must happen after this call.
///
/// # Examples
///
/// ```
/// use std::collections::HashSet;
/// use sumi_scope::crawler::difference;
/// use sumi_scope::url::Link;
///
/// let a = Link::parse("http://example.com/a").unwrap();
/// let b = Link::parse("http://example.com/b").unwrap();
/// let candidates: HashSet<Link> = [a.clone(), b.clone()].into_iter().collect();
/// let seen: HashSet<Link> = [a].into_iter().collect();
///
/// let unseen = difference(&candidates, &seen);
/// assert_eq!(unseen.len(), 1);
/// assert!(unseen.contains(&b));
/// ```
pub fn difference<S: SeenFilter + ?Sized>(candidates: &HashSet<Link>, seen: &S) -> HashSet<Link> {
    candidates
        .iter()
        .filter(|link| !seen.contains(link))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn links(paths: &[&str]) -> HashSet<Link> {
        paths
            .iter()
            .map(|p| Link::parse(&format!("http://example.com/{}", p)).unwrap())
            .collect()
    }

    /// Reports every link as seen, like a saturated probabilistic filter
    struct AlwaysSeen;

    impl SeenFilter for AlwaysSeen {
        fn contains(&self, _link: &Link) -> bool {
            true
        }

        fn add(&mut self, _link: Link) {}
    }

    #[test]
    fn test_removes_seen_links() {
        let result = difference(&links(&["a", "b", "c"]), &links(&["a"]));
        assert_eq!(result, links(&["b", "c"]));
    }

    #[test]
    fn test_empty_seen_returns_all() {
        let candidates = links(&["a", "b"]);
        assert_eq!(difference(&candidates, &HashSet::<Link>::new()), candidates);
    }

    #[test]
    fn test_empty_candidates() {
        assert!(difference(&HashSet::new(), &links(&["a"])).is_empty());
    }

    #[test]
    fn test_seen_links_outside_candidates_are_ignored() {
        let result = difference(&links(&["a"]), &links(&["x", "y"]));
        assert_eq!(result, links(&["a"]));
    }

    #[test]
    fn test_does_not_mutate_seen() {
        let seen = links(&["a"]);
        let before = seen.clone();
        let _ = difference(&links(&["a", "b"]), &seen);
        assert_eq!(seen, before);
    }

    #[test]
    fn test_false_positives_drop_links() {
        assert!(difference(&links(&["a", "b"]), &AlwaysSeen).is_empty());
    }

    #[test]
    fn test_works_through_trait_object() {
        let seen = links(&["b"]);
        let filter: &dyn SeenFilter = &seen;
        assert_eq!(difference(&links(&["a", "b"]), filter), links(&["a"]));
    }

    #[test]
    fn test_hashset_filter_add() {
        let mut seen: HashSet<Link> = HashSet::new();
        let link = Link::parse("http://example.com/a").unwrap();
        SeenFilter::add(&mut seen, link.clone());
        assert!(SeenFilter::contains(&seen, &link));
    }
}
