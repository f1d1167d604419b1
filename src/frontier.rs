use std::collections::HashSet;
use url::Url;

/// Removes duplicate URLs, keeping the first occurrence of each
pub fn dedupe<I>(links: I) -> Vec<Url>
where
    I: IntoIterator<Item = Url>,
{
    let mut seen = HashSet::new();
    links
        .into_iter()
        .filter(|url| seen.insert(url.as_str().to_owned()))
        .collect()
}

/// Links discovered so far; grows monotonically until frozen
#[derive(Debug, Default)]
pub struct DiscoveryLog {
    links: Vec<Url>,
}

impl DiscoveryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, links: impl IntoIterator<Item = Url>) {
        self.links.extend(links);
    }

    /// Number of links recorded, duplicates included
    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Deduplicates the log into the frontier for archiving
    pub fn freeze(self) -> Frontier {
        Frontier {
            links: dedupe(self.links),
        }
    }
}

/// The deduplicated set of URLs scheduled for archiving
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frontier {
    links: Vec<Url>,
}

impl Frontier {
    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Url> {
        self.links.iter()
    }

    pub fn contains(&self, url: &Url) -> bool {
        self.links.iter().any(|u| u == url)
    }
}

impl FromIterator<Url> for Frontier {
    fn from_iter<I: IntoIterator<Item = Url>>(iter: I) -> Self {
        Self {
            links: dedupe(iter),
        }
    }
}

impl<'a> IntoIterator for &'a Frontier {
    type Item = &'a Url;
    type IntoIter = std::slice::Iter<'a, Url>;

    fn into_iter(self) -> Self::IntoIter {
        self.links.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(paths: &[&str]) -> Vec<Url> {
        paths
            .iter()
            .map(|p| Url::parse(&format!("https://example.com{p}")).unwrap())
            .collect()
    }

    #[test]
    fn test_dedupe_keeps_first_occurrence() {
        let deduped = dedupe(urls(&["/b", "/a", "/b", "/c", "/a"]));
        assert_eq!(deduped, urls(&["/b", "/a", "/c"]));
    }

    #[test]
    fn test_dedupe_is_idempotent() {
        let input = urls(&["/x", "/y", "/x", "/z", "/y", "/y"]);
        let once = dedupe(input);
        let twice = dedupe(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_discovery_log_freeze() {
        let mut log = DiscoveryLog::new();
        assert!(log.is_empty());

        log.extend(urls(&["/docs/a", "/docs/b"]));
        log.extend(urls(&["/docs/a", "/docs/b", "/docs/a/1"]));
        log.extend(urls(&[]));
        assert_eq!(log.len(), 5);

        let frontier = log.freeze();
        assert_eq!(frontier.len(), 3);
        assert!(frontier.contains(&urls(&["/docs/a/1"])[0]));
    }

    #[test]
    fn test_frontier_from_iterator() {
        let frontier: Frontier = urls(&["/a", "/a"]).into_iter().collect();
        assert_eq!(frontier.len(), 1);
        assert!(!frontier.is_empty());
    }
}
