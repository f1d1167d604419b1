use crate::error::{HarvestError, Result};
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use url::Url;

/// Matches `a[href^="/docs"]`, `[href^='/docs']` and `[href^=/docs]`
static SELECTOR_RULE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(?:a)?\[\s*href\s*\^=\s*["']?([^"'\]\s]+)["']?\s*\]$"#)
        .expect("selector rule pattern is valid")
});

/// Asset links are never worth rendering
pub const DEFAULT_EXCLUDE_PATTERNS: &[&str] =
    &[r"\.(jpg|jpeg|png|gif|css|js|ico|svg|woff|woff2|ttf|eot|pdf|zip)$"];

/// An "anchor whose href path starts with this prefix" rule
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LinkPredicate {
    prefix: String,
}

impl LinkPredicate {
    pub fn new(prefix: impl Into<String>) -> Result<Self> {
        let prefix = prefix.into();
        if !prefix.starts_with('/') {
            return Err(HarvestError::Predicate(format!(
                "path prefix must start with '/': {prefix}"
            )));
        }
        Ok(Self { prefix })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Parse a comma separated selector list such as
    /// `a[href^="/learn"], a[href^="/reference"]`
    pub fn parse_list(list: &str) -> Result<Vec<Self>> {
        list.split(',')
            .map(str::trim)
            .filter(|rule| !rule.is_empty())
            .map(Self::from_str)
            .collect()
    }

    /// Whether the path of `url` starts with this prefix
    pub fn matches_path(&self, url: &Url) -> bool {
        url.path().starts_with(&self.prefix)
    }
}

impl FromStr for LinkPredicate {
    type Err = HarvestError;

    fn from_str(rule: &str) -> Result<Self> {
        let rule = rule.trim();
        if let Some(caps) = SELECTOR_RULE.captures(rule) {
            return Self::new(&caps[1]);
        }
        if rule.contains('[') {
            return Err(HarvestError::Predicate(format!(
                "unsupported selector: {rule}"
            )));
        }
        Self::new(rule)
    }
}

impl fmt::Display for LinkPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a[href^=\"{}\"]", self.prefix)
    }
}

/// Decides which anchors on a page belong to the crawl
#[derive(Debug, Clone)]
pub struct LinkFilter {
    predicates: Vec<LinkPredicate>,
    exclude_regexes: Vec<Regex>,
    keep_fragments: bool,
}

impl LinkFilter {
    /// Create a filter from predicates and exclude patterns
    pub fn new(
        predicates: Vec<LinkPredicate>,
        exclude_patterns: &[String],
        keep_fragments: bool,
    ) -> Result<Self> {
        if predicates.is_empty() {
            return Err(HarvestError::Predicate(
                "at least one link predicate is required".to_string(),
            ));
        }

        let mut exclude_regexes = Vec::with_capacity(exclude_patterns.len());
        for pattern in exclude_patterns {
            exclude_regexes.push(Regex::new(pattern)?);
        }

        Ok(Self {
            predicates,
            exclude_regexes,
            keep_fragments,
        })
    }

    pub fn predicates(&self) -> &[LinkPredicate] {
        &self.predicates
    }

    /// Determine if a resolved link is in scope for a page served from `base`
    pub fn matches(&self, url: &Url, base: &Url) -> bool {
        if !matches!(url.scheme(), "http" | "https") {
            return false;
        }

        // Predicates are path prefixes, so they only apply on the page's own origin
        if url.origin() != base.origin() {
            return false;
        }

        if !self.predicates.iter().any(|p| p.matches_path(url)) {
            return false;
        }

        let url_str = url.as_str();
        !self.exclude_regexes.iter().any(|re| re.is_match(url_str))
    }

    /// Create the normalized key form of a URL
    pub fn normalize_url(&self, url: &Url) -> Url {
        let mut normalized = url.clone();
        if !self.keep_fragments {
            normalized.set_fragment(None);
        }
        normalized
    }
}

/// The href an anchor on a page served from `base` would carry for `target`
pub fn relative_href(target: &Url, base: &Url) -> String {
    if target.origin() != base.origin() {
        return target.to_string();
    }

    let mut href = target.path().to_string();
    if let Some(query) = target.query() {
        href.push('?');
        href.push_str(query);
    }
    if let Some(fragment) = target.fragment() {
        href.push('#');
        href.push_str(fragment);
    }
    href
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs_filter() -> LinkFilter {
        let excludes: Vec<String> = DEFAULT_EXCLUDE_PATTERNS
            .iter()
            .map(|p| p.to_string())
            .collect();
        LinkFilter::new(vec![LinkPredicate::new("/docs").unwrap()], &excludes, false).unwrap()
    }

    #[test]
    fn test_predicate_forms() {
        for rule in [
            "/docs",
            "a[href^=\"/docs\"]",
            "a[href^='/docs']",
            "[href^=/docs]",
            "  a[href^=\"/docs\"]  ",
        ] {
            let predicate: LinkPredicate = rule.parse().unwrap();
            assert_eq!(predicate.prefix(), "/docs", "rule {rule}");
        }

        assert!("docs".parse::<LinkPredicate>().is_err());
        assert!("a[href$=\"/docs\"]".parse::<LinkPredicate>().is_err());
    }

    #[test]
    fn test_predicate_list() {
        let predicates =
            LinkPredicate::parse_list(r#"a[href^="/reference"], a[href^="/learn"], a[href^="/blog"]"#)
                .unwrap();
        let prefixes: Vec<&str> = predicates.iter().map(|p| p.prefix()).collect();
        assert_eq!(prefixes, vec!["/reference", "/learn", "/blog"]);
    }

    #[test]
    fn test_scope() {
        let filter = docs_filter();
        let base = Url::parse("https://example.com/docs").unwrap();

        let in_scope = Url::parse("https://example.com/docs/a").unwrap();
        assert!(filter.matches(&in_scope, &base));

        let other_path = Url::parse("https://example.com/blog/a").unwrap();
        assert!(!filter.matches(&other_path, &base));

        let other_host = Url::parse("https://other.com/docs/a").unwrap();
        assert!(!filter.matches(&other_host, &base));

        let asset = Url::parse("https://example.com/docs/logo.png").unwrap();
        assert!(!filter.matches(&asset, &base));
    }

    #[test]
    fn test_empty_predicates_rejected() {
        assert!(LinkFilter::new(Vec::new(), &[], false).is_err());
    }

    #[test]
    fn test_normalize_strips_fragment() {
        let filter = docs_filter();
        let url = Url::parse("https://example.com/docs/a#intro").unwrap();
        assert_eq!(
            filter.normalize_url(&url).as_str(),
            "https://example.com/docs/a"
        );

        let keeping = LinkFilter::new(filter.predicates().to_vec(), &[], true).unwrap();
        assert_eq!(
            keeping.normalize_url(&url).as_str(),
            "https://example.com/docs/a#intro"
        );
    }

    #[test]
    fn test_relative_href() {
        let base = Url::parse("https://react.dev").unwrap();
        let target = Url::parse("https://react.dev/learn?x=1").unwrap();
        assert_eq!(relative_href(&target, &base), "/learn?x=1");

        let foreign = Url::parse("https://nextjs.org/docs").unwrap();
        assert_eq!(relative_href(&foreign, &base), "https://nextjs.org/docs");
    }
}
