use crate::error::{HarvestError, Result};
use crate::filter::{DEFAULT_EXCLUDE_PATTERNS, LinkFilter, LinkPredicate};
use crate::policy::DEFAULT_LIKELY_FAILURE_THRESHOLD;
use crate::renderer::SettleOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

const REACT_PREFIXES: &[&str] = &["/reference", "/learn", "/blog"];
const NEXTJS_PREFIXES: &[&str] = &["/docs"];
const VERCEL_AI_PREFIXES: &[&str] = &[
    "/playground",
    "/examples",
    "/docs/introduction",
    "/providers/ai-sdk-providers",
];
const LLAMAINDEX_PREFIXES: &[&str] = &[
    "/understanding/",
    "/use_cases/",
    "/examples/",
    "/module_guides/",
    "/optimizing/production_rag/",
    "/api_reference/",
    "/llama_cloud/",
    "/community/integrations/",
];

/// Configuration for a documentation harvest, as read from JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestConfig {
    /// Seed page; also the base for relative links
    pub base_url: String,

    /// Href path prefixes (`/docs`) or selector rules (`a[href^="/docs"]`)
    pub link_predicates: Vec<String>,

    /// Directory receiving the archived HTML pages
    #[serde(default = "default_save_dir")]
    pub save_dir: PathBuf,

    /// Regex patterns for links to skip, applied to the absolute URL
    #[serde(default = "default_exclude_patterns")]
    pub exclude_patterns: Vec<String>,

    /// Whether to click each top-level link to reveal nested navigation
    #[serde(default = "default_expand_sections")]
    pub expand_sections: bool,

    /// Treat URLs differing only by fragment as distinct pages
    #[serde(default)]
    pub keep_fragments: bool,

    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Run the browser without a window
    #[serde(default = "default_headless")]
    pub headless: bool,

    #[serde(default)]
    pub settle: SettleOptions,

    /// Pause between archived pages, in milliseconds
    #[serde(default)]
    pub page_delay_ms: u64,

    /// Frontier size at or below which the run is flagged as likely incomplete
    #[serde(default = "default_likely_failure_threshold")]
    pub likely_failure_threshold: usize,

    /// Fail the process when any page could not be archived
    #[serde(default)]
    pub strict: bool,

    /// Optional directory for plain-text copies of archived pages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_dir: Option<PathBuf>,
}

fn default_save_dir() -> PathBuf {
    PathBuf::from("docs-raw-data")
}

fn default_exclude_patterns() -> Vec<String> {
    DEFAULT_EXCLUDE_PATTERNS.iter().map(|p| p.to_string()).collect()
}

fn default_expand_sections() -> bool {
    true
}

/// Default value for webdriver_url
fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_headless() -> bool {
    true
}

fn default_likely_failure_threshold() -> usize {
    DEFAULT_LIKELY_FAILURE_THRESHOLD
}

impl HarvestConfig {
    /// Create a new configuration with default values
    pub fn new(base_url: &str, link_predicates: Vec<String>) -> Self {
        Self {
            base_url: base_url.to_string(),
            link_predicates,
            save_dir: default_save_dir(),
            exclude_patterns: default_exclude_patterns(),
            expand_sections: default_expand_sections(),
            keep_fragments: false,
            webdriver_url: default_webdriver_url(),
            headless: default_headless(),
            settle: SettleOptions::default(),
            page_delay_ms: 0,
            likely_failure_threshold: default_likely_failure_threshold(),
            strict: false,
            text_dir: None,
        }
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            HarvestError::Config(format!("cannot read {}: {e}", path.as_ref().display()))
        })?;
        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Configuration for one of the documentation sites the harvester ships with
    pub fn preset(preset: Preset) -> Self {
        let (base_url, predicates, save_dir, expand) = match preset {
            Preset::React => ("https://react.dev", REACT_PREFIXES, "react-docs-raw-data", true),
            Preset::Nextjs => ("https://nextjs.org/docs", NEXTJS_PREFIXES, "nextjs-docs-raw-data", false),
            Preset::VercelAi => (
                "https://sdk.vercel.ai/",
                VERCEL_AI_PREFIXES,
                "sdk.vercel.ai-docs-raw-data",
                false,
            ),
            Preset::Llamaindex => (
                "https://docs.llamaindex.ai/en/stable/",
                LLAMAINDEX_PREFIXES,
                "llamaindex-docs-raw-data",
                true,
            ),
        };

        let mut config = Self::new(base_url, predicates.iter().map(|p| p.to_string()).collect());
        config.save_dir = PathBuf::from(save_dir);
        config.expand_sections = expand;
        config
    }

    /// Validate the configuration into the immutable settings of a run
    pub fn seed(&self) -> Result<SeedConfig> {
        let base_url = Url::parse(&self.base_url)?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(HarvestError::Config(format!(
                "base URL must be http(s): {base_url}"
            )));
        }

        let mut predicates = Vec::new();
        for rule in &self.link_predicates {
            predicates.extend(LinkPredicate::parse_list(rule)?);
        }
        let filter = LinkFilter::new(predicates, &self.exclude_patterns, self.keep_fragments)?;

        Ok(SeedConfig {
            base_url,
            save_dir: self.save_dir.clone(),
            filter,
            expand_sections: self.expand_sections,
            text_dir: self.text_dir.clone(),
            page_delay: Duration::from_millis(self.page_delay_ms),
        })
    }
}

/// Documentation sites with known-good settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Preset {
    React,
    Nextjs,
    VercelAi,
    Llamaindex,
}

/// Validated, immutable inputs of a single run
#[derive(Debug, Clone)]
pub struct SeedConfig {
    pub base_url: Url,
    pub save_dir: PathBuf,
    pub filter: LinkFilter,
    pub expand_sections: bool,
    pub text_dir: Option<PathBuf>,
    pub page_delay: Duration,
}

impl SeedConfig {
    pub fn new(base_url: Url, save_dir: impl Into<PathBuf>, filter: LinkFilter) -> Self {
        Self {
            base_url,
            save_dir: save_dir.into(),
            filter,
            expand_sections: true,
            text_dir: None,
            page_delay: Duration::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_json_uses_defaults() {
        let config = HarvestConfig::from_json(
            r#"{ "base_url": "https://example.com/docs", "link_predicates": ["/docs"] }"#,
        )
        .unwrap();

        assert_eq!(config.save_dir, PathBuf::from("docs-raw-data"));
        assert!(config.expand_sections);
        assert!(config.headless);
        assert!(!config.strict);
        assert_eq!(config.webdriver_url, "http://localhost:4444");
        assert_eq!(config.likely_failure_threshold, 10);
        assert_eq!(config.settle.navigation_timeout_secs, 30);
        assert_eq!(config.exclude_patterns.len(), DEFAULT_EXCLUDE_PATTERNS.len());
    }

    #[test]
    fn test_seed_parses_selector_lists() {
        let config = HarvestConfig::new(
            "https://react.dev",
            vec![r#"a[href^="/reference"], a[href^="/learn"]"#.to_string(), "/blog".to_string()],
        );
        let seed = config.seed().unwrap();

        let prefixes: Vec<&str> = seed.filter.predicates().iter().map(|p| p.prefix()).collect();
        assert_eq!(prefixes, vec!["/reference", "/learn", "/blog"]);
        assert_eq!(seed.base_url.as_str(), "https://react.dev/");
    }

    #[test]
    fn test_seed_rejects_bad_input() {
        assert!(HarvestConfig::new("not a url", vec!["/docs".into()]).seed().is_err());
        assert!(HarvestConfig::new("ftp://example.com", vec!["/docs".into()]).seed().is_err());
        assert!(HarvestConfig::new("https://example.com", vec![]).seed().is_err());

        let mut bad_regex = HarvestConfig::new("https://example.com", vec!["/docs".into()]);
        bad_regex.exclude_patterns = vec!["(".to_string()];
        assert!(bad_regex.seed().is_err());
    }

    #[test]
    fn test_presets_are_valid() {
        for preset in [Preset::React, Preset::Nextjs, Preset::VercelAi, Preset::Llamaindex] {
            let config = HarvestConfig::preset(preset);
            assert!(config.seed().is_ok(), "{preset:?}");
        }

        let react = HarvestConfig::preset(Preset::React);
        assert!(react.expand_sections);
        assert_eq!(react.save_dir, PathBuf::from("react-docs-raw-data"));
        assert!(!HarvestConfig::preset(Preset::Nextjs).expand_sections);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("harvest.json");
        let mut config = HarvestConfig::preset(Preset::Nextjs);
        config.strict = true;
        std::fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();

        let loaded = HarvestConfig::from_file(&path).unwrap();
        assert_eq!(loaded.base_url, "https://nextjs.org/docs");
        assert!(loaded.strict);

        assert!(HarvestConfig::from_file(dir.path().join("missing.json")).is_err());
    }
}
