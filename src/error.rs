use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while harvesting a documentation site
#[derive(Debug, Error)]
pub enum HarvestError {
    /// The page failed to load or settle within the navigation timeout
    #[error("failed to load {url}: {cause}")]
    Navigation { url: String, cause: String },

    /// No anchor on the page links to the expansion target
    #[error("no element links to {href}")]
    ElementNotFound { href: String },

    /// Writing an archived page failed
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Creating the output directory failed
    #[error("failed to create {}: {source}", path.display())]
    Setup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The WebDriver session could not be created or used
    #[error("WebDriver session error: {0}")]
    Session(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid link predicate: {0}")]
    Predicate(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid pattern: {0}")]
    Regex(#[from] regex::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl HarvestError {
    pub fn navigation(url: impl ToString, cause: impl ToString) -> Self {
        Self::Navigation {
            url: url.to_string(),
            cause: cause.to_string(),
        }
    }

    /// Whether this error only affects the current page or section
    pub fn is_per_page(&self) -> bool {
        matches!(self, Self::Navigation { .. } | Self::ElementNotFound { .. })
    }
}

/// Result type for harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;
