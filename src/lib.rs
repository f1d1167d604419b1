// Re-export modules
pub mod archive;
pub mod config;
pub mod convert;
pub mod crawlers;
pub mod error;
pub mod filter;
pub mod frontier;
pub mod parsers;
pub mod policy;
pub mod renderer;
pub mod results;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::{HarvestConfig, Preset, SeedConfig};
pub use error::{HarvestError, Result};
pub use results::RunSummary;

use policy::{CompletionPolicy, MinimumPageCount};
use renderer::{PageRenderer, WebDriverRenderer};

/// Main builder for a documentation harvest
pub struct Harvest {
    config: HarvestConfig,
    policy: Box<dyn CompletionPolicy>,
}

impl Harvest {
    /// Create a new Harvest builder from a configuration
    pub fn new(config: HarvestConfig) -> Self {
        let policy = Box::new(MinimumPageCount::new(config.likely_failure_threshold));
        Self { config, policy }
    }

    /// Start from one of the built-in site presets
    pub fn preset(preset: Preset) -> Self {
        Self::new(HarvestConfig::preset(preset))
    }

    /// Load configuration from a file
    pub fn with_config_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        Ok(Self::new(HarvestConfig::from_file(path)?))
    }

    /// Replace the default completion policy
    pub fn with_policy(mut self, policy: impl CompletionPolicy + 'static) -> Self {
        self.policy = Box::new(policy);
        self
    }

    pub fn config(&self) -> &HarvestConfig {
        &self.config
    }

    /// Connect to WebDriver and run the harvest
    pub async fn run(self) -> Result<RunSummary> {
        let seed = self.config.seed()?;

        // Override the WebDriver URL with an environment variable if provided
        let webdriver_url = match std::env::var("WEBDRIVER_URL") {
            Ok(url) if !url.is_empty() => url,
            _ => self.config.webdriver_url.clone(),
        };

        let mut renderer = WebDriverRenderer::connect(
            &webdriver_url,
            self.config.headless,
            self.config.settle.clone(),
        )
        .await?;

        let result = crawlers::harvest(&mut renderer, &seed, self.policy.as_ref()).await;

        if let Err(e) = renderer.close().await {
            ::log::warn!("Failed to close browser session: {}", e);
        }
        result
    }
}
