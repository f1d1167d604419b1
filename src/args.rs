use clap::{Args as ClapArgs, Parser, Subcommand};
use doc_harvest::{HarvestConfig, Preset, Result};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "doc-harvest")]
#[command(about = "Archives documentation sites rendered in a headless browser")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Discover and archive the pages of a documentation site
    Crawl(CrawlArgs),
    /// Convert archived HTML pages to plain text
    Convert(ConvertArgs),
}

#[derive(ClapArgs, Debug)]
pub struct CrawlArgs {
    /// Seed URL (overrides the config file or preset)
    pub url: Option<String>,

    /// JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Built-in site preset
    #[arg(long, value_enum, conflicts_with = "config")]
    pub preset: Option<Preset>,

    /// Href path prefix or selector rule to follow (repeatable)
    #[arg(short, long = "predicate")]
    pub predicates: Vec<String>,

    /// Directory receiving the archived pages
    #[arg(short, long)]
    pub save_dir: Option<PathBuf>,

    /// Also write plain-text copies into this directory
    #[arg(long)]
    pub text_dir: Option<PathBuf>,

    /// Only archive links visible on the seed page
    #[arg(long)]
    pub no_expand: bool,

    /// WebDriver server URL
    #[arg(long)]
    pub webdriver_url: Option<String>,

    /// Show the browser window
    #[arg(long)]
    pub headful: bool,

    /// Navigation timeout in seconds
    #[arg(long)]
    pub navigation_timeout: Option<u64>,

    /// Pause between archived pages in milliseconds
    #[arg(long)]
    pub page_delay: Option<u64>,

    /// Flag runs discovering this many pages or fewer as likely incomplete
    #[arg(long)]
    pub likely_failure_threshold: Option<usize>,

    /// Exit non-zero when any page could not be archived
    #[arg(long)]
    pub strict: bool,

    /// Write the run summary as JSON to this file
    #[arg(long)]
    pub summary: Option<PathBuf>,
}

#[derive(ClapArgs, Debug)]
pub struct ConvertArgs {
    /// Directory of archived HTML pages
    pub html_dir: PathBuf,

    /// Output directory for text files
    pub text_dir: PathBuf,
}

impl CrawlArgs {
    /// Build the run configuration: config file or preset, then flags
    pub fn to_config(&self) -> Result<HarvestConfig> {
        let mut config = if let Some(path) = &self.config {
            HarvestConfig::from_file(path)?
        } else if let Some(preset) = self.preset {
            HarvestConfig::preset(preset)
        } else {
            let url = self.url.as_deref().ok_or_else(|| {
                doc_harvest::HarvestError::Config(
                    "a seed URL, --config or --preset is required".to_string(),
                )
            })?;
            HarvestConfig::new(url, Vec::new())
        };

        if let Some(url) = &self.url {
            config.base_url = url.clone();
        }
        if !self.predicates.is_empty() {
            config.link_predicates = self.predicates.clone();
        }
        if let Some(dir) = &self.save_dir {
            config.save_dir = dir.clone();
        }
        if let Some(dir) = &self.text_dir {
            config.text_dir = Some(dir.clone());
        }
        if self.no_expand {
            config.expand_sections = false;
        }
        if let Some(url) = &self.webdriver_url {
            config.webdriver_url = url.clone();
        }
        if self.headful {
            config.headless = false;
        }
        if let Some(secs) = self.navigation_timeout {
            config.settle.navigation_timeout_secs = secs;
        }
        if let Some(ms) = self.page_delay {
            config.page_delay_ms = ms;
        }
        if let Some(threshold) = self.likely_failure_threshold {
            config.likely_failure_threshold = threshold;
        }
        if self.strict {
            config.strict = true;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crawl(argv: &[&str]) -> CrawlArgs {
        let args = Args::try_parse_from(argv).unwrap();
        match args.command {
            Command::Crawl(crawl) => crawl,
            Command::Convert(_) => panic!("expected crawl"),
        }
    }

    #[test]
    fn test_flags_override_preset() {
        let args = crawl(&[
            "doc-harvest",
            "crawl",
            "--preset",
            "react",
            "--save-dir",
            "out",
            "--no-expand",
            "--strict",
            "-p",
            "/learn",
        ]);
        let config = args.to_config().unwrap();

        assert_eq!(config.base_url, "https://react.dev");
        assert_eq!(config.link_predicates, vec!["/learn"]);
        assert_eq!(config.save_dir, PathBuf::from("out"));
        assert!(!config.expand_sections);
        assert!(config.strict);
    }

    #[test]
    fn test_url_and_predicates() {
        let args = crawl(&["doc-harvest", "crawl", "https://example.com/docs", "-p", "/docs"]);
        let config = args.to_config().unwrap();

        assert_eq!(config.base_url, "https://example.com/docs");
        assert!(config.seed().is_ok());
    }

    #[test]
    fn test_missing_seed() {
        assert!(crawl(&["doc-harvest", "crawl"]).to_config().is_err());
        assert!(Args::try_parse_from(["doc-harvest", "crawl", "--preset", "gatsby"]).is_err());
    }

    #[test]
    fn test_convert_args() {
        let args = Args::try_parse_from(["doc-harvest", "convert", "raw", "text"]).unwrap();
        let Command::Convert(convert) = args.command else {
            panic!("expected convert");
        };
        assert_eq!(convert.html_dir, PathBuf::from("raw"));
        assert_eq!(convert.text_dir, PathBuf::from("text"));
    }
}
