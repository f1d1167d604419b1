//! In-memory renderer serving fixed HTML fixtures

use super::PageRenderer;
use crate::error::{HarvestError, Result};
use crate::filter::relative_href;
use crate::parsers::RenderedPage;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use url::Url;

#[derive(Debug, Default)]
pub struct FakeRenderer {
    pages: HashMap<String, String>,
    expansions: HashMap<String, String>,
    failing: HashSet<String>,
    detached: HashSet<String>,
    current: Option<RenderedPage>,
    pub visits: Vec<String>,
    pub activations: Vec<String>,
    pub closed: bool,
}

impl FakeRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `html` for `url`
    pub fn page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    /// Replace the current DOM with `html` when the anchor to `target` is clicked
    pub fn expansion(mut self, target: &str, html: &str) -> Self {
        self.expansions.insert(target.to_string(), html.to_string());
        self
    }

    /// Fail navigation to `url`
    pub fn failing(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }

    /// Make the anchor to `target` impossible to locate
    pub fn detached(mut self, target: &str) -> Self {
        self.detached.insert(target.to_string());
        self
    }

    fn current(&self) -> Result<&RenderedPage> {
        self.current
            .as_ref()
            .ok_or_else(|| HarvestError::Session("no page loaded".to_string()))
    }
}

/// A minimal page linking to `hrefs`
pub fn nav_page(hrefs: &[&str]) -> String {
    let anchors: String = hrefs
        .iter()
        .map(|href| format!("<a href=\"{href}\">{href}</a>"))
        .collect();
    format!("<html><body><nav>{anchors}</nav></body></html>")
}

#[async_trait]
impl PageRenderer for FakeRenderer {
    async fn render(&mut self, url: &Url) -> Result<RenderedPage> {
        self.visits.push(url.to_string());

        if self.failing.contains(url.as_str()) {
            return Err(HarvestError::navigation(url, "navigation timeout"));
        }
        let Some(html) = self.pages.get(url.as_str()) else {
            return Err(HarvestError::navigation(url, "net::ERR_NAME_NOT_RESOLVED"));
        };

        let page = RenderedPage::new(url.clone(), html.clone());
        self.current = Some(page.clone());
        Ok(page)
    }

    async fn activate(&mut self, target: &Url) -> Result<()> {
        let current = self.current()?;
        let url = current.url.clone();
        let relative = relative_href(target, &url);
        let linked = current.html.contains(&format!("href=\"{relative}\""))
            || current.html.contains(&format!("href=\"{target}\""));

        if !linked || self.detached.contains(target.as_str()) {
            return Err(HarvestError::ElementNotFound { href: relative });
        }

        self.activations.push(target.to_string());
        if let Some(html) = self.expansions.get(target.as_str()) {
            self.current = Some(RenderedPage::new(url, html.clone()));
        }
        Ok(())
    }

    async fn settle_dom(&mut self) -> Result<RenderedPage> {
        self.current().cloned()
    }

    async fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}
