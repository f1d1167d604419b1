pub mod html;
pub mod text;

#[cfg(test)]
mod tests;

use crate::filter::LinkFilter;
use url::Url;

/// A page as currently rendered by the browser session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    /// URL the browser reports after navigation settled
    pub url: Url,
    /// Serialized DOM
    pub html: String,
}

impl RenderedPage {
    pub fn new(url: Url, html: impl Into<String>) -> Self {
        Self {
            url,
            html: html.into(),
        }
    }

    /// Links on this page accepted by `filter`
    pub fn links(&self, filter: &LinkFilter) -> Vec<Url> {
        html::extract_links(&self.html, &self.url, filter)
    }

    /// Readable text of this page
    pub fn text(&self) -> String {
        html::extract_text(&self.html)
    }
}
