use crate::error::Result;
use crate::filter::LinkFilter;
use crate::renderer::PageRenderer;
use url::Url;

/// What expanding a single top-level section produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionOutcome {
    /// Links visible once the section was revealed
    Expanded(Vec<Url>),
    /// The section could not be revealed; the run carries on without it
    Skipped { reason: String },
}

/// Reveals navigation groups that only render after their entry is clicked
///
/// Every section starts from a freshly loaded seed page so expansion state
/// never leaks between sections.
#[derive(Debug, Clone, Copy)]
pub struct NavigationExpander<'a> {
    seed_url: &'a Url,
    filter: &'a LinkFilter,
}

impl<'a> NavigationExpander<'a> {
    pub fn new(seed_url: &'a Url, filter: &'a LinkFilter) -> Self {
        Self { seed_url, filter }
    }

    /// Reload the seed, click the anchor linking to `target`, and collect the
    /// links visible once the DOM settles
    pub async fn expand_section<R>(&self, renderer: &mut R, target: &Url) -> Result<SectionOutcome>
    where
        R: PageRenderer + ?Sized,
    {
        let attempt = async {
            renderer.render(self.seed_url).await?;
            renderer.activate(target).await?;
            renderer.settle_dom().await
        };

        match attempt.await {
            Ok(page) => Ok(SectionOutcome::Expanded(page.links(self.filter))),
            Err(e) if e.is_per_page() => Ok(SectionOutcome::Skipped {
                reason: e.to_string(),
            }),
            Err(e) => Err(e),
        }
    }
}
