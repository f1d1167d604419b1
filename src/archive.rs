use crate::error::{HarvestError, Result};
use crate::frontier::Frontier;
use crate::parsers::RenderedPage;
use crate::renderer::PageRenderer;
use crate::results::PageOutcome;
use crate::utils::{sanitize_segment, truncate_stem};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Filename of the seed page and of URLs without path segments
pub const INDEX_FILENAME: &str = "index.html";

/// Derive the archive filename for a URL
///
/// Non-empty path segments are joined with `_` and suffixed `.html`, so
/// `https://site/a/b` maps to `a_b.html`. The result depends on the URL path
/// only, which lets a replayed run overwrite its earlier files. An existing
/// extension is kept (`intro.html` becomes `intro.html.html`) so it cannot
/// collide with the extension-less path.
pub fn filename_for(url: &Url) -> String {
    format!("{}.html", file_stem_for(url))
}

/// [`filename_for`] without the extension
pub fn file_stem_for(url: &Url) -> String {
    let segments: Vec<String> = url
        .path_segments()
        .map(|segments| {
            segments
                .filter(|s| !s.is_empty())
                .map(sanitize_segment)
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default();

    let stem = segments.join("_");
    if stem.is_empty() {
        return "index".to_string();
    }
    truncate_stem(stem, url.path())
}

/// Writes rendered pages into a save directory
#[derive(Debug, Clone)]
pub struct Archiver {
    save_dir: PathBuf,
    text_dir: Option<PathBuf>,
    page_delay: Duration,
}

impl Archiver {
    pub fn new(save_dir: impl Into<PathBuf>) -> Self {
        Self {
            save_dir: save_dir.into(),
            text_dir: None,
            page_delay: Duration::ZERO,
        }
    }

    /// Also write the extracted text of every page into `text_dir`
    pub fn with_text_dir(mut self, text_dir: Option<PathBuf>) -> Self {
        self.text_dir = text_dir;
        self
    }

    /// Pause between page fetches
    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }

    /// Create the output directories; must succeed before anything is written
    pub async fn prepare(&self) -> Result<()> {
        create_dir(&self.save_dir).await?;
        if let Some(text_dir) = &self.text_dir {
            create_dir(text_dir).await?;
        }
        Ok(())
    }

    /// Store the seed page as `index.html`
    pub async fn save_index(&self, page: &RenderedPage) -> Result<PathBuf> {
        let path = self.write_page(INDEX_FILENAME, page).await?;
        ::log::info!("Saved seed page {} to {}", page.url, path.display());
        Ok(path)
    }

    /// Render and store every frontier link in order
    ///
    /// A navigation failure is recorded as [`PageOutcome::Failed`] and the
    /// loop moves on; write failures abort the run.
    pub async fn archive_all<R>(
        &self,
        renderer: &mut R,
        base_url: &Url,
        frontier: &Frontier,
    ) -> Result<Vec<PageOutcome>>
    where
        R: PageRenderer + ?Sized,
    {
        self.prepare().await?;

        let total = frontier.len();
        let mut outcomes = Vec::with_capacity(total);

        for (index, link) in frontier.iter().enumerate() {
            ::log::debug!("Archiving {}/{}: {}", index + 1, total, link);
            let outcome = self.archive_one(renderer, base_url, link).await?;
            outcomes.push(outcome);

            if !self.page_delay.is_zero() && index + 1 < total {
                tokio::time::sleep(self.page_delay).await;
            }
        }

        Ok(outcomes)
    }

    /// Render and store a single link
    pub async fn archive_one<R>(
        &self,
        renderer: &mut R,
        base_url: &Url,
        link: &Url,
    ) -> Result<PageOutcome>
    where
        R: PageRenderer + ?Sized,
    {
        // Frontier links are absolute already; join is a no-op for them
        let url = base_url.join(link.as_str())?;

        let page = match renderer.render(&url).await {
            Ok(page) => page,
            Err(e) if e.is_per_page() => {
                ::log::error!("Failed to scrape {}: {}", url, e);
                return Ok(PageOutcome::Failed {
                    url: url.to_string(),
                    reason: e.to_string(),
                });
            }
            Err(e) => return Err(e),
        };

        let filename = filename_for(&url);
        let path = self.write_page(&filename, &page).await?;
        ::log::info!("Saved {} to {}", url, path.display());

        Ok(PageOutcome::Saved {
            url: url.to_string(),
            filename,
        })
    }

    async fn write_page(&self, filename: &str, page: &RenderedPage) -> Result<PathBuf> {
        let path = self.save_dir.join(filename);
        write_file(&path, page.html.as_bytes()).await?;

        if let Some(text_dir) = &self.text_dir {
            let text_path = text_dir.join(Path::new(filename).with_extension("txt"));
            write_file(&text_path, page.text().as_bytes()).await?;
        }

        Ok(path)
    }
}

async fn create_dir(path: &Path) -> Result<()> {
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|source| HarvestError::Setup {
            path: path.to_path_buf(),
            source,
        })
}

/// Write `contents` to `path`, replacing any existing file
pub(crate) async fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    tokio::fs::write(path, contents)
        .await
        .map_err(|source| HarvestError::Write {
            path: path.to_path_buf(),
            source,
        })
}
