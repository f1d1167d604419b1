use crate::archive::Archiver;
use crate::config::SeedConfig;
use crate::crawlers::expander::{NavigationExpander, SectionOutcome};
use crate::error::Result;
use crate::frontier::{DiscoveryLog, Frontier};
use crate::policy::{Completion, CompletionPolicy};
use crate::renderer::PageRenderer;
use crate::results::RunSummary;

/// Progress of a harvest run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    SeedLoaded,
    TopLevelDiscovered { links: usize },
    Expanding { section: usize, of: usize },
    Deduplicated { links: usize },
    Archiving { pages: usize },
    Done,
}

/// Drives one documentation harvest over a borrowed browser session
///
/// The run goes seed fetch, top-level discovery, per-section expansion,
/// deduplication, then archiving. Only setup failures (output directory,
/// seed page) and write failures end it early.
pub struct DocsCrawler<'a, R: PageRenderer + ?Sized> {
    renderer: &'a mut R,
    seed: &'a SeedConfig,
    policy: &'a dyn CompletionPolicy,
    state: RunState,
}

impl<'a, R: PageRenderer + ?Sized> DocsCrawler<'a, R> {
    pub fn new(renderer: &'a mut R, seed: &'a SeedConfig, policy: &'a dyn CompletionPolicy) -> Self {
        Self {
            renderer,
            seed,
            policy,
            state: RunState::Idle,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    fn transition(&mut self, next: RunState) {
        ::log::debug!("Run state {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Run the harvest to completion
    pub async fn run(&mut self) -> Result<RunSummary> {
        let seed = self.seed;
        ::log::info!("Starting harvest of {}", seed.base_url);

        let archiver = Archiver::new(&seed.save_dir)
            .with_text_dir(seed.text_dir.clone())
            .with_page_delay(seed.page_delay);
        archiver.prepare().await?;

        let frontier = self.discover(&archiver).await?;

        self.transition(RunState::Archiving {
            pages: frontier.len(),
        });
        let outcomes = archiver
            .archive_all(&mut *self.renderer, &seed.base_url, &frontier)
            .await?;

        let summary = RunSummary::from_outcomes(outcomes, self.policy.assess(frontier.len()));
        self.transition(RunState::Done);
        report(&summary);

        Ok(summary)
    }

    /// Build the frozen frontier from the seed page and its expanded sections
    async fn discover(&mut self, archiver: &Archiver) -> Result<Frontier> {
        let seed = self.seed;

        let seed_page = self.renderer.render(&seed.base_url).await?;
        self.transition(RunState::SeedLoaded);
        archiver.save_index(&seed_page).await?;

        let top_level = seed_page.links(&seed.filter);
        ::log::info!("Found {} top-level links", top_level.len());
        self.transition(RunState::TopLevelDiscovered {
            links: top_level.len(),
        });

        let mut discovered = DiscoveryLog::new();
        discovered.extend(top_level.iter().cloned());

        if seed.expand_sections {
            let expander = NavigationExpander::new(&seed.base_url, &seed.filter);
            let total = top_level.len();

            for (index, target) in top_level.iter().enumerate() {
                self.transition(RunState::Expanding {
                    section: index + 1,
                    of: total,
                });
                ::log::info!("Processing top-level link {}/{}: {}", index + 1, total, target);

                match expander.expand_section(&mut *self.renderer, target).await? {
                    SectionOutcome::Expanded(links) => {
                        ::log::info!("Found {} visible links after expanding {}", links.len(), target);
                        discovered.extend(links);
                    }
                    SectionOutcome::Skipped { reason } => {
                        ::log::warn!("Skipping section {}: {}", target, reason);
                    }
                }
            }
        }

        let frontier = discovered.freeze();
        ::log::info!("Frontier holds {} unique links", frontier.len());
        self.transition(RunState::Deduplicated {
            links: frontier.len(),
        });
        Ok(frontier)
    }
}

/// Run a harvest with `renderer` and return its summary
pub async fn harvest<R>(renderer: &mut R, seed: &SeedConfig, policy: &dyn CompletionPolicy) -> Result<RunSummary>
where
    R: PageRenderer + ?Sized,
{
    DocsCrawler::new(renderer, seed, policy).run().await
}

fn report(summary: &RunSummary) {
    for failed in &summary.failed_links {
        ::log::warn!("Not archived: {} ({})", failed.url, failed.reason);
    }

    ::log::info!(
        "Scraping completed. Total links: {}, saved: {}, failed: {}",
        summary.total_links,
        summary.saved_count,
        summary.failed_count()
    );

    if let Completion::LikelyIncomplete { found, threshold } = summary.completion {
        ::log::warn!(
            "Scraping appears to have failed: only {} links discovered (expected more than {})",
            found,
            threshold
        );
    }
}
