use crate::policy::Completion;
use serde::{Deserialize, Serialize};

/// Result of archiving a single frontier link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PageOutcome {
    Saved { url: String, filename: String },
    Failed { url: String, reason: String },
}

impl PageOutcome {
    pub fn url(&self) -> &str {
        match self {
            PageOutcome::Saved { url, .. } | PageOutcome::Failed { url, .. } => url,
        }
    }

    pub fn is_saved(&self) -> bool {
        matches!(self, PageOutcome::Saved { .. })
    }
}

/// A page written to the archive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedPage {
    pub url: String,
    pub filename: String,
}

/// A frontier link that could not be archived
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedLink {
    pub url: String,
    pub reason: String,
}

/// Aggregate outcome of a harvest run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Size of the frontier
    pub total_links: usize,
    pub saved_count: usize,
    pub saved: Vec<SavedPage>,
    pub failed_links: Vec<FailedLink>,
    /// Verdict of the completion policy on the frontier size
    pub completion: Completion,
}

impl RunSummary {
    /// Build the summary from per-link outcomes in archive order
    pub fn from_outcomes(outcomes: Vec<PageOutcome>, completion: Completion) -> Self {
        let total_links = outcomes.len();
        let mut saved = Vec::new();
        let mut failed_links = Vec::new();

        for outcome in outcomes {
            match outcome {
                PageOutcome::Saved { url, filename } => saved.push(SavedPage { url, filename }),
                PageOutcome::Failed { url, reason } => failed_links.push(FailedLink { url, reason }),
            }
        }

        Self {
            total_links,
            saved_count: saved.len(),
            saved,
            failed_links,
            completion,
        }
    }

    pub fn failed_count(&self) -> usize {
        self.failed_links.len()
    }

    /// Whether the run should be reported as failed
    ///
    /// Per-link failures only count when `strict` is set. The completion
    /// heuristic never fails a run.
    pub fn is_failure(&self, strict: bool) -> bool {
        strict && !self.failed_links.is_empty()
    }
}
