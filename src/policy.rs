use serde::{Deserialize, Serialize};

/// Frontier size at or below which a run is reported as likely incomplete
pub const DEFAULT_LIKELY_FAILURE_THRESHOLD: usize = 10;

/// Verdict of a completion policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Completion {
    Plausible,
    /// Discovery found suspiciously few pages, usually a changed site layout
    LikelyIncomplete { found: usize, threshold: usize },
}

impl Completion {
    pub fn is_plausible(&self) -> bool {
        matches!(self, Completion::Plausible)
    }
}

/// Sanity check applied to the frontier once discovery is done
pub trait CompletionPolicy: Send + Sync {
    fn assess(&self, frontier_size: usize) -> Completion;
}

/// Flags frontiers of `threshold` pages or fewer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinimumPageCount {
    pub threshold: usize,
}

impl MinimumPageCount {
    pub fn new(threshold: usize) -> Self {
        Self { threshold }
    }
}

impl Default for MinimumPageCount {
    fn default() -> Self {
        Self::new(DEFAULT_LIKELY_FAILURE_THRESHOLD)
    }
}

impl CompletionPolicy for MinimumPageCount {
    fn assess(&self, frontier_size: usize) -> Completion {
        if frontier_size <= self.threshold {
            Completion::LikelyIncomplete {
                found: frontier_size,
                threshold: self.threshold,
            }
        } else {
            Completion::Plausible
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimum_page_count() {
        let policy = MinimumPageCount::default();
        assert_eq!(
            policy.assess(3),
            Completion::LikelyIncomplete {
                found: 3,
                threshold: 10
            }
        );
        assert!(!policy.assess(10).is_plausible());
        assert!(policy.assess(11).is_plausible());

        assert!(MinimumPageCount::new(0).assess(1).is_plausible());
    }
}
