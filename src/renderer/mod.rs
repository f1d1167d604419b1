pub mod webdriver;

#[cfg(test)]
pub(crate) mod fake;

use crate::error::Result;
use crate::parsers::RenderedPage;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use url::Url;

pub use webdriver::WebDriverRenderer;

/// A browser session that can load and interact with one page at a time
///
/// Implementations own their session; every call acts on the page currently
/// loaded, so callers drive it strictly sequentially.
#[async_trait]
pub trait PageRenderer: Send {
    /// Navigate to `url` and return the page once network activity has settled
    ///
    /// Fails with [`crate::HarvestError::Navigation`] when the page does not
    /// load or settle within the navigation timeout.
    async fn render(&mut self, url: &Url) -> Result<RenderedPage>;

    /// Click the anchor on the current page that links to `target`
    ///
    /// Fails with [`crate::HarvestError::ElementNotFound`] when no anchor
    /// links to it.
    async fn activate(&mut self, target: &Url) -> Result<()>;

    /// Wait until the current DOM stops changing and return it
    async fn settle_dom(&mut self) -> Result<RenderedPage>;

    /// End the browser session
    async fn close(&mut self) -> Result<()>;
}

/// Timing knobs for navigation and DOM settling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettleOptions {
    /// Upper bound for navigation plus network settle, in seconds
    #[serde(default = "default_navigation_timeout_secs")]
    pub navigation_timeout_secs: u64,

    /// How long the network must stay idle, in milliseconds
    #[serde(default = "default_network_quiet_ms")]
    pub network_quiet_ms: u64,

    /// New requests per poll still counted as idle
    #[serde(default = "default_max_inflight_requests")]
    pub max_inflight_requests: usize,

    /// Delay between settle polls, in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Consecutive unchanged DOM polls required after an activation
    #[serde(default = "default_dom_stable_polls")]
    pub dom_stable_polls: usize,

    /// Upper bound for DOM settling after an activation, in milliseconds
    #[serde(default = "default_dom_settle_timeout_ms")]
    pub dom_settle_timeout_ms: u64,
}

fn default_navigation_timeout_secs() -> u64 {
    30
}

fn default_network_quiet_ms() -> u64 {
    500
}

fn default_max_inflight_requests() -> usize {
    2
}

fn default_poll_interval_ms() -> u64 {
    100
}

fn default_dom_stable_polls() -> usize {
    3
}

fn default_dom_settle_timeout_ms() -> u64 {
    5000
}

impl Default for SettleOptions {
    fn default() -> Self {
        Self {
            navigation_timeout_secs: default_navigation_timeout_secs(),
            network_quiet_ms: default_network_quiet_ms(),
            max_inflight_requests: default_max_inflight_requests(),
            poll_interval_ms: default_poll_interval_ms(),
            dom_stable_polls: default_dom_stable_polls(),
            dom_settle_timeout_ms: default_dom_settle_timeout_ms(),
        }
    }
}

impl SettleOptions {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    pub fn network_quiet(&self) -> Duration {
        Duration::from_millis(self.network_quiet_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn dom_settle_timeout(&self) -> Duration {
        Duration::from_millis(self.dom_settle_timeout_ms)
    }
}

/// Tracks network activity samples until a quiet period has elapsed
///
/// Each sample is the cumulative number of requests the page has issued.
/// A sample adding at most `max_new` requests keeps the quiet period going;
/// a larger jump restarts it.
#[derive(Debug)]
pub struct NetworkQuiet {
    max_new: usize,
    quiet_for: Duration,
    last_count: Option<usize>,
    quiet_since: Option<Instant>,
}

impl NetworkQuiet {
    pub fn new(max_new: usize, quiet_for: Duration) -> Self {
        Self {
            max_new,
            quiet_for,
            last_count: None,
            quiet_since: None,
        }
    }

    /// Record a sample taken at `now`; returns true once the network is idle
    pub fn observe(&mut self, request_count: usize, now: Instant) -> bool {
        let busy = match self.last_count {
            Some(last) => request_count.saturating_sub(last) > self.max_new,
            None => false,
        };
        self.last_count = Some(request_count);

        if busy {
            self.quiet_since = None;
            return false;
        }

        let since = *self.quiet_since.get_or_insert(now);
        now.duration_since(since) >= self.quiet_for
    }
}

/// Counts consecutive identical DOM fingerprints
#[derive(Debug)]
pub struct DomStability {
    required: usize,
    last: Option<(u64, u64)>,
    stable_polls: usize,
}

impl DomStability {
    pub fn new(required: usize) -> Self {
        Self {
            required: required.max(1),
            last: None,
            stable_polls: 0,
        }
    }

    /// Record `(element_count, anchor_count)`; returns true once stable
    pub fn observe(&mut self, fingerprint: (u64, u64)) -> bool {
        if self.last == Some(fingerprint) {
            self.stable_polls += 1;
        } else {
            self.stable_polls = 0;
            self.last = Some(fingerprint);
        }
        self.stable_polls >= self.required
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_quiet_waits_for_quiet_period() {
        let start = Instant::now();
        let mut quiet = NetworkQuiet::new(2, Duration::from_millis(500));

        assert!(!quiet.observe(10, start));
        assert!(!quiet.observe(11, start + Duration::from_millis(200)));
        assert!(quiet.observe(12, start + Duration::from_millis(500)));
    }

    #[test]
    fn test_network_burst_restarts_quiet_period() {
        let start = Instant::now();
        let mut quiet = NetworkQuiet::new(2, Duration::from_millis(500));

        assert!(!quiet.observe(10, start));
        assert!(!quiet.observe(20, start + Duration::from_millis(400)));
        assert!(!quiet.observe(20, start + Duration::from_millis(800)));
        assert!(quiet.observe(20, start + Duration::from_millis(1300)));
    }

    #[test]
    fn test_dom_stability() {
        let mut dom = DomStability::new(2);
        assert!(!dom.observe((100, 10)));
        assert!(!dom.observe((120, 14)));
        assert!(!dom.observe((120, 14)));
        assert!(dom.observe((120, 14)));
        assert!(!dom.observe((121, 14)));
    }

    #[test]
    fn test_settle_defaults() {
        let options: SettleOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options.navigation_timeout(), Duration::from_secs(30));
        assert_eq!(options.network_quiet(), Duration::from_millis(500));
        assert_eq!(options.max_inflight_requests, 2);
    }
}
