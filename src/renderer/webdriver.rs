use super::{DomStability, NetworkQuiet, PageRenderer, SettleOptions};
use crate::error::{HarvestError, Result};
use crate::filter::relative_href;
use crate::parsers::RenderedPage;
use async_trait::async_trait;
use fantoccini::error::CmdError;
use fantoccini::wd::TimeoutConfiguration;
use fantoccini::{Client, ClientBuilder};
use serde_json::{Map, Value, json};
use std::time::{Duration, Instant};
use url::Url;

/// Common local WebDriver endpoints tried when the configured one is down
const FALLBACK_WEBDRIVER_URLS: &[&str] = &[
    "http://localhost:9515", // ChromeDriver default
    "http://localhost:4444", // geckodriver / Selenium default
    "http://127.0.0.1:4444",
];

// Resource entries are drained into a per-document running total so the
// browser's timing buffer (250 entries by default) never fills up
const NETWORK_PROBE: &str = "\
const drained = performance.getEntriesByType('resource').length; \
performance.clearResourceTimings(); \
window.__harvestRequests = (window.__harvestRequests || 0) + drained; \
return [document.readyState, window.__harvestRequests];";

const DOM_PROBE: &str = "return [document.getElementsByTagName('*').length, \
     document.querySelectorAll('a[href]').length];";

const ACTIVATE_ANCHOR: &str = r#"
const [absolute, relative] = arguments;
const anchor = Array.from(document.querySelectorAll('a[href]'))
  .find(a => a.getAttribute('href') === relative || a.href === absolute);
if (!anchor) {
  return false;
}
anchor.click();
return true;
"#;

/// Page renderer backed by a single WebDriver session
pub struct WebDriverRenderer {
    client: Client,
    settle: SettleOptions,
    last_requested: Option<Url>,
    closed: bool,
}

impl WebDriverRenderer {
    /// Open a browser session on the WebDriver server at `webdriver_url`
    pub async fn connect(webdriver_url: &str, headless: bool, settle: SettleOptions) -> Result<Self> {
        let client = connect_to_webdriver(webdriver_url, headless).await?;
        // The driver must give up on a hung load itself, or the next command
        // queues behind it on the same session
        if let Err(e) = client.update_timeouts(session_timeouts(&settle)).await {
            ::log::warn!("Failed to set WebDriver timeouts: {}", e);
        }
        Ok(Self {
            client,
            settle,
            last_requested: None,
            closed: false,
        })
    }

    async fn navigate_and_settle(&self, url: &Url) -> Result<RenderedPage> {
        self.client
            .goto(url.as_str())
            .await
            .map_err(|e| navigation_error(e, "navigating to", url))?;

        self.wait_for_network_idle(url).await?;
        self.snapshot(url).await
    }

    async fn wait_for_network_idle(&self, url: &Url) -> Result<()> {
        let mut quiet = NetworkQuiet::new(
            self.settle.max_inflight_requests,
            self.settle.network_quiet(),
        );

        loop {
            let probe = self
                .client
                .execute(NETWORK_PROBE, Vec::new())
                .await
                .map_err(|e| navigation_error(e, "probing network on", url))?;

            let ready = probe[0].as_str() == Some("complete");
            let requests = probe[1].as_u64().unwrap_or(0) as usize;
            if quiet.observe(requests, Instant::now()) && ready {
                ::log::trace!("Network idle on {} after {} requests", url, requests);
                return Ok(());
            }

            tokio::time::sleep(self.settle.poll_interval()).await;
        }
    }

    async fn snapshot(&self, requested: &Url) -> Result<RenderedPage> {
        let html = self
            .client
            .source()
            .await
            .map_err(|e| navigation_error(e, "getting source for", requested))?;
        let url = self
            .client
            .current_url()
            .await
            .map_err(|e| navigation_error(e, "reading URL of", requested))?;

        Ok(RenderedPage::new(url, html))
    }
}

#[async_trait]
impl PageRenderer for WebDriverRenderer {
    async fn render(&mut self, url: &Url) -> Result<RenderedPage> {
        self.last_requested = Some(url.clone());
        let limit = self.settle.navigation_timeout();
        match tokio::time::timeout(limit, self.navigate_and_settle(url)).await {
            Ok(result) => result,
            Err(_) => Err(HarvestError::navigation(
                url,
                format!("page did not settle within {}s", limit.as_secs()),
            )),
        }
    }

    async fn activate(&mut self, target: &Url) -> Result<()> {
        let current = self
            .client
            .current_url()
            .await
            .map_err(|e| navigation_error(e, "reading URL before activating", target))?;
        let relative = relative_href(target, &current);

        let clicked = self
            .client
            .execute(
                ACTIVATE_ANCHOR,
                vec![json!(target.as_str()), json!(relative.as_str())],
            )
            .await
            .map_err(|e| navigation_error(e, "activating", target))?;

        if clicked.as_bool() == Some(true) {
            Ok(())
        } else {
            Err(HarvestError::ElementNotFound { href: relative })
        }
    }

    async fn settle_dom(&mut self) -> Result<RenderedPage> {
        let current = match self.client.current_url().await {
            Ok(url) => url,
            Err(e) => {
                return Err(match &self.last_requested {
                    Some(url) => navigation_error(e, "reading URL before settling", url),
                    None => HarvestError::Session(e.to_string()),
                });
            }
        };

        let started = Instant::now();
        let mut stability = DomStability::new(self.settle.dom_stable_polls);

        loop {
            let probe = self
                .client
                .execute(DOM_PROBE, Vec::new())
                .await
                .map_err(|e| navigation_error(e, "probing DOM on", &current))?;

            let fingerprint = (probe[0].as_u64().unwrap_or(0), probe[1].as_u64().unwrap_or(0));
            if stability.observe(fingerprint) {
                break;
            }
            if started.elapsed() >= self.settle.dom_settle_timeout() {
                ::log::warn!(
                    "DOM on {} still changing after {}ms, using current state",
                    current,
                    self.settle.dom_settle_timeout_ms
                );
                break;
            }

            tokio::time::sleep(self.settle.poll_interval()).await;
        }

        self.snapshot(&current).await
    }

    async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.client
            .clone()
            .close()
            .await
            .map_err(|e| HarvestError::Session(e.to_string()))
    }
}

/// Page-load and script limits matching the navigation timeout
fn session_timeouts(settle: &SettleOptions) -> TimeoutConfiguration {
    let limit = settle.navigation_timeout();
    TimeoutConfiguration::new(Some(limit), Some(limit), Some(Duration::ZERO))
}

/// Session capabilities requesting a headless browser
fn capabilities(headless: bool) -> Map<String, Value> {
    let mut caps = Map::new();
    if headless {
        caps.insert(
            "goog:chromeOptions".to_string(),
            json!({ "args": ["--headless=new", "--disable-gpu", "--no-sandbox"] }),
        );
        caps.insert(
            "moz:firefoxOptions".to_string(),
            json!({ "args": ["-headless"] }),
        );
    }
    caps
}

/// Connects to the WebDriver instance, trying common local endpoints on failure
async fn connect_to_webdriver(webdriver_url: &str, headless: bool) -> Result<Client> {
    let mut builder = ClientBuilder::native();
    builder.capabilities(capabilities(headless));

    let first_error = match builder.connect(webdriver_url).await {
        Ok(client) => {
            ::log::debug!("Connected to WebDriver at {}", webdriver_url);
            return Ok(client);
        }
        Err(e) => {
            ::log::error!("Failed to connect to WebDriver at {}: {}", webdriver_url, e);
            e.to_string()
        }
    };

    for url in FALLBACK_WEBDRIVER_URLS {
        if *url == webdriver_url {
            continue;
        }

        ::log::info!("Trying fallback WebDriver URL: {}", url);
        if let Ok(client) = builder.connect(url).await {
            ::log::debug!("Connected to fallback WebDriver at {}", url);
            return Ok(client);
        }
    }

    ::log::error!(
        "Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable"
    );
    Err(HarvestError::Session(format!(
        "could not connect to {webdriver_url}: {first_error}"
    )))
}

/// Maps a WebDriver command failure to a navigation error for `url`
fn navigation_error(error: CmdError, context: &str, url: &Url) -> HarvestError {
    let message = error.to_string();
    if message.contains("Unable to find session") || message.contains("invalid session id") {
        ::log::warn!("Lost WebDriver session while {} {}", context, url);
    } else {
        ::log::debug!("Failed {} {}: {}", context, url, message);
    }
    HarvestError::navigation(url, format!("{context} failed: {message}"))
}
