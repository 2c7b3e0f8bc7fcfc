use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{info, warn};

use crate::traits::BrowserDriver;

/// Marker that search results have rendered.
pub(crate) const RESULTS_CONTAINER: &str = ".timeline";
/// The "load more" pagination control.
pub(crate) const LOAD_MORE: &str = ".show-more";

/// How long to wait for the results container before giving up on a page.
const WAIT_TIMEOUT: Duration = Duration::from_secs(5);
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(250);
/// Settle delay after clicking the pagination control.
const SETTLE_DELAY: Duration = Duration::from_secs(2);

/// Drives page loads and pagination on the one shared browser session.
/// Not reentrant — callers must serialize access (ScrapeSession's scrape
/// lock guarantees this).
pub struct Navigator {
    browser: Arc<dyn BrowserDriver>,
    base_url: String,
}

impl Navigator {
    pub fn new(browser: Arc<dyn BrowserDriver>, base_url: &str) -> Self {
        Self {
            browser,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn search_url(&self, term: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(term.as_bytes()).collect();
        format!("{}/search?f=tweets&q={}", self.base_url, encoded)
    }

    /// Load the search results page for `term` and wait for the results
    /// container. Returns `Ok(false)` on load failure or timeout — the
    /// mirror site is occasionally unavailable, and that is a zero-result
    /// outcome, not a hard error.
    pub async fn open(&self, term: &str) -> Result<bool> {
        let url = self.search_url(term);
        info!(url, "Opening search results");

        if let Err(e) = self.browser.goto(&url).await {
            warn!(url, error = %e, "Page load failed");
            return Ok(false);
        }

        // A driver error mid-wait is as transient as a timeout; both mean
        // this query gets zero results, not a failed request.
        match self.wait_for(RESULTS_CONTAINER).await {
            Ok(true) => Ok(true),
            Ok(false) => {
                warn!(url, "Results container did not appear within timeout");
                Ok(false)
            }
            Err(e) => {
                warn!(url, error = %e, "Element lookup failed while waiting for results");
                Ok(false)
            }
        }
    }

    /// Whether a pagination control is present on the current page.
    pub async fn has_more(&self) -> bool {
        match self.browser.find_all(LOAD_MORE).await {
            Ok(controls) => !controls.is_empty(),
            Err(e) => {
                warn!(error = %e, "Pagination control lookup failed");
                false
            }
        }
    }

    /// Click the pagination control and wait for the next batch to settle.
    /// Returns `Ok(false)` when the control is absent — end of results.
    pub async fn advance(&self) -> Result<bool> {
        let controls = self.browser.find_all(LOAD_MORE).await?;
        let Some(control) = controls.first() else {
            info!("No pagination control, end of results");
            return Ok(false);
        };

        self.browser.click_via_script(control).await?;
        tokio::time::sleep(SETTLE_DELAY).await;
        Ok(true)
    }

    /// Poll for a selector until it matches or `WAIT_TIMEOUT` elapses.
    /// The WebDriver protocol has no server-side wait, so this is the
    /// client-side equivalent of an explicit wait.
    async fn wait_for(&self, selector: &str) -> Result<bool> {
        let deadline = tokio::time::Instant::now() + WAIT_TIMEOUT;
        loop {
            if !self.browser.find_all(selector).await?.is_empty() {
                return Ok(true);
            }
            if tokio::time::Instant::now() >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(WAIT_POLL_INTERVAL).await;
        }
    }
}
