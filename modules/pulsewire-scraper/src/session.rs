use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use futures::future::join_all;
use tokio::sync::Mutex;
use tracing::{info, warn};

use pulsewire_common::{ClassifyErrorPolicy, Post, SearchQuery};

use crate::enricher::Enricher;
use crate::extractor::Extractor;
use crate::navigator::Navigator;
use crate::stats::ScrapeStats;
use crate::traits::{BrowserDriver, SentimentClassifier, Translator};

/// Result of one scrape run.
pub struct ScrapeOutcome {
    /// Page-then-DOM order, immutable once appended.
    pub posts: Vec<Post>,
    pub stats: ScrapeStats,
}

/// The long-lived bundle of browser session + enrichment backends, shared
/// across API requests. One per process; constructed at startup, torn down
/// on shutdown.
///
/// The browser session permits only one logical thread of navigation, so
/// `scrape_lock` serializes the entire navigate+extract sequence — not just
/// construction. Concurrent requests queue here; enrichment inside each run
/// still fans out across the worker pool.
pub struct ScrapeSession {
    browser: Arc<dyn BrowserDriver>,
    navigator: Navigator,
    extractor: Extractor,
    enricher: Enricher,
    default_page_budget: u32,
    scrape_lock: Mutex<()>,
    closed: AtomicBool,
}

impl ScrapeSession {
    pub fn new(
        browser: Arc<dyn BrowserDriver>,
        base_url: &str,
        translator: Arc<dyn Translator>,
        classifier: Arc<dyn SentimentClassifier>,
        enrich_workers: usize,
        on_classify_error: ClassifyErrorPolicy,
        default_page_budget: u32,
    ) -> Self {
        Self {
            navigator: Navigator::new(browser.clone(), base_url),
            extractor: Extractor::new(browser.clone()),
            enricher: Enricher::new(translator, classifier, enrich_workers, on_classify_error),
            browser,
            default_page_budget,
            scrape_lock: Mutex::new(()),
            closed: AtomicBool::new(false),
        }
    }

    /// Build a query with the session's configured page budget.
    pub fn query(&self, term: &str) -> SearchQuery {
        SearchQuery::new(term).with_page_budget(self.default_page_budget)
    }

    /// Run the extract → paginate loop for one query. Returns accumulated
    /// posts in page-then-DOM order; every recoverable failure along the
    /// way degrades to fewer results rather than an error.
    pub async fn scrape(&self, query: &SearchQuery) -> Result<ScrapeOutcome> {
        let _guard = self.scrape_lock.lock().await;

        let mut stats = ScrapeStats::default();
        let mut posts: Vec<Post> = Vec::new();

        info!(term = %query.term, page_budget = query.page_budget, "Scrape starting");

        if query.page_budget == 0 || !self.navigator.open(&query.term).await? {
            info!(term = %query.term, "Search results unavailable, returning zero results");
            return Ok(ScrapeOutcome { posts, stats });
        }

        loop {
            let page = match self.extractor.extract_current_page().await {
                Ok(page) => page,
                Err(e) => {
                    warn!(error = %e, "Page extraction failed, keeping partial results");
                    break;
                }
            };
            stats.pages_scraped += 1;
            stats.items_seen += (page.posts.len() as u32) + page.skipped;
            stats.posts_skipped += page.skipped;

            // Fan out the whole page to the enrichment pool, join before
            // paginating. join_all preserves input order, so the DOM order
            // of successful posts survives.
            let enriched = join_all(page.posts.into_iter().map(|raw| self.enricher.enrich(raw))).await;
            for result in enriched {
                match result {
                    Ok(post) => posts.push(post),
                    Err(e) => {
                        warn!(error = %e, "Post failed enrichment, excluded from results");
                        stats.posts_failed += 1;
                    }
                }
            }

            if stats.pages_scraped >= query.page_budget {
                break;
            }
            if !self.navigator.has_more().await {
                break;
            }
            match self.navigator.advance().await {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => {
                    warn!(error = %e, "Pagination failed, stopping");
                    break;
                }
            }
        }

        stats.posts_returned = posts.len() as u32;
        info!(term = %query.term, "Scrape complete: {stats}");
        Ok(ScrapeOutcome { posts, stats })
    }

    /// Tear down the browser session and stop the worker pool. Idempotent;
    /// later calls are no-ops.
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.enricher.shutdown();
        if let Err(e) = self.browser.close().await {
            warn!(error = %e, "Failed to close browser session");
        } else {
            info!("Browser session closed");
        }
    }
}
