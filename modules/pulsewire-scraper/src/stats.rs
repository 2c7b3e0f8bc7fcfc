/// Counters from one scrape run. Logged for observability; per-post
/// failures are recorded here rather than returned to the caller.
#[derive(Debug, Default)]
pub struct ScrapeStats {
    pub pages_scraped: u32,
    pub items_seen: u32,
    pub posts_skipped: u32,
    pub posts_failed: u32,
    pub posts_returned: u32,
}

impl std::fmt::Display for ScrapeStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "pages={} items={} skipped={} failed={} returned={}",
            self.pages_scraped,
            self.items_seen,
            self.posts_skipped,
            self.posts_failed,
            self.posts_returned
        )
    }
}
