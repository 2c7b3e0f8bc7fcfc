use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, warn};

use pulsewire_common::{EngagementCounts, RawPost};

use crate::traits::{BrowserDriver, ElementHandle};

pub(crate) const POST_ITEM: &str = ".timeline-item";
pub(crate) const POST_LINK: &str = ".tweet-link";
pub(crate) const USERNAME: &str = ".username";
pub(crate) const DISPLAY_NAME: &str = ".fullname";
pub(crate) const POST_DATE: &str = ".tweet-date";
pub(crate) const POST_BODY: &str = ".tweet-content";
pub(crate) const POST_STAT: &str = ".tweet-stat";
pub(crate) const AVATAR: &str = ".avatar.round";

/// One pass over a loaded page.
#[derive(Debug, Default)]
pub struct ExtractedPage {
    pub posts: Vec<RawPost>,
    /// Items dropped for missing required fields.
    pub skipped: u32,
}

/// Parses post elements off the session's current page. Field absence is
/// handled per field: optional fields get defaults, a missing required
/// field skips that single post and never the page.
pub struct Extractor {
    browser: Arc<dyn BrowserDriver>,
}

impl Extractor {
    pub fn new(browser: Arc<dyn BrowserDriver>) -> Self {
        Self { browser }
    }

    /// Extract every post element on the current page, in DOM order.
    /// An empty page yields an empty result — exhausted results are a
    /// valid state, distinct from a load failure.
    pub async fn extract_current_page(&self) -> Result<ExtractedPage> {
        let items = self.browser.find_all(POST_ITEM).await?;
        if items.is_empty() {
            debug!("No post elements on page");
            return Ok(ExtractedPage::default());
        }

        let mut page = ExtractedPage::default();
        for (index, item) in items.iter().enumerate() {
            match self.extract_post(item).await {
                Ok(Some(post)) => page.posts.push(post),
                Ok(None) => page.skipped += 1,
                Err(e) => {
                    warn!(index, error = %e, "Failed to extract post");
                    page.skipped += 1;
                }
            }
        }
        Ok(page)
    }

    async fn extract_post(&self, item: &ElementHandle) -> Result<Option<RawPost>> {
        let builder = RawPostBuilder {
            url: self.attr_of(item, POST_LINK, "href").await?,
            username: self.text_of(item, USERNAME).await?,
            display_name: self.text_of(item, DISPLAY_NAME).await?,
            posted_at: self.text_of(item, POST_DATE).await?,
            text: self.text_of(item, POST_BODY).await?,
        };

        let missing = builder.missing_fields();
        if !missing.is_empty() {
            warn!(missing = ?missing, "Skipping post with missing required fields");
            return Ok(None);
        }

        let mut stats = Vec::new();
        for stat in self.browser.find_all_in(item, POST_STAT).await? {
            stats.push(self.browser.text(&stat).await?.trim().to_string());
        }

        let avatar_url = self.attr_of(item, AVATAR, "src").await?;

        Ok(Some(builder.build(counts_from_stats(&stats), avatar_url)))
    }

    async fn text_of(&self, item: &ElementHandle, selector: &str) -> Result<Option<String>> {
        match self.browser.find_in(item, selector).await? {
            Some(el) => Ok(Some(self.browser.text(&el).await?.trim().to_string())),
            None => Ok(None),
        }
    }

    async fn attr_of(
        &self,
        item: &ElementHandle,
        selector: &str,
        name: &str,
    ) -> Result<Option<String>> {
        match self.browser.find_in(item, selector).await? {
            Some(el) => Ok(self.browser.attribute(&el, name).await?),
            None => Ok(None),
        }
    }
}

/// Required-field accumulator. Absent fields are recorded by name instead
/// of aborting extraction mid-post.
struct RawPostBuilder {
    url: Option<String>,
    username: Option<String>,
    display_name: Option<String>,
    posted_at: Option<String>,
    text: Option<String>,
}

impl RawPostBuilder {
    fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.url.is_none() {
            missing.push("link");
        }
        if self.username.is_none() {
            missing.push("username");
        }
        if self.display_name.is_none() {
            missing.push("display_name");
        }
        if self.posted_at.is_none() {
            missing.push("date");
        }
        if self.text.is_none() {
            missing.push("body");
        }
        missing
    }

    /// Callers must check `missing_fields` first.
    fn build(self, counts: EngagementCounts, avatar_url: Option<String>) -> RawPost {
        RawPost {
            url: self.url.unwrap_or_default(),
            username: self.username.unwrap_or_default(),
            display_name: self.display_name.unwrap_or_default(),
            posted_at: self.posted_at.unwrap_or_default(),
            text: self.text.unwrap_or_default(),
            counts,
            avatar_url,
        }
    }
}

/// Map up to four positional stat values onto the engagement slots; any
/// slot beyond the available count defaults to "0".
fn counts_from_stats(stats: &[String]) -> EngagementCounts {
    let slot = |i: usize| {
        stats
            .get(i)
            .filter(|s| !s.is_empty())
            .cloned()
            .unwrap_or_else(|| "0".to_string())
    };
    EngagementCounts {
        replies: slot(0),
        reshares: slot(1),
        quotes: slot(2),
        likes: slot(3),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn full_stat_row_maps_positionally() {
        let counts = counts_from_stats(&stats(&["5", "12", "3", "99"]));
        assert_eq!(counts.replies, "5");
        assert_eq!(counts.reshares, "12");
        assert_eq!(counts.quotes, "3");
        assert_eq!(counts.likes, "99");
    }

    #[test]
    fn missing_trailing_stats_default_to_zero() {
        let counts = counts_from_stats(&stats(&["5"]));
        assert_eq!(counts.replies, "5");
        assert_eq!(counts.reshares, "0");
        assert_eq!(counts.quotes, "0");
        assert_eq!(counts.likes, "0");

        let counts = counts_from_stats(&stats(&["5", "12", "3"]));
        assert_eq!(counts.quotes, "3");
        assert_eq!(counts.likes, "0");
    }

    #[test]
    fn empty_stat_row_defaults_everything() {
        let counts = counts_from_stats(&[]);
        assert_eq!(counts, EngagementCounts::default());
    }

    #[test]
    fn blank_stat_values_default_to_zero() {
        let counts = counts_from_stats(&stats(&["", "7"]));
        assert_eq!(counts.replies, "0");
        assert_eq!(counts.reshares, "7");
    }

    #[test]
    fn builder_names_missing_required_fields() {
        let builder = RawPostBuilder {
            url: Some("https://example.net/s/1".to_string()),
            username: None,
            display_name: Some("Name".to_string()),
            posted_at: Some("Jan 1".to_string()),
            text: None,
        };
        assert_eq!(builder.missing_fields(), vec!["username", "body"]);
    }
}
