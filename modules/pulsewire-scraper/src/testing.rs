// Test mocks for the scrape pipeline.
//
// Three mocks matching the three trait boundaries:
// - MockBrowser (BrowserDriver) — fake DOM of pages/items, element ids
//   encode page/item/field; also asserts navigation is never reentered
// - MockTranslator (Translator) — scripted translations, call counter
// - MockClassifier (SentimentClassifier) — fixed or failing result
//
// No driver process, no network.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use pulsewire_common::Sentiment;

use crate::extractor::{
    AVATAR, DISPLAY_NAME, POST_BODY, POST_DATE, POST_ITEM, POST_LINK, POST_STAT, USERNAME,
};
use crate::navigator::{LOAD_MORE, RESULTS_CONTAINER};
use crate::traits::{BrowserDriver, ElementHandle, SentimentClassifier, Translator};

// ---------------------------------------------------------------------------
// MockBrowser
// ---------------------------------------------------------------------------

/// One post element in the fake DOM. All fields optional so tests can
/// exercise every missing-field path.
#[derive(Debug, Clone, Default)]
pub struct MockItem {
    pub link: Option<String>,
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub date: Option<String>,
    pub body: Option<String>,
    pub stats: Vec<String>,
    pub avatar: Option<String>,
}

impl MockItem {
    /// A complete item with all required fields and a full stat row.
    pub fn full(n: u32) -> Self {
        Self {
            link: Some(format!("https://mirror.test/user{n}/status/{n}")),
            username: Some(format!("@user{n}")),
            display_name: Some(format!("User {n}")),
            date: Some("Jan 1".to_string()),
            body: Some(format!("post body {n}")),
            stats: vec!["1".into(), "2".into(), "3".into(), "4".into()],
            avatar: Some(format!("https://mirror.test/avatar{n}.jpg")),
        }
    }

    pub fn body(mut self, text: &str) -> Self {
        self.body = Some(text.to_string());
        self
    }

    pub fn stats(mut self, stats: &[&str]) -> Self {
        self.stats = stats.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn without_avatar(mut self) -> Self {
        self.avatar = None;
        self
    }

    pub fn without_username(mut self) -> Self {
        self.username = None;
        self
    }

    pub fn without_body(mut self) -> Self {
        self.body = None;
        self
    }
}

/// One page of results. The pagination control is present iff `has_more`.
#[derive(Debug, Clone, Default)]
pub struct MockPage {
    pub items: Vec<MockItem>,
    pub has_more: bool,
}

impl MockPage {
    pub fn new(items: Vec<MockItem>) -> Self {
        Self {
            items,
            has_more: false,
        }
    }

    pub fn with_more(mut self) -> Self {
        self.has_more = true;
        self
    }
}

#[derive(Default)]
struct MockBrowserState {
    current: Option<usize>,
}

/// Fake-DOM browser. Element ids encode their position:
/// `item:{page}:{idx}`, `field:{page}:{idx}:{kind}`, `stat:{page}:{idx}:{slot}`.
pub struct MockBrowser {
    pages: Vec<MockPage>,
    fail_navigation: bool,
    fail_lookup: bool,
    fail_click: bool,
    nav_delay: Duration,
    state: Mutex<MockBrowserState>,
    in_navigation: AtomicBool,
    overlap_detected: AtomicBool,
    extract_calls: AtomicU32,
    closed: AtomicBool,
}

impl MockBrowser {
    pub fn new() -> Self {
        Self {
            pages: Vec::new(),
            fail_navigation: false,
            fail_lookup: false,
            fail_click: false,
            nav_delay: Duration::ZERO,
            state: Mutex::new(MockBrowserState::default()),
            in_navigation: AtomicBool::new(false),
            overlap_detected: AtomicBool::new(false),
            extract_calls: AtomicU32::new(0),
            closed: AtomicBool::new(false),
        }
    }

    pub fn page(mut self, page: MockPage) -> Self {
        self.pages.push(page);
        self
    }

    pub fn failing_navigation(mut self) -> Self {
        self.fail_navigation = true;
        self
    }

    /// Page loads succeed but every element query errors, as when the
    /// driver connection drops after navigation.
    pub fn failing_lookup(mut self) -> Self {
        self.fail_lookup = true;
        self
    }

    pub fn failing_click(mut self) -> Self {
        self.fail_click = true;
        self
    }

    /// Hold each navigation open for `delay` to widen the window in which
    /// a concurrent caller could interleave.
    pub fn with_nav_delay(mut self, delay: Duration) -> Self {
        self.nav_delay = delay;
        self
    }

    /// True if two callers were ever inside navigation at once.
    pub fn overlap_detected(&self) -> bool {
        self.overlap_detected.load(Ordering::SeqCst)
    }

    /// Number of post-element queries, i.e. extraction passes.
    pub fn extract_calls(&self) -> u32 {
        self.extract_calls.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    async fn enter_navigation(&self) {
        if self.in_navigation.swap(true, Ordering::SeqCst) {
            self.overlap_detected.store(true, Ordering::SeqCst);
        }
        if self.nav_delay > Duration::ZERO {
            tokio::time::sleep(self.nav_delay).await;
        }
    }

    fn exit_navigation(&self) {
        self.in_navigation.store(false, Ordering::SeqCst);
    }

    fn item(&self, page: usize, idx: usize) -> Option<&MockItem> {
        self.pages.get(page)?.items.get(idx)
    }
}

/// Parse "kind:page:idx[:extra]" element ids.
fn parse_id(id: &str) -> Option<(&str, usize, usize, Option<&str>)> {
    let mut parts = id.split(':');
    let kind = parts.next()?;
    let page = parts.next()?.parse().ok()?;
    let idx = parts.next()?.parse().ok()?;
    Some((kind, page, idx, parts.next()))
}

#[async_trait]
impl BrowserDriver for MockBrowser {
    async fn goto(&self, _url: &str) -> Result<()> {
        self.enter_navigation().await;
        let result = if self.fail_navigation {
            Err(anyhow!("connection refused"))
        } else {
            self.state.lock().unwrap().current = Some(0);
            Ok(())
        };
        self.exit_navigation();
        result
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<ElementHandle>> {
        if self.fail_lookup {
            return Err(anyhow!("connection reset by peer"));
        }
        let Some(page_index) = self.state.lock().unwrap().current else {
            return Ok(Vec::new());
        };
        let Some(page) = self.pages.get(page_index) else {
            return Ok(Vec::new());
        };

        match selector {
            RESULTS_CONTAINER => Ok(vec![ElementHandle("timeline".to_string())]),
            POST_ITEM => {
                self.extract_calls.fetch_add(1, Ordering::SeqCst);
                Ok((0..page.items.len())
                    .map(|i| ElementHandle(format!("item:{page_index}:{i}")))
                    .collect())
            }
            LOAD_MORE if page.has_more => Ok(vec![ElementHandle("more".to_string())]),
            _ => Ok(Vec::new()),
        }
    }

    async fn find_in(
        &self,
        element: &ElementHandle,
        selector: &str,
    ) -> Result<Option<ElementHandle>> {
        let Some(("item", page, idx, None)) = parse_id(&element.0) else {
            return Err(anyhow!("MockBrowser: find_in on non-item element {}", element.0));
        };
        let item = self
            .item(page, idx)
            .ok_or_else(|| anyhow!("MockBrowser: stale element {}", element.0))?;

        let (kind, present) = match selector {
            POST_LINK => ("link", item.link.is_some()),
            USERNAME => ("username", item.username.is_some()),
            DISPLAY_NAME => ("display_name", item.display_name.is_some()),
            POST_DATE => ("date", item.date.is_some()),
            POST_BODY => ("body", item.body.is_some()),
            AVATAR => ("avatar", item.avatar.is_some()),
            _ => return Ok(None),
        };

        Ok(present.then(|| ElementHandle(format!("field:{page}:{idx}:{kind}"))))
    }

    async fn find_all_in(
        &self,
        element: &ElementHandle,
        selector: &str,
    ) -> Result<Vec<ElementHandle>> {
        let Some(("item", page, idx, None)) = parse_id(&element.0) else {
            return Err(anyhow!("MockBrowser: find_all_in on non-item element {}", element.0));
        };
        if selector != POST_STAT {
            return Ok(Vec::new());
        }
        let item = self
            .item(page, idx)
            .ok_or_else(|| anyhow!("MockBrowser: stale element {}", element.0))?;
        Ok((0..item.stats.len())
            .map(|slot| ElementHandle(format!("stat:{page}:{idx}:{slot}")))
            .collect())
    }

    async fn text(&self, element: &ElementHandle) -> Result<String> {
        match parse_id(&element.0) {
            Some(("field", page, idx, Some(kind))) => {
                let item = self
                    .item(page, idx)
                    .ok_or_else(|| anyhow!("MockBrowser: stale element {}", element.0))?;
                let value = match kind {
                    "username" => &item.username,
                    "display_name" => &item.display_name,
                    "date" => &item.date,
                    "body" => &item.body,
                    _ => &None,
                };
                value
                    .clone()
                    .ok_or_else(|| anyhow!("MockBrowser: no text for {}", element.0))
            }
            Some(("stat", page, idx, Some(slot))) => {
                let item = self
                    .item(page, idx)
                    .ok_or_else(|| anyhow!("MockBrowser: stale element {}", element.0))?;
                let slot: usize = slot.parse()?;
                item.stats
                    .get(slot)
                    .cloned()
                    .ok_or_else(|| anyhow!("MockBrowser: no stat slot {slot}"))
            }
            _ => Err(anyhow!("MockBrowser: text on unknown element {}", element.0)),
        }
    }

    async fn attribute(&self, element: &ElementHandle, name: &str) -> Result<Option<String>> {
        let Some(("field", page, idx, Some(kind))) = parse_id(&element.0) else {
            return Ok(None);
        };
        let item = self
            .item(page, idx)
            .ok_or_else(|| anyhow!("MockBrowser: stale element {}", element.0))?;
        Ok(match (kind, name) {
            ("link", "href") => item.link.clone(),
            ("avatar", "src") => item.avatar.clone(),
            _ => None,
        })
    }

    async fn click_via_script(&self, element: &ElementHandle) -> Result<()> {
        self.enter_navigation().await;
        let result = if self.fail_click {
            Err(anyhow!("script execution failed"))
        } else if element.0 == "more" {
            let mut state = self.state.lock().unwrap();
            state.current = state.current.map(|p| p + 1);
            Ok(())
        } else {
            Err(anyhow!("MockBrowser: click on unknown element {}", element.0))
        };
        self.exit_navigation();
        result
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MockTranslator
// ---------------------------------------------------------------------------

/// Scripted translator. Unregistered text is echoed with a marker suffix;
/// `failing()` makes every call error.
pub struct MockTranslator {
    mapping: Mutex<HashMap<String, String>>,
    fail: bool,
    calls: AtomicU32,
}

impl MockTranslator {
    pub fn new() -> Self {
        Self {
            mapping: Mutex::new(HashMap::new()),
            fail: false,
            calls: AtomicU32::new(0),
        }
    }

    pub fn on(self, text: &str, translated: &str) -> Self {
        self.mapping
            .lock()
            .unwrap()
            .insert(text.to_string(), translated.to_string());
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Translator for MockTranslator {
    async fn translate(&self, text: &str, _target: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(anyhow!("translation backend unavailable"));
        }
        Ok(self
            .mapping
            .lock()
            .unwrap()
            .get(text)
            .cloned()
            .unwrap_or_else(|| format!("{text} [translated]")))
    }
}

// ---------------------------------------------------------------------------
// MockClassifier
// ---------------------------------------------------------------------------

/// Fixed-result classifier; `failing()` makes every call error.
pub struct MockClassifier {
    label: String,
    score: f64,
    fail: bool,
    calls: AtomicU32,
}

impl MockClassifier {
    pub fn new(label: &str, score: f64) -> Self {
        Self {
            label: label.to_string(),
            score,
            fail: false,
            calls: AtomicU32::new(0),
        }
    }

    pub fn failing() -> Self {
        let mut classifier = Self::new("", 0.0);
        classifier.fail = true;
        classifier
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SentimentClassifier for MockClassifier {
    async fn classify(&self, _text: &str) -> Result<Sentiment> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(anyhow!("inference backend unavailable"));
        }
        Ok(Sentiment {
            label: self.label.clone(),
            score: self.score,
        })
    }
}
