// Trait abstractions for the scrape pipeline's external collaborators.
//
// BrowserDriver — the one mutable browser session (navigation + DOM reads).
// Translator — best-effort text normalization backend.
// SentimentClassifier — the scoring backend behind the worker pool.
//
// These enable deterministic testing with MockBrowser, MockTranslator and
// MockClassifier: no driver process, no network. `cargo test` in seconds.

use anyhow::Result;
use async_trait::async_trait;

use pulsewire_common::Sentiment;

/// Opaque handle to a DOM element on the session's current page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementHandle(pub String);

#[async_trait]
pub trait BrowserDriver: Send + Sync {
    /// Load a URL, replacing the current page.
    async fn goto(&self, url: &str) -> Result<()>;

    /// All elements matching a CSS selector. Empty vec when none match.
    async fn find_all(&self, selector: &str) -> Result<Vec<ElementHandle>>;

    /// First match for a selector inside another element, if any.
    async fn find_in(
        &self,
        element: &ElementHandle,
        selector: &str,
    ) -> Result<Option<ElementHandle>>;

    /// All matches for a selector inside another element.
    async fn find_all_in(
        &self,
        element: &ElementHandle,
        selector: &str,
    ) -> Result<Vec<ElementHandle>>;

    /// Rendered text of an element.
    async fn text(&self, element: &ElementHandle) -> Result<String>;

    /// Attribute value, `None` when absent.
    async fn attribute(&self, element: &ElementHandle, name: &str) -> Result<Option<String>>;

    /// Click an element via injected script. The pagination control sits
    /// under an overlay on some mirror instances, so a pointer click can be
    /// intercepted where a script click is not.
    async fn click_via_script(&self, element: &ElementHandle) -> Result<()>;

    /// End the browser session.
    async fn close(&self) -> Result<()>;
}

#[async_trait]
impl BrowserDriver for webdriver_client::WebDriverSession {
    async fn goto(&self, url: &str) -> Result<()> {
        Ok(self.navigate(url).await?)
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<ElementHandle>> {
        let refs = webdriver_client::WebDriverSession::find_all(self, selector).await?;
        Ok(refs.into_iter().map(|r| ElementHandle(r.id().to_string())).collect())
    }

    async fn find_in(
        &self,
        element: &ElementHandle,
        selector: &str,
    ) -> Result<Option<ElementHandle>> {
        let parent = webdriver_client::ElementRef::from_id(element.0.clone());
        let found = webdriver_client::WebDriverSession::find_in(self, &parent, selector).await?;
        Ok(found.map(|r| ElementHandle(r.id().to_string())))
    }

    async fn find_all_in(
        &self,
        element: &ElementHandle,
        selector: &str,
    ) -> Result<Vec<ElementHandle>> {
        let parent = webdriver_client::ElementRef::from_id(element.0.clone());
        let refs = webdriver_client::WebDriverSession::find_all_in(self, &parent, selector).await?;
        Ok(refs.into_iter().map(|r| ElementHandle(r.id().to_string())).collect())
    }

    async fn text(&self, element: &ElementHandle) -> Result<String> {
        let el = webdriver_client::ElementRef::from_id(element.0.clone());
        Ok(webdriver_client::WebDriverSession::text(self, &el).await?)
    }

    async fn attribute(&self, element: &ElementHandle, name: &str) -> Result<Option<String>> {
        let el = webdriver_client::ElementRef::from_id(element.0.clone());
        Ok(webdriver_client::WebDriverSession::attribute(self, &el, name).await?)
    }

    async fn click_via_script(&self, element: &ElementHandle) -> Result<()> {
        let el = webdriver_client::ElementRef::from_id(element.0.clone());
        self.execute_on("arguments[0].click();", &el).await?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        Ok(self.quit().await?)
    }
}

#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` into `target`, auto-detecting the source language.
    async fn translate(&self, text: &str, target: &str) -> Result<String>;
}

#[async_trait]
impl Translator for translate_client::TranslateClient {
    async fn translate(&self, text: &str, target: &str) -> Result<String> {
        Ok(translate_client::TranslateClient::translate(self, text, target).await?)
    }
}

#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    /// Classify `text`, returning the top label and its score.
    async fn classify(&self, text: &str) -> Result<Sentiment>;
}

#[async_trait]
impl SentimentClassifier for sentiment_client::SentimentClient {
    async fn classify(&self, text: &str) -> Result<Sentiment> {
        let top = sentiment_client::SentimentClient::classify(self, text).await?;
        Ok(Sentiment {
            label: top.label,
            score: top.score,
        })
    }
}
