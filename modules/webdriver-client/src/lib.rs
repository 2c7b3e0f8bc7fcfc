pub mod error;

pub use error::{Result, WebDriverError};

use std::time::Duration;

use serde_json::{json, Value};
use tracing::debug;

/// JSON key identifying an element reference in WebDriver responses (W3C §11).
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Opaque handle to a DOM element within one WebDriver session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementRef(String);

impl ElementRef {
    pub fn from_id(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

/// Client for a running WebDriver server (e.g. geckodriver).
pub struct WebDriverClient {
    client: reqwest::Client,
    base_url: String,
}

impl WebDriverClient {
    pub fn new(base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Probe the driver's /status endpoint. Returns whether it is ready
    /// to accept a new session.
    pub async fn status(&self) -> Result<bool> {
        let resp = self
            .client
            .get(format!("{}/status", self.base_url))
            .send()
            .await?;
        let body: Value = resp.json().await?;
        Ok(body["value"]["ready"].as_bool().unwrap_or(false))
    }

    /// Create a new browser session. Firefox capabilities; headless by default.
    pub async fn new_session(&self, headless: bool) -> Result<WebDriverSession> {
        let mut args: Vec<&str> = Vec::new();
        if headless {
            args.push("-headless");
        }
        let body = json!({
            "capabilities": {
                "alwaysMatch": {
                    "moz:firefoxOptions": { "args": args }
                }
            }
        });

        let resp = self
            .client
            .post(format!("{}/session", self.base_url))
            .json(&body)
            .send()
            .await?;
        let value = check(resp).await?;

        let session_id = value["sessionId"]
            .as_str()
            .ok_or_else(|| WebDriverError::Protocol("missing sessionId".into()))?
            .to_string();

        debug!(session_id, "WebDriver session created");

        Ok(WebDriverSession {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            session_id,
        })
    }
}

/// One live browser session. All element lookups are CSS-selector based.
pub struct WebDriverSession {
    client: reqwest::Client,
    base_url: String,
    session_id: String,
}

impl WebDriverSession {
    fn url(&self, path: &str) -> String {
        format!("{}/session/{}{}", self.base_url, self.session_id, path)
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value> {
        let resp = self.client.post(self.url(path)).json(&body).send().await?;
        check(resp).await
    }

    async fn get(&self, path: &str) -> Result<Value> {
        let resp = self.client.get(self.url(path)).send().await?;
        check(resp).await
    }

    /// Load a URL in the session's browsing context.
    pub async fn navigate(&self, url: &str) -> Result<()> {
        debug!(url, "navigate");
        self.post("/url", json!({ "url": url })).await?;
        Ok(())
    }

    /// Find all elements matching a CSS selector. Empty vec when none match.
    pub async fn find_all(&self, selector: &str) -> Result<Vec<ElementRef>> {
        let value = self
            .post(
                "/elements",
                json!({ "using": "css selector", "value": selector }),
            )
            .await?;
        parse_elements(&value)
    }

    /// Find the first element matching a CSS selector inside another element.
    /// Absence is `Ok(None)`, not an error.
    pub async fn find_in(&self, element: &ElementRef, selector: &str) -> Result<Option<ElementRef>> {
        let result = self
            .post(
                &format!("/element/{}/element", element.0),
                json!({ "using": "css selector", "value": selector }),
            )
            .await;
        match result {
            Ok(value) => Ok(Some(parse_element(&value)?)),
            Err(WebDriverError::NoSuchElement) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Find all elements matching a CSS selector inside another element.
    pub async fn find_all_in(
        &self,
        element: &ElementRef,
        selector: &str,
    ) -> Result<Vec<ElementRef>> {
        let value = self
            .post(
                &format!("/element/{}/elements", element.0),
                json!({ "using": "css selector", "value": selector }),
            )
            .await?;
        parse_elements(&value)
    }

    /// Get an element's rendered text.
    pub async fn text(&self, element: &ElementRef) -> Result<String> {
        let value = self.get(&format!("/element/{}/text", element.0)).await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    /// Get an attribute value. `Ok(None)` when the attribute is absent.
    pub async fn attribute(&self, element: &ElementRef, name: &str) -> Result<Option<String>> {
        let value = self
            .get(&format!("/element/{}/attribute/{}", element.0, name))
            .await?;
        Ok(value.as_str().map(String::from))
    }

    /// Execute synchronous JavaScript with the given element bound as
    /// `arguments[0]`.
    pub async fn execute_on(&self, script: &str, element: &ElementRef) -> Result<Value> {
        self.post(
            "/execute/sync",
            json!({
                "script": script,
                "args": [{ ELEMENT_KEY: element.0 }],
            }),
        )
        .await
    }

    /// End the session, closing the browser.
    pub async fn quit(&self) -> Result<()> {
        let resp = self.client.delete(self.url("")).send().await?;
        check(resp).await?;
        debug!(session_id = %self.session_id, "WebDriver session closed");
        Ok(())
    }
}

/// Unwrap the `value` field of a WebDriver response, mapping command
/// failures to typed errors.
async fn check(resp: reqwest::Response) -> Result<Value> {
    let status = resp.status();
    let body: Value = resp
        .json()
        .await
        .map_err(|e| WebDriverError::Protocol(e.to_string()))?;

    if !status.is_success() {
        if body["value"]["error"].as_str() == Some("no such element") {
            return Err(WebDriverError::NoSuchElement);
        }
        let message = body["value"]["message"]
            .as_str()
            .unwrap_or("unknown error")
            .to_string();
        return Err(WebDriverError::Api {
            status: status.as_u16(),
            message,
        });
    }

    Ok(body["value"].clone())
}

fn parse_element(value: &Value) -> Result<ElementRef> {
    value[ELEMENT_KEY]
        .as_str()
        .map(|id| ElementRef(id.to_string()))
        .ok_or_else(|| WebDriverError::Protocol("missing element reference".into()))
}

fn parse_elements(value: &Value) -> Result<Vec<ElementRef>> {
    value
        .as_array()
        .ok_or_else(|| WebDriverError::Protocol("expected element array".into()))?
        .iter()
        .map(parse_element)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_element_refs() {
        let value = json!([
            { ELEMENT_KEY: "abc" },
            { ELEMENT_KEY: "def" },
        ]);
        let refs = parse_elements(&value).unwrap();
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].id(), "abc");
    }

    #[test]
    fn rejects_malformed_element() {
        let value = json!([{ "wrong-key": "abc" }]);
        assert!(parse_elements(&value).is_err());
    }
}
