pub mod error;

pub use error::{Result, TranslateError};

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

/// Client for a LibreTranslate-compatible /translate endpoint.
pub struct TranslateClient {
    client: reqwest::Client,
    base_url: String,
}

impl TranslateClient {
    pub fn new(base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Translate `text` into `target`, auto-detecting the source language.
    pub async fn translate(&self, text: &str, target: &str) -> Result<String> {
        let body = serde_json::json!({
            "q": text,
            "source": "auto",
            "target": target,
            "format": "text",
        });

        let resp = self
            .client
            .post(format!("{}/translate", self.base_url))
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(TranslateError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: TranslateResponse = resp.json().await?;
        debug!(target, bytes = parsed.translated_text.len(), "Translated text");
        Ok(parsed.translated_text)
    }
}
