pub mod error;

pub use error::{Result, SentimentError};

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

/// One scored label from the classifier.
#[derive(Debug, Clone, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f64,
}

/// Client for a HuggingFace-inference-shaped text-classification endpoint.
/// The model identifier is fixed at construction.
pub struct SentimentClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    token: Option<String>,
}

impl SentimentClient {
    pub fn new(base_url: &str, model: &str, token: Option<&str>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            token: token.map(String::from),
        }
    }

    /// Classify `text`, returning the top-scoring label.
    pub async fn classify(&self, text: &str) -> Result<LabelScore> {
        let url = format!("{}/models/{}", self.base_url, self.model);
        let body = serde_json::json!({ "inputs": text });

        let mut request = self.client.post(&url).json(&body);
        if let Some(ref token) = self.token {
            request = request.bearer_auth(token);
        }

        let resp = request.send().await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(SentimentError::Api {
                status: status.as_u16(),
                message,
            });
        }

        // Response shape: one inner list of scored labels per input.
        let scored: Vec<Vec<LabelScore>> = resp.json().await?;
        let top = top_label(scored).ok_or(SentimentError::EmptyResponse)?;

        debug!(model = %self.model, label = %top.label, score = top.score, "Classified text");
        Ok(top)
    }
}

fn top_label(scored: Vec<Vec<LabelScore>>) -> Option<LabelScore> {
    scored
        .into_iter()
        .next()?
        .into_iter()
        .max_by(|a, b| a.score.total_cmp(&b.score))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ls(label: &str, score: f64) -> LabelScore {
        LabelScore {
            label: label.to_string(),
            score,
        }
    }

    #[test]
    fn picks_highest_scoring_label() {
        let scored = vec![vec![ls("negative", 0.1), ls("positive", 0.7), ls("neutral", 0.2)]];
        let top = top_label(scored).unwrap();
        assert_eq!(top.label, "positive");
        assert_eq!(top.score, 0.7);
    }

    #[test]
    fn empty_response_yields_none() {
        assert!(top_label(vec![]).is_none());
        assert!(top_label(vec![vec![]]).is_none());
    }
}
