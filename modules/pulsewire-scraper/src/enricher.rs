use std::sync::Arc;

use anyhow::{anyhow, Result};
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use pulsewire_common::{ClassifyErrorPolicy, Post, PulsewireError, RawPost, Sentiment};

use crate::traits::{SentimentClassifier, Translator};

/// Fixed target language for normalization.
const TARGET_LANG: &str = "en";
/// Label applied under the `Unscored` classification-failure policy.
pub const UNSCORED_LABEL: &str = "unscored";

/// Turns a RawPost into a Post: best-effort translation for non-ASCII text,
/// then classification through the bounded worker pool. Translation failure
/// degrades to the original text; classification failure follows the
/// configured policy.
pub struct Enricher {
    translator: Arc<dyn Translator>,
    classifier: Arc<dyn SentimentClassifier>,
    pool: Arc<Semaphore>,
    policy: ClassifyErrorPolicy,
}

impl Enricher {
    pub fn new(
        translator: Arc<dyn Translator>,
        classifier: Arc<dyn SentimentClassifier>,
        workers: usize,
        policy: ClassifyErrorPolicy,
    ) -> Self {
        Self {
            translator,
            classifier,
            pool: Arc::new(Semaphore::new(workers)),
            policy,
        }
    }

    /// Enrich one post. `Err` means the post failed classification under
    /// the `Exclude` policy and must not appear in the result set.
    pub async fn enrich(&self, raw: RawPost) -> Result<Post, PulsewireError> {
        let normalized = self.normalize(&raw.text).await;

        let sentiment = match self.classify(&normalized).await {
            Ok(sentiment) => sentiment,
            Err(e) => match self.policy {
                ClassifyErrorPolicy::Unscored => {
                    warn!(url = %raw.url, error = %e, "Classification failed, marking unscored");
                    Sentiment {
                        label: UNSCORED_LABEL.to_string(),
                        score: 0.0,
                    }
                }
                ClassifyErrorPolicy::Exclude => {
                    return Err(PulsewireError::Classification(format!("{}: {e}", raw.url)));
                }
            },
        };

        Ok(Post {
            url: Some(raw.url),
            username: raw.username,
            display_name: raw.display_name,
            posted_at: raw.posted_at,
            original_text: raw.text,
            normalized_text: normalized,
            sentiment_label: sentiment.label,
            sentiment_score: sentiment.score,
            counts: raw.counts,
            avatar_url: raw.avatar_url,
        })
    }

    /// ASCII text passes through untouched; anything else goes to the
    /// translator, falling back to the original on failure.
    async fn normalize(&self, text: &str) -> String {
        if text.is_ascii() {
            return text.to_string();
        }
        match self.translator.translate(text, TARGET_LANG).await {
            Ok(translated) => {
                debug!(bytes = translated.len(), "Translated post text");
                translated
            }
            Err(e) => {
                warn!(error = %e, "Translation failed, keeping original text");
                text.to_string()
            }
        }
    }

    async fn classify(&self, text: &str) -> Result<Sentiment> {
        let _permit = self
            .pool
            .acquire()
            .await
            .map_err(|_| anyhow!("Enrichment pool stopped"))?;
        self.classifier.classify(text).await
    }

    /// Stop the worker pool. In-flight permits drain; new classification
    /// calls fail.
    pub fn shutdown(&self) {
        self.pool.close();
    }
}
