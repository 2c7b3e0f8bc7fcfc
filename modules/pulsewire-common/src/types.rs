use serde::{Deserialize, Serialize};

/// Engagement metrics for one post. The mirror site renders these as display
/// strings ("1,024", "12K"); absent slots default to "0".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngagementCounts {
    pub replies: String,
    pub reshares: String,
    pub quotes: String,
    pub likes: String,
}

impl Default for EngagementCounts {
    fn default() -> Self {
        Self {
            replies: "0".to_string(),
            reshares: "0".to_string(),
            quotes: "0".to_string(),
            likes: "0".to_string(),
        }
    }
}

/// Pre-enrichment fields pulled from one post element on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPost {
    pub url: String,
    pub username: String,
    pub display_name: String,
    pub posted_at: String,
    pub text: String,
    pub counts: EngagementCounts,
    pub avatar_url: Option<String>,
}

/// Classifier output for one text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sentiment {
    pub label: String,
    pub score: f64,
}

/// Fully enriched, immutable result record. Serialized camelCase on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub url: Option<String>,
    pub username: String,
    pub display_name: String,
    /// Raw display string from the page, not parsed to a timestamp.
    pub posted_at: String,
    pub original_text: String,
    /// Post-translation text; equals `original_text` when no translation was
    /// needed or translation failed. Always ASCII-safe classifier input.
    pub normalized_text: String,
    pub sentiment_label: String,
    pub sentiment_score: f64,
    pub counts: EngagementCounts,
    pub avatar_url: Option<String>,
}

/// Ephemeral search input.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub term: String,
    pub page_budget: u32,
}

impl SearchQuery {
    pub const DEFAULT_PAGE_BUDGET: u32 = 2;

    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            page_budget: Self::DEFAULT_PAGE_BUDGET,
        }
    }

    pub fn with_page_budget(mut self, page_budget: u32) -> Self {
        self.page_budget = page_budget;
        self
    }
}
