use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use tracing::error;

use crate::AppState;

#[derive(Deserialize)]
pub struct AnalyzeRequest {
    text: String,
}

/// Scrape posts matching the query and return them enriched with sentiment.
/// Recoverable scrape failures yield 200 with fewer (possibly zero) results;
/// 500 is reserved for internal failures of the scrape run itself.
pub async fn api_analyze(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AnalyzeRequest>,
) -> impl IntoResponse {
    let term = body.text.trim();
    if term.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "text must not be empty"})),
        )
            .into_response();
    }

    let query = state.session.query(term);
    match state.session.scrape(&query).await {
        Ok(outcome) => Json(serde_json::json!({ "results": outcome.posts })).into_response(),
        Err(e) => {
            error!(error = %e, "Scrape request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": e.to_string()})),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pulsewire_common::ClassifyErrorPolicy;
    use pulsewire_scraper::testing::{MockBrowser, MockClassifier, MockItem, MockPage, MockTranslator};
    use pulsewire_scraper::ScrapeSession;

    fn state_with_page(page: MockPage) -> Arc<AppState> {
        let session = ScrapeSession::new(
            Arc::new(MockBrowser::new().page(page)),
            "https://mirror.test",
            Arc::new(MockTranslator::new()),
            Arc::new(MockClassifier::new("positive", 0.9)),
            4,
            ClassifyErrorPolicy::Exclude,
            2,
        );
        Arc::new(AppState {
            session: Arc::new(session),
        })
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn analyze_returns_enriched_results() {
        let state = state_with_page(MockPage::new(vec![MockItem::full(1)]));

        let response = api_analyze(
            State(state),
            Json(AnalyzeRequest {
                text: "weather".to_string(),
            }),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let results = json["results"].as_array().unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["username"], "@user1");
        assert_eq!(results[0]["sentimentLabel"], "positive");
    }

    #[tokio::test]
    async fn analyze_rejects_blank_query() {
        let state = state_with_page(MockPage::new(vec![]));

        let response = api_analyze(
            State(state),
            Json(AnalyzeRequest {
                text: "   ".to_string(),
            }),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
