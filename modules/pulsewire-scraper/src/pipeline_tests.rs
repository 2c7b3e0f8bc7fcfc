use std::sync::Arc;
use std::time::Duration;

use pulsewire_common::ClassifyErrorPolicy;

use crate::enricher::UNSCORED_LABEL;
use crate::session::ScrapeSession;
use crate::testing::{MockBrowser, MockClassifier, MockItem, MockPage, MockTranslator};

fn session(
    browser: Arc<MockBrowser>,
    translator: Arc<MockTranslator>,
    classifier: Arc<MockClassifier>,
    policy: ClassifyErrorPolicy,
) -> ScrapeSession {
    ScrapeSession::new(browser, "https://mirror.test", translator, classifier, 4, policy, 2)
}

fn default_session(browser: Arc<MockBrowser>) -> ScrapeSession {
    session(
        browser,
        Arc::new(MockTranslator::new()),
        Arc::new(MockClassifier::new("positive", 0.9)),
        ClassifyErrorPolicy::Exclude,
    )
}

#[tokio::test(start_paused = true)]
async fn single_page_without_load_more_stops_after_one_extraction() {
    // "weather" scenario: page 1 has 3 posts (one missing avatar), no
    // pagination control afterward.
    let browser = Arc::new(MockBrowser::new().page(MockPage::new(vec![
        MockItem::full(1),
        MockItem::full(2).without_avatar(),
        MockItem::full(3),
    ])));
    let s = default_session(browser.clone());

    let outcome = s.scrape(&s.query("weather")).await.unwrap();

    assert_eq!(outcome.posts.len(), 3);
    assert_eq!(browser.extract_calls(), 1);
    assert_eq!(outcome.stats.pages_scraped, 1);
    assert_eq!(outcome.stats.posts_failed, 0);
    // Page-then-DOM order preserved, optional avatar defaulted to None.
    assert_eq!(outcome.posts[0].username, "@user1");
    assert!(outcome.posts[1].avatar_url.is_none());
    assert_eq!(outcome.posts[2].username, "@user3");
}

#[tokio::test(start_paused = true)]
async fn pagination_respects_page_budget() {
    let browser = Arc::new(
        MockBrowser::new()
            .page(MockPage::new(vec![MockItem::full(1), MockItem::full(2)]).with_more())
            .page(MockPage::new(vec![MockItem::full(3), MockItem::full(4)]).with_more())
            .page(MockPage::new(vec![MockItem::full(5)])),
    );
    let s = default_session(browser.clone());

    let outcome = s.scrape(&s.query("budget")).await.unwrap();

    // Budget is 2: page 3 is never extracted even though load-more was present.
    assert_eq!(browser.extract_calls(), 2);
    assert_eq!(outcome.posts.len(), 4);
    assert_eq!(outcome.posts[2].username, "@user3");
}

#[tokio::test(start_paused = true)]
async fn navigation_failure_yields_zero_results_not_error() {
    let browser = Arc::new(MockBrowser::new().failing_navigation());
    let s = default_session(browser.clone());

    let outcome = s.scrape(&s.query("weather")).await.unwrap();

    assert!(outcome.posts.is_empty());
    assert_eq!(browser.extract_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn results_container_timeout_yields_zero_results() {
    // Page loads but no results container ever appears.
    let browser = Arc::new(MockBrowser::new());
    let s = default_session(browser.clone());

    let outcome = s.scrape(&s.query("weather")).await.unwrap();

    assert!(outcome.posts.is_empty());
    assert_eq!(outcome.stats.pages_scraped, 0);
}

#[tokio::test(start_paused = true)]
async fn element_lookup_failure_during_open_yields_zero_results() {
    // Page load succeeds, then the driver connection dies under the
    // results-container wait. Transient: zero results, not an error.
    let browser = Arc::new(
        MockBrowser::new()
            .page(MockPage::new(vec![MockItem::full(1)]))
            .failing_lookup(),
    );
    let s = default_session(browser.clone());

    let outcome = s.scrape(&s.query("weather")).await.unwrap();

    assert!(outcome.posts.is_empty());
    assert_eq!(outcome.stats.pages_scraped, 0);
    assert_eq!(browser.extract_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn pagination_click_failure_keeps_partial_results() {
    let browser = Arc::new(
        MockBrowser::new()
            .page(MockPage::new(vec![MockItem::full(1)]).with_more())
            .page(MockPage::new(vec![MockItem::full(2)]))
            .failing_click(),
    );
    let s = session(
        browser.clone(),
        Arc::new(MockTranslator::new()),
        Arc::new(MockClassifier::new("neutral", 0.5)),
        ClassifyErrorPolicy::Exclude,
    );

    let outcome = s.scrape(&s.query("partial").with_page_budget(3)).await.unwrap();

    assert_eq!(outcome.posts.len(), 1);
    assert_eq!(browser.extract_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn ascii_text_never_touches_translator() {
    let browser = Arc::new(MockBrowser::new().page(MockPage::new(vec![
        MockItem::full(1).body("plain ascii body"),
    ])));
    let translator = Arc::new(MockTranslator::new());
    let s = session(
        browser,
        translator.clone(),
        Arc::new(MockClassifier::new("positive", 0.8)),
        ClassifyErrorPolicy::Exclude,
    );

    let outcome = s.scrape(&s.query("ascii")).await.unwrap();

    assert_eq!(translator.calls(), 0);
    // Byte-for-byte round trip of ASCII text.
    assert_eq!(outcome.posts[0].normalized_text, outcome.posts[0].original_text);
    assert_eq!(outcome.posts[0].normalized_text, "plain ascii body");
}

#[tokio::test(start_paused = true)]
async fn non_ascii_text_is_translated() {
    let browser = Arc::new(MockBrowser::new().page(MockPage::new(vec![
        MockItem::full(1).body("très bon"),
    ])));
    let translator = Arc::new(MockTranslator::new().on("très bon", "very good"));
    let s = session(
        browser,
        translator.clone(),
        Arc::new(MockClassifier::new("positive", 0.8)),
        ClassifyErrorPolicy::Exclude,
    );

    let outcome = s.scrape(&s.query("fr")).await.unwrap();

    assert_eq!(translator.calls(), 1);
    assert_eq!(outcome.posts[0].original_text, "très bon");
    assert_eq!(outcome.posts[0].normalized_text, "very good");
}

#[tokio::test(start_paused = true)]
async fn translation_failure_falls_back_to_original_text() {
    let browser = Arc::new(MockBrowser::new().page(MockPage::new(vec![
        MockItem::full(1).body("très bon"),
    ])));
    let s = session(
        browser,
        Arc::new(MockTranslator::new().failing()),
        Arc::new(MockClassifier::new("neutral", 0.6)),
        ClassifyErrorPolicy::Exclude,
    );

    let outcome = s.scrape(&s.query("fr")).await.unwrap();

    // Translation is best-effort: the post survives with its original text
    // and still gets classified.
    assert_eq!(outcome.posts.len(), 1);
    assert_eq!(outcome.posts[0].normalized_text, "très bon");
    assert_eq!(outcome.posts[0].sentiment_label, "neutral");
}

#[tokio::test(start_paused = true)]
async fn failing_classifier_excludes_posts_under_exclude_policy() {
    let browser = Arc::new(MockBrowser::new().page(MockPage::new(vec![
        MockItem::full(1),
        MockItem::full(2),
    ])));
    let s = session(
        browser,
        Arc::new(MockTranslator::new()),
        Arc::new(MockClassifier::failing()),
        ClassifyErrorPolicy::Exclude,
    );

    let outcome = s.scrape(&s.query("down")).await.unwrap();

    assert!(outcome.posts.is_empty());
    assert_eq!(outcome.stats.posts_failed, 2);
    assert_eq!(outcome.stats.items_seen, 2);
}

#[tokio::test(start_paused = true)]
async fn failing_classifier_marks_posts_under_unscored_policy() {
    let browser = Arc::new(MockBrowser::new().page(MockPage::new(vec![
        MockItem::full(1),
        MockItem::full(2),
    ])));
    let s = session(
        browser,
        Arc::new(MockTranslator::new()),
        Arc::new(MockClassifier::failing()),
        ClassifyErrorPolicy::Unscored,
    );

    let outcome = s.scrape(&s.query("down")).await.unwrap();

    assert_eq!(outcome.posts.len(), 2);
    for post in &outcome.posts {
        assert_eq!(post.sentiment_label, UNSCORED_LABEL);
        assert_eq!(post.sentiment_score, 0.0);
    }
    assert_eq!(outcome.stats.posts_failed, 0);
}

#[tokio::test(start_paused = true)]
async fn missing_required_field_skips_only_that_post() {
    let browser = Arc::new(MockBrowser::new().page(MockPage::new(vec![
        MockItem::full(1),
        MockItem::full(2).without_username(),
        MockItem::full(3).without_body(),
        MockItem::full(4),
    ])));
    let s = default_session(browser);

    let outcome = s.scrape(&s.query("gaps")).await.unwrap();

    assert_eq!(outcome.posts.len(), 2);
    assert_eq!(outcome.stats.posts_skipped, 2);
    assert_eq!(outcome.posts[0].username, "@user1");
    assert_eq!(outcome.posts[1].username, "@user4");
}

#[tokio::test(start_paused = true)]
async fn short_stat_rows_default_missing_slots() {
    let browser = Arc::new(MockBrowser::new().page(MockPage::new(vec![
        MockItem::full(1).stats(&["7"]),
    ])));
    let s = default_session(browser);

    let outcome = s.scrape(&s.query("stats")).await.unwrap();

    let counts = &outcome.posts[0].counts;
    assert_eq!(counts.replies, "7");
    assert_eq!(counts.reshares, "0");
    assert_eq!(counts.quotes, "0");
    assert_eq!(counts.likes, "0");
}

#[tokio::test(start_paused = true)]
async fn concurrent_scrapes_never_interleave_navigation() {
    let browser = Arc::new(
        MockBrowser::new()
            .page(MockPage::new(vec![MockItem::full(1)]).with_more())
            .page(MockPage::new(vec![MockItem::full(2)]))
            .with_nav_delay(Duration::from_millis(100)),
    );
    let s = Arc::new(default_session(browser.clone()));

    let (a, b) = tokio::join!(
        {
            let s = s.clone();
            async move { s.scrape(&s.query("one")).await }
        },
        {
            let s = s.clone();
            async move { s.scrape(&s.query("two")).await }
        }
    );

    assert!(a.is_ok());
    assert!(b.is_ok());
    assert!(!browser.overlap_detected());
}

#[tokio::test]
async fn close_is_idempotent() {
    let browser = Arc::new(MockBrowser::new());
    let s = default_session(browser.clone());

    s.close().await;
    assert!(browser.is_closed());
    // Second close is a no-op, not a double teardown.
    s.close().await;
}
