use std::env;
use std::str::FromStr;

/// What to do with a post whose classification call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifyErrorPolicy {
    /// Drop the post from the response; log and count it.
    Exclude,
    /// Keep the post with sentiment label "unscored" and score 0.0.
    Unscored,
}

impl FromStr for ClassifyErrorPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "exclude" => Ok(Self::Exclude),
            "unscored" => Ok(Self::Unscored),
            other => Err(format!(
                "invalid ON_CLASSIFY_ERROR value '{other}' (expected 'exclude' or 'unscored')"
            )),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Browser driver
    pub geckodriver_path: String,
    pub webdriver_port: u16,

    // Scrape target
    pub search_base_url: String,
    pub page_budget: u32,

    // Enrichment backends
    pub translate_url: String,
    pub sentiment_url: String,
    pub sentiment_model: String,
    pub sentiment_api_token: Option<String>,
    pub enrich_workers: usize,
    pub on_classify_error: ClassifyErrorPolicy,

    // Web server
    pub web_host: String,
    pub web_port: u16,
}

pub const DEFAULT_SENTIMENT_MODEL: &str = "cardiffnlp/twitter-roberta-base-sentiment-latest";

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing or invalid.
    pub fn from_env() -> Self {
        Self {
            geckodriver_path: required_env("GECKODRIVER_PATH"),
            webdriver_port: parsed_env("WEBDRIVER_PORT", 4444),
            search_base_url: env::var("SEARCH_BASE_URL")
                .unwrap_or_else(|_| "https://nitter.net".to_string()),
            page_budget: parsed_env("PAGE_BUDGET", 2),
            translate_url: required_env("TRANSLATE_URL"),
            sentiment_url: required_env("SENTIMENT_URL"),
            sentiment_model: env::var("SENTIMENT_MODEL")
                .unwrap_or_else(|_| DEFAULT_SENTIMENT_MODEL.to_string()),
            sentiment_api_token: env::var("SENTIMENT_API_TOKEN").ok(),
            enrich_workers: parsed_env("ENRICH_WORKERS", 4),
            on_classify_error: env::var("ON_CLASSIFY_ERROR")
                .map(|v| v.parse().unwrap_or_else(|e| panic!("{e}")))
                .unwrap_or(ClassifyErrorPolicy::Exclude),
            web_host: env::var("WEB_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            web_port: parsed_env("WEB_PORT", 3000),
        }
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}

fn parsed_env<T: FromStr>(key: &str, default: T) -> T
where
    T::Err: std::fmt::Debug,
{
    match env::var(key) {
        Ok(v) => v
            .parse()
            .unwrap_or_else(|e| panic!("{key} must be a number: {e:?}")),
        Err(_) => default,
    }
}
