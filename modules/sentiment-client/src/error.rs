use thiserror::Error;

pub type Result<T> = std::result::Result<T, SentimentError>;

#[derive(Debug, Error)]
pub enum SentimentError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Classification API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Classifier returned no labels")]
    EmptyResponse,
}

impl From<reqwest::Error> for SentimentError {
    fn from(err: reqwest::Error) -> Self {
        SentimentError::Network(err.to_string())
    }
}
