use thiserror::Error;

pub type Result<T> = std::result::Result<T, WebDriverError>;

#[derive(Debug, Error)]
pub enum WebDriverError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("WebDriver error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("No such element")]
    NoSuchElement,

    #[error("Unexpected WebDriver response: {0}")]
    Protocol(String),
}

impl From<reqwest::Error> for WebDriverError {
    fn from(err: reqwest::Error) -> Self {
        WebDriverError::Network(err.to_string())
    }
}
