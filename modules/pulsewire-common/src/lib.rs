pub mod config;
pub mod error;
pub mod types;

pub use config::{ClassifyErrorPolicy, Config};
pub use error::PulsewireError;
pub use types::{EngagementCounts, Post, RawPost, SearchQuery, Sentiment};
