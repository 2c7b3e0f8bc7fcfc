pub mod bootstrap;
pub mod enricher;
pub mod extractor;
pub mod navigator;
pub mod session;
pub mod stats;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod traits;

#[cfg(test)]
mod pipeline_tests;

pub use session::{ScrapeOutcome, ScrapeSession};
