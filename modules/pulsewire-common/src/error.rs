use thiserror::Error;

/// Errors that cross the enrichment boundary. Navigation and extraction
/// failures degrade to fewer results inside the pipeline and never surface
/// as errors; classification is the one per-post failure callers must see
/// to apply the configured policy.
#[derive(Error, Debug)]
pub enum PulsewireError {
    #[error("Classification error: {0}")]
    Classification(String),
}
