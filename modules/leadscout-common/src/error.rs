use thiserror::Error;

/// Error taxonomy for one site's journey through the pipeline. Stage-local
/// failures are caught and recorded on the stage result; they never crash
/// the runs of other concurrent sites.
#[derive(Error, Debug)]
pub enum LeadScoutError {
    #[error("Fetch failure: {0}")]
    FetchFailure(String),

    #[error("Content too short: {length} chars (minimum {minimum})")]
    ContentTooShort { length: usize, minimum: usize },

    #[error("Parse failure: {0}")]
    ParseFailure(String),

    #[error("Validation failure: {0}")]
    ValidationFailure(String),

    #[error("Classification format failure: {0}")]
    ClassificationFormat(String),

    #[error("Provider error: {0}")]
    Provider(String),

    /// Auth or quota failure on the active credential; callers rotate keys
    /// before retrying.
    #[error("Provider credential error: {0}")]
    ProviderAuth(String),

    #[error("Site timed out after {0} seconds")]
    TimeoutExceeded(u64),

    #[error("Unknown profile: {0}")]
    UnknownProfile(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
