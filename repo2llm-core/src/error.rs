//! Error taxonomy shared by every source provider and the flattening pipeline.
//!
//! Repository-level failures (identifier, lookup, auth) are fatal for one `process_repo` call.
//! File-level problems never show up here: they are carried as data in
//! [`FileBlob`](crate::contract::FileBlob) and [`DecodeOutcome`](crate::decode::DecodeOutcome).

use thiserror::Error;

/// Result type for provider and pipeline operations
pub type Result<T> = std::result::Result<T, SourceError>;

/// Error type for source providers
#[derive(Debug, Error)]
pub enum SourceError {
    /// The URL or path could not be parsed into a repository reference
    #[error("Invalid repository identifier: {0}")]
    InvalidIdentifier(String),

    /// Repository, path or ref does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The backend rejected the credentials (or none were sent)
    #[error("Authentication required: {0}")]
    AuthRequired(String),

    /// Backend rate limit hit
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Transient backend failure (5xx, connection reset, ...)
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    /// A provider could not be constructed because its credential is missing
    #[error("Missing credential: please set '{0}' env param")]
    MissingCredential(&'static str),

    /// The backend answered with a payload we could not interpret
    #[error("Unexpected response format: {0}")]
    UnexpectedResponse(String),

    /// Local filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl SourceError {
    /// Transient errors are the ones a caller may retry later.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SourceError::RateLimited(_) | SourceError::Unavailable(_) | SourceError::Http(_)
        )
    }
}
