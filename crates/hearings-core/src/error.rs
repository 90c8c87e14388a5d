use thiserror::Error;

/// Error taxonomy for the retrieval core.
///
/// Validation errors are raised before any collaborator call. Search never
/// raises `AccessDenied` (inaccessible hits are silently excluded); direct
/// by-id operations do. No variant carries document content.
#[derive(Debug, Error)]
pub enum Error {
    #[error("query must not be empty")]
    EmptyQuery,

    #[error("proceeding not found: {0}")]
    ProceedingNotFound(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("access denied: {0}")]
    AccessDenied(String),

    #[error("malformed filter: {0}")]
    MalformedFilter(String),

    #[error("search index unavailable: {0}")]
    IndexUnavailable(String),

    #[error("embedding service unavailable: {0}")]
    EmbeddingUnavailable(String),
}

impl Error {
    /// Upstream failures are safe to retry; client input errors are not.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::IndexUnavailable(_) | Self::EmbeddingUnavailable(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
