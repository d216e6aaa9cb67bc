//! Error types for lineage traversal.

/// Failure reported by a [`LineageSource`](crate::LineageSource) lookup.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    /// The caller may not see this object. Only the affected branch of a
    /// walk is dropped.
    #[error("access denied: {0}")]
    Denied(String),

    /// The backing store failed. Aborts the walk.
    #[error("lookup unavailable: {0}")]
    Unavailable(String),
}

/// Convenience alias for lookup results.
pub type LookupResult<T> = Result<T, LookupError>;

/// Errors that abort a whole walk.
#[derive(Debug, thiserror::Error)]
pub enum LineageError {
    /// The start identifier is neither a content hash nor a UUID.
    #[error("invalid start identifier: {0:?}")]
    InvalidStart(String),

    #[error(transparent)]
    Lookup(#[from] LookupError),
}

/// Convenience alias for walk results.
pub type LineageResult<T> = Result<T, LineageError>;
