//! Error types for the merge engine.

use prov_manifest::ManifestError;

/// Hard failures that abort a merge request.
///
/// A missing source path is not an error; it is recorded in the
/// [`MergeReport`](crate::MergeReport) and skipped.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    /// The selector names neither a content hash nor a UUID.
    #[error("invalid selector: {0:?}")]
    InvalidSelector(String),

    /// A source manifest could not be parsed.
    #[error("malformed manifest in {collection}: {source}")]
    MalformedManifest {
        /// Identifier of the offending collection.
        collection: String,
        /// The underlying parse failure.
        source: ManifestError,
    },

    /// The collection source has no manifest for this identifier.
    #[error("collection not found: {0}")]
    CollectionNotFound(String),

    /// The collection source itself failed.
    #[error("collection source error: {0}")]
    Source(String),
}

/// Convenience alias for merge results.
pub type MergeResult<T> = Result<T, MergeError>;
