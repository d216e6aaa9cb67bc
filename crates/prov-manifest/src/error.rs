/// Errors from manifest parsing.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ManifestError {
    /// The manifest text violates the stream line grammar.
    #[error("malformed manifest at line {line}: {reason}")]
    Malformed { line: usize, reason: String },
}

impl ManifestError {
    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> Self {
        Self::Malformed {
            line,
            reason: reason.into(),
        }
    }
}

/// Result alias for manifest operations.
pub type ManifestResult<T> = Result<T, ManifestError>;
