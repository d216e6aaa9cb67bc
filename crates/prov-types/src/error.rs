use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("not a locator: {0:?}")]
    NotALocator(String),

    #[error("invalid object uuid: {0:?}")]
    InvalidUuid(String),

    #[error("neither a content hash nor an object uuid: {0:?}")]
    UnknownIdentifier(String),
}
