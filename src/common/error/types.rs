//! Unified error types for Longan.
//!
//! Resolution gaps (missing styles, unset properties) are never errors; they
//! fall through to defaults. The variants here cover malformed input and
//! caller mistakes only.
use thiserror::Error;

/// Main error type for Longan operations.
#[derive(Error, Debug)]
pub enum Error {
    /// XML parsing error
    #[error("XML error: {0}")]
    Xml(String),

    /// Malformed attribute or element value
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// A structural invariant was violated by the caller
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The operation needs context the element does not have
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// Referenced node does not exist in the document arena
    #[error("Not found: {0}")]
    NotFound(String),
}

impl Error {
    /// Shorthand for [`Error::InvalidArgument`].
    #[inline]
    pub(crate) fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Shorthand for [`Error::Precondition`].
    #[inline]
    pub(crate) fn precondition(msg: impl Into<String>) -> Self {
        Self::Precondition(msg.into())
    }
}

/// Result type for Longan operations.
pub type Result<T> = std::result::Result<T, Error>;
