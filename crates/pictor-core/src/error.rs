//! Error taxonomy for editor operations.
//!
//! Validation and resource errors are local to the operation that raised
//! them. A rejected mutation leaves the prior state intact; nothing here is
//! fatal to the editing session.

use thiserror::Error;

/// Convenience result type used across Pictor.
pub type EditorResult<T> = Result<T, EditorError>;

/// A mutation was rejected because its input broke a schema or state rule.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Canvas dimensions were not finite numbers.
    #[error("Invalid canvas size: {width}x{height}")]
    CanvasSize { width: f64, height: f64 },

    /// A single field failed a presence, range or pattern rule.
    #[error("Invalid value for `{field}`: {reason}")]
    Field { field: String, reason: String },

    /// A rule spanning several fields was violated.
    #[error("Invalid combination: {0}")]
    CrossField(String),

    /// No registry entry exists under this key.
    #[error("Unknown transformation: {0}")]
    UnknownTransformation(String),

    /// No pipeline item exists under this id.
    #[error("Unknown transformation item: {0}")]
    UnknownItem(String),
}

impl ValidationError {
    /// Build a [`ValidationError::Field`] value.
    pub fn field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Field {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Build a [`ValidationError::CrossField`] value.
    pub fn cross_field(msg: impl Into<String>) -> Self {
        Self::CrossField(msg.into())
    }
}

/// An image could not be fetched or never became ready.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResourceError {
    /// Polling gave up after the configured number of attempts.
    #[error("Image at {url} was not ready after {attempts} attempts")]
    RetriesExhausted { url: String, attempts: u32 },

    /// The endpoint answered with a status that retrying cannot fix.
    #[error("Image request for {url} failed with status {status}")]
    Terminal { url: String, status: u16 },

    /// The fetcher itself failed (network, CORS, aborted request).
    #[error("Fetch failed: {0}")]
    Fetch(String),
}

/// Top-level error returned by the mutation surface and the loader.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditorError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Resource(#[from] ResourceError),
}

impl EditorError {
    pub fn is_validation(&self) -> bool {
        matches!(self, EditorError::Validation(_))
    }
}
