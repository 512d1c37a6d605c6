//! Error taxonomy for all core operations.

use thiserror::Error;

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy shared by every core operation.
///
/// The boundary layer maps each variant to an HTTP status code. Operational
/// variants carry a message that is safe to surface verbatim to the caller;
/// [`Error::Internal`] deliberately carries nothing and the shell logs the
/// underlying cause instead.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// A schema or input constraint was violated (400).
    #[error("{0}")]
    Validation(String),

    /// Identity lookup miss (404).
    #[error("{resource} with id {id} not found")]
    NotFound {
        /// Kind of resource that was looked up.
        resource: &'static str,
        /// The identity that missed.
        id: String,
    },

    /// Uniqueness violation, e.g. duplicate review or booking (409).
    #[error("{0}")]
    Conflict(String),

    /// Capability or ownership denial (403). Distinct from unauthenticated.
    #[error("{0}")]
    Forbidden(String),

    /// Missing or unresolvable credential (401).
    #[error("{0}")]
    Unauthenticated(String),

    /// Payment or email provider failure (502).
    #[error("upstream service error: {0}")]
    Upstream(String),

    /// Storage failure (500). The message is logged, never surfaced.
    #[error("database error: {0}")]
    Database(String),

    /// Unexpected failure (500). Logged in full, surfaced generically.
    #[error("internal error")]
    Internal,
}

impl Error {
    /// Build a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Build a not-found error for a resource kind and id.
    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    /// Build a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// Build a forbidden error.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    /// Build an unauthenticated error.
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated(message.into())
    }

    /// Returns `true` if this error is operational: its message may be shown
    /// to the caller as-is. Non-operational errors surface a generic message.
    #[must_use]
    pub const fn is_operational(&self) -> bool {
        !matches!(self, Self::Database(_) | Self::Internal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_formats_resource_and_id() {
        let err = Error::not_found("Tour", "abc-123");
        assert_eq!(err.to_string(), "Tour with id abc-123 not found");
    }

    #[test]
    fn operational_classification() {
        assert!(Error::validation("bad").is_operational());
        assert!(Error::conflict("dup").is_operational());
        assert!(!Error::Database("boom".into()).is_operational());
        assert!(!Error::Internal.is_operational());
    }
}
