//! Error kinds for the agent memory service (spec §7).
//!
//! Five kinds are distinguished, matching exactly what the Tool Dispatcher is
//! allowed to surface to a calling agent: [`Error::Validation`],
//! [`Error::NotFound`], [`Error::Transient`], [`Error::Provider`], and
//! [`Error::Internal`]. The Query Layer never swallows an error — it tags the
//! operation name onto whichever of these kinds applies and rethrows
//! (spec §7 "Propagation policy").

/// Result type alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, Error>;

/// The five error kinds surfaced by the Tool Dispatcher.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Input violates a schema or bound: empty query, out-of-range depth,
    /// dimension mismatch. Never retried.
    #[error("validation failed in {operation}: {message}")]
    Validation {
        operation: &'static str,
        message: String,
    },

    /// The addressed record does not exist.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// Connection dropped, timed out, or a reconnect is in progress.
    /// Retriable by the caller.
    #[error("backend unavailable during {operation}: {message}")]
    Transient {
        operation: &'static str,
        message: String,
    },

    /// The embedding provider failed (unreachable, dimension mismatch,
    /// model not found).
    #[error("embedding provider error: {0}")]
    Provider(String),

    /// An invariant was violated or a bug was hit. Logged with full context,
    /// surfaced to the caller as a generic message.
    #[error("internal error in {operation}: {message}")]
    Internal {
        operation: &'static str,
        message: String,
    },
}

impl Error {
    /// Shorthand for [`Error::Validation`].
    #[must_use]
    pub fn validation(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            operation,
            message: message.into(),
        }
    }

    /// Shorthand for [`Error::NotFound`].
    #[must_use]
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Shorthand for [`Error::Transient`].
    #[must_use]
    pub fn transient(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Transient {
            operation,
            message: message.into(),
        }
    }

    /// Shorthand for [`Error::Internal`].
    #[must_use]
    pub fn internal(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Internal {
            operation,
            message: message.into(),
        }
    }

    /// Whether the caller may usefully retry this exact call.
    #[must_use]
    pub fn is_retriable(&self) -> bool {
        matches!(self, Error::Transient { .. })
    }

    /// A short hint the dispatcher attaches to the tool error payload so the
    /// calling agent can self-correct (spec §4.4 "Input validation").
    #[must_use]
    pub fn hint(&self) -> &'static str {
        match self {
            Error::Validation { .. } => "check the tool's argument schema and bounds",
            Error::NotFound { .. } => "try `search` to locate the correct id",
            Error::Transient { .. } => "the backend is reconnecting; retry the call",
            Error::Provider(_) => "the embedding provider is unavailable; retry later",
            Error::Internal { .. } => "this is a bug; it has been logged",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_is_not_retriable() {
        let err = Error::validation("search", "query must not be empty");
        assert!(!err.is_retriable());
        assert!(err.to_string().contains("search"));
    }

    #[test]
    fn transient_is_retriable_with_retry_hint() {
        let err = Error::transient("hybrid_search", "connection reset");
        assert!(err.is_retriable());
        assert!(err.hint().contains("retry"));
    }

    #[test]
    fn not_found_hint_points_at_search() {
        let err = Error::not_found("entity", "entity:missing");
        assert_eq!(err.hint(), "try `search` to locate the correct id");
    }
}
