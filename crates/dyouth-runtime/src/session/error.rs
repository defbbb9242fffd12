//! Session resolution errors.
//!
//! Collaborator failures are kept apart from "no session" and "no
//! profile": those are ordinary outcomes, not errors.

use dyouth_types::{ErrorCode, UserId};
use thiserror::Error;

/// Failure talking to the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// Transport failure or timeout.
    #[error("identity provider unreachable: {message}")]
    Unavailable { message: String },

    /// The provider answered with something other than a user or a rejection.
    #[error("identity provider returned {status}: {message}")]
    UnexpectedResponse { status: u16, message: String },
}

impl ProviderError {
    /// Creates an [`Unavailable`](Self::Unavailable) error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates an [`UnexpectedResponse`](Self::UnexpectedResponse) error.
    pub fn unexpected(status: u16, message: impl Into<String>) -> Self {
        Self::UnexpectedResponse {
            status,
            message: message.into(),
        }
    }
}

impl ErrorCode for ProviderError {
    fn code(&self) -> &'static str {
        match self {
            Self::Unavailable { .. } => "AUTH_SERVICE_UNAVAILABLE",
            Self::UnexpectedResponse { .. } => "AUTH_UNEXPECTED_RESPONSE",
        }
    }

    fn is_recoverable(&self) -> bool {
        true
    }
}

/// Failure talking to the data store or object store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Transport failure or timeout.
    #[error("store unreachable: {message}")]
    Unavailable { message: String },

    /// The store refused the request.
    #[error("store rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The response body did not have the expected shape.
    #[error("malformed store response: {message}")]
    Decode { message: String },
}

impl StoreError {
    /// Creates an [`Unavailable`](Self::Unavailable) error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a [`Rejected`](Self::Rejected) error.
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }

    /// Creates a [`Decode`](Self::Decode) error.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}

impl ErrorCode for StoreError {
    fn code(&self) -> &'static str {
        match self {
            Self::Unavailable { .. } => "STORE_UNAVAILABLE",
            Self::Rejected { .. } => "STORE_REJECTED",
            Self::Decode { .. } => "STORE_DECODE",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

/// Why a resolution could not fully determine the viewer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// Identity provider failed; the viewer is unknown, not anonymous.
    #[error("authentication service unavailable")]
    AuthServiceUnavailable(#[source] ProviderError),

    /// Profile lookup failed; the profile is unknown, not incomplete.
    #[error("profile lookup failed for user {user_id}")]
    ProfileLookupFailed {
        user_id: UserId,
        #[source]
        source: StoreError,
    },

    /// No backend is configured.
    #[error("backend not configured")]
    ConfigurationMissing,
}

impl ErrorCode for ResolveError {
    fn code(&self) -> &'static str {
        match self {
            Self::AuthServiceUnavailable(_) => "AUTH_SERVICE_UNAVAILABLE",
            Self::ProfileLookupFailed { .. } => "PROFILE_LOOKUP_FAILED",
            Self::ConfigurationMissing => "CONFIG_BACKEND_MISSING",
        }
    }

    fn is_recoverable(&self) -> bool {
        !matches!(self, Self::ConfigurationMissing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dyouth_types::assert_error_code;

    #[test]
    fn codes_follow_conventions() {
        assert_error_code(&ProviderError::unavailable("timeout"), "AUTH_");
        assert_error_code(&StoreError::rejected(400, "bad"), "STORE_");
        assert_error_code(&ResolveError::ConfigurationMissing, "CONFIG_");
    }

    #[test]
    fn recoverability() {
        assert!(StoreError::unavailable("down").is_recoverable());
        assert!(!StoreError::decode("junk").is_recoverable());
        assert!(!ResolveError::ConfigurationMissing.is_recoverable());
        assert!(ResolveError::AuthServiceUnavailable(ProviderError::unavailable("x")).is_recoverable());
    }

    #[test]
    fn source_chain() {
        use std::error::Error;
        let err = ResolveError::ProfileLookupFailed {
            user_id: UserId::new("u-1").unwrap(),
            source: StoreError::unavailable("connection reset"),
        };
        assert!(err.to_string().contains("u-1"));
        let source = err.source().map(ToString::to_string).unwrap_or_default();
        assert!(source.contains("connection reset"));
    }
}
