//! Gate construction errors.
//!
//! Decisions never fail: "no session" and "no profile" are ordinary
//! states with defined outcomes. [`GateError`] only covers tables and
//! redirect targets that would make a gate unsafe to build.

use crate::RouteClass;
use dyouth_types::ErrorCode;
use thiserror::Error;

/// Error raised while building a route table or an access gate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateError {
    /// A route pattern could not be parsed.
    #[error("invalid route pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// Pattern text as written.
        pattern: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The login page must be public or anonymous visitors loop on it.
    #[error("login path '{path}' classifies as {class}, expected public")]
    LoginNotPublic {
        /// Configured login path.
        path: String,
        /// Class the table assigns to it.
        class: RouteClass,
    },

    /// The setup page must be reachable with an incomplete profile.
    #[error("profile setup path '{path}' requires a complete profile")]
    SetupRequiresProfile {
        /// Configured setup path.
        path: String,
    },
}

impl GateError {
    /// Creates an [`InvalidPattern`](Self::InvalidPattern) error.
    pub fn invalid_pattern(pattern: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            reason: reason.into(),
        }
    }
}

impl ErrorCode for GateError {
    fn code(&self) -> &'static str {
        match self {
            Self::InvalidPattern { .. } => "GATE_INVALID_PATTERN",
            Self::LoginNotPublic { .. } => "GATE_LOGIN_NOT_PUBLIC",
            Self::SetupRequiresProfile { .. } => "GATE_SETUP_REQUIRES_PROFILE",
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }
}
