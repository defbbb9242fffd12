//! Unified error interface for D-Youth.
//!
//! Every error enum in the workspace implements [`ErrorCode`] so that the
//! gate, the runtime, and the CLI can report failures the same way.
//!
//! # Example
//!
//! ```
//! use dyouth_types::ErrorCode;
//!
//! #[derive(Debug)]
//! enum StoreFailure {
//!     Unreachable,
//!     Rejected,
//! }
//!
//! impl ErrorCode for StoreFailure {
//!     fn code(&self) -> &'static str {
//!         match self {
//!             Self::Unreachable => "STORE_UNREACHABLE",
//!             Self::Rejected => "STORE_REJECTED",
//!         }
//!     }
//!
//!     fn is_recoverable(&self) -> bool {
//!         matches!(self, Self::Unreachable)
//!     }
//! }
//!
//! let err = StoreFailure::Unreachable;
//! assert_eq!(err.code(), "STORE_UNREACHABLE");
//! assert!(err.is_recoverable());
//! ```

/// Machine-readable code and recoverability for an error.
///
/// # Code Format
///
/// - **UPPER_SNAKE_CASE**, e.g. `"AUTH_SERVICE_UNAVAILABLE"`
/// - **Prefixed by layer**: `GATE_`, `AUTH_`, `PROFILE_`, `STORE_`, `CONFIG_`
/// - **Stable**: once published a code does not change
///
/// # Recoverability
///
/// An error is recoverable when retrying may succeed (network, service
/// outage) or the user can fix it in place (a form field). Configuration
/// mistakes and programming errors are not recoverable.
pub trait ErrorCode {
    /// Returns a machine-readable error code.
    fn code(&self) -> &'static str;

    /// Returns whether a retry or user correction may succeed.
    fn is_recoverable(&self) -> bool;
}

/// Asserts that an error code follows the workspace conventions.
///
/// # Panics
///
/// Panics if the code is empty, lacks `expected_prefix`, or is not
/// UPPER_SNAKE_CASE. Intended for tests.
///
/// # Example
///
/// ```
/// use dyouth_types::{assert_error_code, ErrorCode};
///
/// struct Timeout;
///
/// impl ErrorCode for Timeout {
///     fn code(&self) -> &'static str { "AUTH_TIMEOUT" }
///     fn is_recoverable(&self) -> bool { true }
/// }
///
/// assert_error_code(&Timeout, "AUTH_");
/// ```
pub fn assert_error_code<E: ErrorCode>(err: &E, expected_prefix: &str) {
    let code = err.code();

    assert!(!code.is_empty(), "Error code must not be empty");
    assert!(
        code.starts_with(expected_prefix),
        "Error code '{code}' must start with prefix '{expected_prefix}'"
    );
    assert!(
        is_upper_snake_case(code),
        "Error code '{code}' must be UPPER_SNAKE_CASE"
    );
}

fn is_upper_snake_case(s: &str) -> bool {
    if s.is_empty() || s.starts_with('_') || s.ends_with('_') || s.contains("__") {
        return false;
    }

    s.chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}
