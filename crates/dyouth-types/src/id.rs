//! Identifier types.
//!
//! User identifiers are issued by the external identity provider and are
//! opaque to this workspace. The only guarantee enforced here is that an
//! identifier is never empty.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier of an authenticated user.
///
/// Issued by the identity provider when a session token is validated,
/// and used as the key of the user's [`ProfileRecord`](crate::ProfileRecord).
///
/// # Example
///
/// ```
/// use dyouth_types::UserId;
///
/// let id = UserId::new("8a3f-user").unwrap();
/// assert_eq!(id.as_str(), "8a3f-user");
/// assert!(UserId::new("  ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

/// Error returned when constructing a [`UserId`] from an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("user id must not be empty")]
pub struct EmptyUserId;

impl UserId {
    /// Creates a user id, rejecting empty or whitespace-only input.
    ///
    /// # Errors
    ///
    /// Returns [`EmptyUserId`] if `raw` is blank.
    pub fn new(raw: impl Into<String>) -> Result<Self, EmptyUserId> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(EmptyUserId);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UserId {
    type Error = EmptyUserId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
