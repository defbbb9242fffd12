//! Collaborator contracts consumed by the session layer.
//!
//! ```text
//! SessionResolver
//!   ├── IdentityProvider   sign in, session token, user, sign out
//!   └── ProfileStore       fetch / upsert ProfileRecord by UserId, as the token
//! ```
//!
//! Both traits are object safe (`async_trait`) so the runtime can hold
//! them as `Arc<dyn _>` and swap the REST backend for the in-memory one.

use super::{ProviderError, StoreError};
use async_trait::async_trait;
use dyouth_types::{ProfileRecord, UserId};
use std::fmt;

/// Opaque session token issued by the identity provider.
///
/// `Debug` never prints the token itself.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wraps a raw token. Returns `None` for a blank string.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self(raw))
        }
    }

    /// Wraps a token minted by an in-process provider.
    pub(crate) fn issued(raw: String) -> Self {
        Self(raw)
    }

    /// Returns the raw token for use in an `Authorization` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(***)")
    }
}

/// OAuth providers offered on the login page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OAuthProvider {
    Google,
}

impl OAuthProvider {
    /// Returns the provider name used in the authorize URL.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Google => "google",
        }
    }
}

impl fmt::Display for OAuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity provider boundary.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Starts an OAuth sign-in and returns the URL to send the browser to.
    ///
    /// `redirect_to` is where the provider returns after consent,
    /// normally the public `/auth/callback` page.
    async fn sign_in(
        &self,
        provider: OAuthProvider,
        redirect_to: &str,
    ) -> Result<String, ProviderError>;

    /// Returns the session token the provider currently holds, if any.
    async fn get_session(&self) -> Result<Option<SessionToken>, ProviderError>;

    /// Validates a token.
    ///
    /// `Ok(None)` means the token is invalid or expired. `Err` is reserved
    /// for the provider itself failing.
    async fn get_user(&self, token: &SessionToken) -> Result<Option<UserId>, ProviderError>;

    /// Ends the session.
    async fn sign_out(&self, token: &SessionToken) -> Result<(), ProviderError>;
}

/// Profile data store boundary.
///
/// Calls carry the session they act for. The store enforces row ownership
/// against that token; `None` acts with public access only.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Reads the profile for `user_id`. `Ok(None)` if there is none yet.
    async fn fetch(
        &self,
        user_id: &UserId,
        token: Option<&SessionToken>,
    ) -> Result<Option<ProfileRecord>, StoreError>;

    /// Inserts or replaces the profile keyed by its user id.
    ///
    /// Returns the record as stored.
    async fn upsert(
        &self,
        record: ProfileRecord,
        token: Option<&SessionToken>,
    ) -> Result<ProfileRecord, StoreError>;
}
