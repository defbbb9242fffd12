//! Session resolution.
//!
//! # Flow
//!
//! ```text
//! token ──▶ IdentityProvider.get_user ──▶ ProfileStore.fetch ──▶ Resolution
//!   │              │          │                 │
//!   │ None         │ Ok(None) │ Err             │ Err
//!   ▼              ▼          ▼                 ▼
//! Anonymous    Anonymous   IdentityUnknown   ProfileUnknown
//! ```
//!
//! A failure is never reported as a less privileged state. An unreachable
//! identity provider does not make the viewer anonymous, and a failed
//! profile lookup does not make the profile incomplete.

use super::{IdentityProvider, ProfileStore, ResolveError, SessionToken};
use dyouth_auth::{ProfileStatus, Viewer};
use dyouth_types::{ErrorCode, ProfileRecord, UserId};
use std::sync::Arc;
use tracing::{debug, warn};

/// Result of resolving a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// No session, or the token was rejected.
    Anonymous,
    /// Session valid and profile looked up (`None` if not set up yet).
    Authenticated {
        user_id: UserId,
        profile: Option<ProfileRecord>,
    },
    /// Session valid but the profile lookup failed.
    ProfileUnknown {
        user_id: UserId,
        error: ResolveError,
    },
    /// The identity could not be determined.
    IdentityUnknown(ResolveError),
}

impl Resolution {
    /// Returns the gate's view of this resolution.
    #[must_use]
    pub fn viewer(&self) -> Viewer {
        match self {
            Self::Anonymous => Viewer::Anonymous,
            Self::Authenticated { user_id, profile } => {
                Viewer::authenticated(user_id.clone(), ProfileStatus::from_lookup(profile.clone()))
            }
            Self::ProfileUnknown { user_id, .. } => {
                Viewer::authenticated(user_id.clone(), ProfileStatus::Unknown)
            }
            Self::IdentityUnknown(_) => Viewer::Unknown,
        }
    }

    /// Returns the failure that made part of the viewer unknown.
    #[must_use]
    pub fn error(&self) -> Option<&ResolveError> {
        match self {
            Self::Anonymous | Self::Authenticated { .. } => None,
            Self::ProfileUnknown { error, .. } | Self::IdentityUnknown(error) => Some(error),
        }
    }

    /// Returns the authenticated user, if known.
    #[must_use]
    pub fn user_id(&self) -> Option<&UserId> {
        match self {
            Self::Authenticated { user_id, .. } | Self::ProfileUnknown { user_id, .. } => {
                Some(user_id)
            }
            Self::Anonymous | Self::IdentityUnknown(_) => None,
        }
    }

    /// Returns `true` if a collaborator failed.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.error().is_some()
    }
}

/// Resolves a session token into a [`Resolution`].
///
/// Built without collaborators ([`SessionResolver::unconfigured`]) it
/// reports every session as [`ResolveError::ConfigurationMissing`].
///
/// # Example
///
/// ```
/// use dyouth_runtime::backend::memory::MemoryBackend;
/// use dyouth_runtime::session::{Resolution, SessionResolver};
/// use std::sync::Arc;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let backend = Arc::new(MemoryBackend::new());
/// let resolver = SessionResolver::new(backend.clone(), backend);
/// assert_eq!(resolver.resolve(None).await, Resolution::Anonymous);
/// # });
/// ```
#[derive(Clone)]
pub struct SessionResolver {
    backend: Option<Backend>,
}

#[derive(Clone)]
struct Backend {
    identity: Arc<dyn IdentityProvider>,
    profiles: Arc<dyn ProfileStore>,
}

impl SessionResolver {
    /// Creates a resolver over the given collaborators.
    pub fn new(identity: Arc<dyn IdentityProvider>, profiles: Arc<dyn ProfileStore>) -> Self {
        Self {
            backend: Some(Backend { identity, profiles }),
        }
    }

    /// Creates a resolver with no backend.
    #[must_use]
    pub fn unconfigured() -> Self {
        Self { backend: None }
    }

    /// Returns `true` if collaborators are attached.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.backend.is_some()
    }

    /// Returns the identity provider, if configured.
    #[must_use]
    pub fn identity_provider(&self) -> Option<&Arc<dyn IdentityProvider>> {
        self.backend.as_ref().map(|b| &b.identity)
    }

    /// Returns the profile store, if configured.
    #[must_use]
    pub fn profile_store(&self) -> Option<&Arc<dyn ProfileStore>> {
        self.backend.as_ref().map(|b| &b.profiles)
    }

    /// Resolves an explicit token.
    pub async fn resolve(&self, token: Option<&SessionToken>) -> Resolution {
        let Some(backend) = &self.backend else {
            warn!("no backend configured; session unknown");
            return Resolution::IdentityUnknown(ResolveError::ConfigurationMissing);
        };

        let Some(token) = token else {
            debug!("no session token");
            return Resolution::Anonymous;
        };

        let user_id = match backend.identity.get_user(token).await {
            Ok(Some(user_id)) => user_id,
            Ok(None) => {
                debug!("session token rejected");
                return Resolution::Anonymous;
            }
            Err(e) => {
                warn!(code = e.code(), error = %e, "identity lookup failed");
                return Resolution::IdentityUnknown(ResolveError::AuthServiceUnavailable(e));
            }
        };

        match backend.profiles.fetch(&user_id, Some(token)).await {
            Ok(profile) => {
                debug!(
                    user = %user_id,
                    found = profile.is_some(),
                    complete = profile.as_ref().is_some_and(ProfileRecord::is_complete),
                    "session resolved"
                );
                Resolution::Authenticated { user_id, profile }
            }
            Err(e) => {
                warn!(user = %user_id, code = e.code(), error = %e, "profile lookup failed");
                Resolution::ProfileUnknown {
                    error: ResolveError::ProfileLookupFailed {
                        user_id: user_id.clone(),
                        source: e,
                    },
                    user_id,
                }
            }
        }
    }

    /// Resolves whatever session the identity provider currently holds.
    pub async fn resolve_current(&self) -> Resolution {
        let Some(backend) = &self.backend else {
            return self.resolve(None).await;
        };

        match backend.identity.get_session().await {
            Ok(token) => self.resolve(token.as_ref()).await,
            Err(e) => {
                warn!(code = e.code(), error = %e, "session lookup failed");
                Resolution::IdentityUnknown(ResolveError::AuthServiceUnavailable(e))
            }
        }
    }
}

impl std::fmt::Debug for SessionResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionResolver")
            .field("configured", &self.is_configured())
            .finish()
    }
}
