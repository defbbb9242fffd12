//! Per-client session state.
//!
//! [`SessionContext`] is the only state that survives between
//! navigations: the current token and the last resolution for it.
//!
//! # Invalidation
//!
//! | Event | Token | Cache | Completed user |
//! |-------|-------|-------|----------------|
//! | `sign_in_callback` | replaced | cleared | cleared if user changes |
//! | `sign_out` | cleared | cleared | cleared |
//! | `record_profile` | kept | patched | set if complete |
//! | TTL expiry | kept | refreshed | kept |
//!
//! Every mutation bumps an epoch. A resolution that started before the
//! bump is discarded, neither cached nor returned, so a slow lookup can
//! not resurrect a signed-out session.

use super::{OAuthProvider, ProviderError, Resolution, SessionResolver, SessionToken};
use dyouth_auth::AccessGate;
use dyouth_types::{ProfileRecord, UserId};
use parking_lot::RwLock;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

#[derive(Debug, Default)]
struct State {
    token: Option<SessionToken>,
    cached: Option<Cached>,
    completed: Option<ProfileRecord>,
    epoch: u64,
}

#[derive(Debug, Clone)]
struct Cached {
    resolution: Resolution,
    at: Instant,
}

/// Session state shared by all navigations of one client.
#[derive(Debug)]
pub struct SessionContext {
    resolver: SessionResolver,
    ttl: Duration,
    state: RwLock<State>,
}

impl SessionContext {
    /// Creates a context. `ttl` of zero re-resolves on every call.
    #[must_use]
    pub fn new(resolver: SessionResolver, ttl: Duration) -> Self {
        Self {
            resolver,
            ttl,
            state: RwLock::new(State::default()),
        }
    }

    /// Creates a context that already holds `token`.
    #[must_use]
    pub fn with_token(resolver: SessionResolver, ttl: Duration, token: SessionToken) -> Self {
        let ctx = Self::new(resolver, ttl);
        ctx.state.write().token = Some(token);
        ctx
    }

    /// Returns the resolver.
    #[must_use]
    pub fn resolver(&self) -> &SessionResolver {
        &self.resolver
    }

    /// Returns the current token.
    #[must_use]
    pub fn token(&self) -> Option<SessionToken> {
        self.state.read().token.clone()
    }

    /// Returns the resolution for the current token.
    ///
    /// Served from cache while younger than the TTL. Otherwise resolves,
    /// with the lock released across the await. A resolution overtaken
    /// by a session change is dropped and the new session resolved.
    pub async fn current(&self) -> Resolution {
        loop {
            let (token, epoch) = {
                let state = self.state.read();
                if let Some(cached) = &state.cached {
                    if !self.ttl.is_zero() && cached.at.elapsed() < self.ttl {
                        debug!("session served from cache");
                        return cached.resolution.clone();
                    }
                }
                (state.token.clone(), state.epoch)
            };

            let resolution = self.resolver.resolve(token.as_ref()).await;

            let mut state = self.state.write();
            if state.epoch != epoch {
                debug!("session changed during resolution; resolving again");
                continue;
            }
            let resolution = apply_completion(&mut state.completed, resolution);
            state.cached = Some(Cached {
                resolution: resolution.clone(),
                at: Instant::now(),
            });
            return resolution;
        }
    }

    /// Drops the cached resolution.
    pub fn invalidate(&self) {
        let mut state = self.state.write();
        state.cached = None;
        state.epoch += 1;
    }

    /// Starts an OAuth sign-in. Returns the provider URL.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] if the provider fails, or
    /// [`ProviderError::Unavailable`] when no backend is configured.
    pub async fn sign_in(
        &self,
        provider: OAuthProvider,
        redirect_to: &str,
    ) -> Result<String, ProviderError> {
        let identity = self
            .resolver
            .identity_provider()
            .ok_or_else(|| ProviderError::unavailable("backend not configured"))?;
        identity.sign_in(provider, redirect_to).await
    }

    /// Handles the OAuth callback.
    ///
    /// Installs `token`, resolves it, and returns where the viewer should
    /// land: home with a complete profile, setup otherwise.
    pub async fn sign_in_callback(&self, token: SessionToken, gate: &AccessGate) -> String {
        {
            let mut state = self.state.write();
            state.token = Some(token);
            state.cached = None;
            state.epoch += 1;
        }

        let resolution = self.current().await;
        let landing = gate.landing_after_sign_in(&resolution.viewer()).to_string();
        info!(
            user = ?resolution.user_id().map(UserId::as_str),
            landing = %landing,
            "signed in"
        );
        landing
    }

    /// Signs out.
    ///
    /// Local state is cleared even if the provider call fails; the
    /// provider error is still returned.
    ///
    /// # Errors
    ///
    /// Returns the provider's error, if any.
    pub async fn sign_out(&self) -> Result<(), ProviderError> {
        let token = {
            let mut state = self.state.write();
            state.cached = None;
            state.completed = None;
            state.epoch += 1;
            state.token.take()
        };

        let (Some(token), Some(identity)) = (token, self.resolver.identity_provider()) else {
            info!("signed out");
            return Ok(());
        };

        match identity.sign_out(&token).await {
            Ok(()) => {
                info!("signed out");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "provider sign-out failed; local session cleared");
                Err(e)
            }
        }
    }

    /// Installs a freshly saved profile.
    ///
    /// If the cached resolution belongs to the same user it is patched in
    /// place so profile-gated routes open on the next navigation.
    pub fn record_profile(&self, profile: ProfileRecord) {
        let mut state = self.state.write();
        state.epoch += 1;

        if profile.is_complete() {
            state.completed = Some(profile.clone());
        }

        let same_user = state
            .cached
            .as_ref()
            .and_then(|c| c.resolution.user_id())
            .is_some_and(|id| *id == profile.user_id);

        if same_user {
            let user_id = profile.user_id.clone();
            state.cached = Some(Cached {
                resolution: Resolution::Authenticated {
                    user_id,
                    profile: Some(profile),
                },
                at: Instant::now(),
            });
            debug!("cached profile replaced");
        }
    }
}

/// Keeps a user complete once observed complete.
///
/// A profile that was complete in this context is not downgraded by a
/// lagging or failed read. Any other user resets the memory.
fn apply_completion(completed: &mut Option<ProfileRecord>, resolution: Resolution) -> Resolution {
    let Some(user_id) = resolution.user_id().cloned() else {
        if !matches!(resolution, Resolution::IdentityUnknown(_)) {
            *completed = None;
        }
        return resolution;
    };

    match (&resolution, completed.as_ref()) {
        (Resolution::Authenticated { profile: Some(p), .. }, _) if p.is_complete() => {
            *completed = Some(p.clone());
            resolution
        }
        (_, Some(known)) if known.user_id == user_id => {
            debug!(user = %user_id, "keeping completed profile");
            Resolution::Authenticated {
                user_id,
                profile: Some(known.clone()),
            }
        }
        _ => {
            *completed = None;
            resolution
        }
    }
}
