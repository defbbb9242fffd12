//! In-process backend.
//!
//! Implements every collaborator trait over plain maps, with switches to
//! inject failures. Used by tests and by the CLI when exercising the
//! gate without a hosted service.
//!
//! Writes follow the hosted store's row rules: a profile row is written
//! only with a token for its owner, and uploads need a valid token.

use crate::profile::ObjectStore;
use crate::session::{
    IdentityProvider, OAuthProvider, ProfileStore, ProviderError, SessionToken, StoreError,
};
use async_trait::async_trait;
use dyouth_types::{ProfileRecord, UserId};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

const PUBLIC_BASE: &str = "memory://storage/avatars";

#[derive(Debug, Default)]
struct Failures {
    identity: Option<ProviderError>,
    profile_reads: Option<StoreError>,
    profile_writes: Option<StoreError>,
    uploads: Option<StoreError>,
}

/// Identity provider, profile store and object store in one.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    sessions: RwLock<HashMap<SessionToken, UserId>>,
    current: RwLock<Option<SessionToken>>,
    profiles: RwLock<HashMap<UserId, ProfileRecord>>,
    objects: RwLock<HashMap<String, Vec<u8>>>,
    failures: RwLock<Failures>,
    next_token: AtomicU64,
    profile_fetches: AtomicUsize,
    profile_writes: AtomicUsize,
}

impl MemoryBackend {
    /// Creates an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a valid token for `user_id`.
    pub fn issue_token(&self, user_id: UserId) -> SessionToken {
        let n = self.next_token.fetch_add(1, Ordering::Relaxed);
        let token = SessionToken::issued(format!("mem-{n}-{user_id}"));
        self.sessions.write().insert(token.clone(), user_id);
        token
    }

    /// Invalidates a token, as if it expired.
    pub fn revoke(&self, token: &SessionToken) {
        self.sessions.write().remove(token);
    }

    /// Sets the session returned by `get_session`.
    pub fn set_current_session(&self, token: Option<SessionToken>) {
        *self.current.write() = token;
    }

    /// Stores a profile directly.
    pub fn put_profile(&self, record: ProfileRecord) {
        self.profiles.write().insert(record.user_id.clone(), record);
    }

    /// Returns the stored profile for `user_id`.
    #[must_use]
    pub fn profile(&self, user_id: &UserId) -> Option<ProfileRecord> {
        self.profiles.read().get(user_id).cloned()
    }

    /// Returns the stored object under `key`.
    #[must_use]
    pub fn object(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.read().get(key).cloned()
    }

    /// Number of profile reads attempted.
    #[must_use]
    pub fn profile_fetches(&self) -> usize {
        self.profile_fetches.load(Ordering::Relaxed)
    }

    /// Number of profile writes that reached the store.
    #[must_use]
    pub fn profile_writes(&self) -> usize {
        self.profile_writes.load(Ordering::Relaxed)
    }

    /// Makes every identity call fail with `error` (`None` to heal).
    pub fn fail_identity(&self, error: Option<ProviderError>) {
        self.failures.write().identity = error;
    }

    /// Makes profile reads fail with `error` (`None` to heal).
    pub fn fail_profile_reads(&self, error: Option<StoreError>) {
        self.failures.write().profile_reads = error;
    }

    /// Makes profile writes fail with `error` (`None` to heal).
    pub fn fail_profile_writes(&self, error: Option<StoreError>) {
        self.failures.write().profile_writes = error;
    }

    /// Makes uploads fail with `error` (`None` to heal).
    pub fn fail_uploads(&self, error: Option<StoreError>) {
        self.failures.write().uploads = error;
    }

    fn identity_failure(&self) -> Result<(), ProviderError> {
        self.failures.read().identity.clone().map_or(Ok(()), Err)
    }

    fn token_owner(&self, token: Option<&SessionToken>) -> Result<UserId, StoreError> {
        token
            .and_then(|t| self.sessions.read().get(t).cloned())
            .ok_or_else(|| StoreError::rejected(401, "no valid session"))
    }
}

#[async_trait]
impl IdentityProvider for MemoryBackend {
    async fn sign_in(
        &self,
        provider: OAuthProvider,
        redirect_to: &str,
    ) -> Result<String, ProviderError> {
        self.identity_failure()?;
        Ok(format!(
            "memory://auth/authorize?provider={provider}&redirect_to={redirect_to}"
        ))
    }

    async fn get_session(&self) -> Result<Option<SessionToken>, ProviderError> {
        self.identity_failure()?;
        Ok(self.current.read().clone())
    }

    async fn get_user(&self, token: &SessionToken) -> Result<Option<UserId>, ProviderError> {
        self.identity_failure()?;
        Ok(self.sessions.read().get(token).cloned())
    }

    async fn sign_out(&self, token: &SessionToken) -> Result<(), ProviderError> {
        self.identity_failure()?;
        self.revoke(token);
        let mut current = self.current.write();
        if current.as_ref() == Some(token) {
            *current = None;
        }
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for MemoryBackend {
    async fn fetch(
        &self,
        user_id: &UserId,
        _token: Option<&SessionToken>,
    ) -> Result<Option<ProfileRecord>, StoreError> {
        self.profile_fetches.fetch_add(1, Ordering::Relaxed);
        if let Some(e) = self.failures.read().profile_reads.clone() {
            return Err(e);
        }
        Ok(self.profile(user_id))
    }

    async fn upsert(
        &self,
        record: ProfileRecord,
        token: Option<&SessionToken>,
    ) -> Result<ProfileRecord, StoreError> {
        if let Some(e) = self.failures.read().profile_writes.clone() {
            return Err(e);
        }
        if self.token_owner(token)? != record.user_id {
            return Err(StoreError::rejected(403, "row belongs to another user"));
        }
        self.profile_writes.fetch_add(1, Ordering::Relaxed);
        self.put_profile(record.clone());
        Ok(record)
    }
}

#[async_trait]
impl ObjectStore for MemoryBackend {
    async fn upload(
        &self,
        key: &str,
        bytes: Vec<u8>,
        _content_type: &str,
        token: Option<&SessionToken>,
    ) -> Result<String, StoreError> {
        if let Some(e) = self.failures.read().uploads.clone() {
            return Err(e);
        }
        self.token_owner(token)?;
        self.objects.write().insert(key.to_string(), bytes);
        Ok(format!("{PUBLIC_BASE}/{key}"))
    }
}
