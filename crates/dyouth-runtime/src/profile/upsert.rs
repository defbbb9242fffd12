//! Profile write path.
//!
//! ```text
//! ProfileForm ──validate──▶ [ObjectStore.upload] ──▶ ProfileStore.upsert ──▶ ProfileRecord
//!      │                          │                        │
//!      ▼                          ▼                        ▼
//! Validation                 UploadFailed              WriteFailed
//! (nothing sent)             (no row write)            (prior row untouched)
//! ```
//!
//! Avatars are uploaded under a fresh key each time. A failed row write
//! leaves the prior record pointing at its own, unchanged object.

use super::{ProfileForm, ValidationError};
use crate::config::ProfileConfig;
use crate::session::{ProfileStore, SessionContext, SessionToken, StoreError};
use async_trait::async_trait;
use chrono::Utc;
use dyouth_types::{ErrorCode, ProfileRecord, UserId};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Avatar object store boundary.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Uploads `bytes` under `key` on behalf of `token`, replacing any
    /// existing object.
    ///
    /// Returns the public URL of the object.
    async fn upload(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
        token: Option<&SessionToken>,
    ) -> Result<String, StoreError>;
}

/// Why a profile could not be saved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpsertError {
    #[error("invalid profile: {0}")]
    Validation(#[from] ValidationError),

    #[error("sign in to save a profile")]
    NotSignedIn,

    #[error("profile of {user_id} belongs to another user")]
    NotOwner { user_id: UserId },

    #[error("avatar upload failed")]
    UploadFailed(#[source] StoreError),

    #[error("profile write failed")]
    WriteFailed(#[source] StoreError),
}

impl ErrorCode for UpsertError {
    fn code(&self) -> &'static str {
        match self {
            Self::Validation(e) => e.code(),
            Self::NotSignedIn => "PROFILE_NOT_SIGNED_IN",
            Self::NotOwner { .. } => "PROFILE_NOT_OWNER",
            Self::UploadFailed(_) => "PROFILE_UPLOAD_FAILED",
            Self::WriteFailed(_) => "PROFILE_WRITE_FAILED",
        }
    }

    fn is_recoverable(&self) -> bool {
        !matches!(self, Self::NotSignedIn | Self::NotOwner { .. })
    }
}

/// Saves profile forms.
pub struct ProfileUpsert {
    profiles: Arc<dyn ProfileStore>,
    objects: Arc<dyn ObjectStore>,
    rules: ProfileConfig,
}

impl ProfileUpsert {
    /// Creates the write path.
    pub fn new(
        profiles: Arc<dyn ProfileStore>,
        objects: Arc<dyn ObjectStore>,
        rules: ProfileConfig,
    ) -> Self {
        Self {
            profiles,
            objects,
            rules,
        }
    }

    /// Validates and saves `form` with the authority of `token`.
    ///
    /// Without a new avatar the avatar URL of `prior` is kept. Ownership
    /// is left to the store; [`submit_for`](Self::submit_for) checks it
    /// against the session first.
    ///
    /// # Errors
    ///
    /// See [`UpsertError`].
    pub async fn submit(
        &self,
        form: ProfileForm,
        prior: Option<&ProfileRecord>,
        token: Option<&SessionToken>,
    ) -> Result<ProfileRecord, UpsertError> {
        form.validate(&self.rules)?;

        let avatar_url = match &form.avatar {
            Some(avatar) => {
                let key = avatar.object_key(&form.user_id, Utc::now().timestamp_millis());
                self.objects
                    .upload(&key, avatar.bytes.clone(), &avatar.content_type, token)
                    .await
                    .map_err(|e| {
                        warn!(user = %form.user_id, key = %key, error = %e, "avatar upload failed");
                        UpsertError::UploadFailed(e)
                    })?
            }
            None => prior
                .filter(|p| p.user_id == form.user_id)
                .map(|p| p.avatar_url.clone())
                .unwrap_or_default(),
        };

        let record = form.to_record(avatar_url);
        let saved = self.profiles.upsert(record, token).await.map_err(|e| {
            warn!(user = %form.user_id, error = %e, "profile write failed");
            UpsertError::WriteFailed(e)
        })?;

        info!(user = %saved.user_id, complete = saved.is_complete(), "profile saved");
        Ok(saved)
    }

    /// Saves `form` for the signed-in viewer and installs the result in
    /// `session`, so profile-gated routes open on the next navigation.
    ///
    /// # Errors
    ///
    /// [`UpsertError::NotSignedIn`] without an identified viewer,
    /// [`UpsertError::NotOwner`] if `form` is for someone else, otherwise
    /// as [`submit`](Self::submit). The session is untouched on error.
    pub async fn submit_for(
        &self,
        form: ProfileForm,
        session: &SessionContext,
    ) -> Result<ProfileRecord, UpsertError> {
        let resolution = session.current().await;
        let Some(viewer_id) = resolution.user_id() else {
            warn!(user = %form.user_id, "profile submitted without a session");
            return Err(UpsertError::NotSignedIn);
        };
        if *viewer_id != form.user_id {
            warn!(viewer = %viewer_id, user = %form.user_id, "profile submitted for another user");
            return Err(UpsertError::NotOwner {
                user_id: form.user_id,
            });
        }

        let viewer = resolution.viewer();
        let token = session.token();
        let saved = self.submit(form, viewer.profile(), token.as_ref()).await?;
        session.record_profile(saved.clone());
        Ok(saved)
    }
}

impl std::fmt::Debug for ProfileUpsert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileUpsert")
            .field("rules", &self.rules)
            .finish_non_exhaustive()
    }
}
