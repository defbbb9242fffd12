//! HTTP backend for the hosted auth / data / storage service.
//!
//! # Endpoints
//!
//! | Operation | Request |
//! |-----------|---------|
//! | sign in | `GET {url}/auth/v1/authorize?provider=..&redirect_to=..` (URL only) |
//! | user | `GET {url}/auth/v1/user` |
//! | sign out | `POST {url}/auth/v1/logout` |
//! | fetch profile | `GET {url}/rest/v1/profiles?id=eq.{id}&select=*` |
//! | upsert profile | `POST {url}/rest/v1/profiles` (merge duplicates) |
//! | upload avatar | `POST {url}/storage/v1/object/avatars/{key}` (`x-upsert: true`) |
//!
//! Every request carries the `apikey` header. Data and storage requests
//! are authorized with the token of the session they act for, otherwise
//! with the anon key. The held session only answers `get_session`.
//!
//! # Status Mapping
//!
//! | Response | Identity | Store |
//! |----------|----------|-------|
//! | transport error / timeout | `Unavailable` | `Unavailable` |
//! | 401, 403 on `/user` | no session | - |
//! | 5xx | `UnexpectedResponse` | `Unavailable` |
//! | other 4xx | `UnexpectedResponse` | `Rejected` |

use crate::config::BackendConfig;
use crate::profile::ObjectStore;
use crate::rows::ProfileRow;
use crate::session::{
    IdentityProvider, OAuthProvider, ProfileStore, ProviderError, SessionToken, StoreError,
};
use async_trait::async_trait;
use dyouth_types::{ErrorCode, ProfileRecord, UserId};
use parking_lot::RwLock;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

const AVATAR_BUCKET: &str = "avatars";

/// Failure building the HTTP client.
#[derive(Debug, Error)]
pub enum RestError {
    /// `backend.url` and `backend.anon_key` are both required.
    #[error("backend url and anon key are required")]
    NotConfigured,

    /// `backend.url` is not an absolute http(s) URL.
    #[error("invalid backend url '{url}'")]
    InvalidUrl { url: String },

    /// The HTTP client could not be built.
    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),
}

impl ErrorCode for RestError {
    fn code(&self) -> &'static str {
        match self {
            Self::NotConfigured => "CONFIG_BACKEND_MISSING",
            Self::InvalidUrl { .. } => "CONFIG_BACKEND_URL",
            Self::Client(_) => "BACKEND_CLIENT",
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }
}

#[derive(Deserialize)]
struct UserBody {
    id: String,
}

/// REST client implementing every collaborator trait.
#[derive(Debug)]
pub struct RestBackend {
    client: Client,
    base: String,
    anon_key: String,
    session: RwLock<Option<SessionToken>>,
}

impl RestBackend {
    /// Builds a client from the `[backend]` section.
    ///
    /// # Errors
    ///
    /// Returns [`RestError::NotConfigured`] if url or key is missing,
    /// [`RestError::InvalidUrl`] for a non-http(s) URL.
    pub fn from_config(config: &BackendConfig) -> Result<Self, RestError> {
        let (Some(url), Some(anon_key)) = (&config.url, &config.anon_key) else {
            return Err(RestError::NotConfigured);
        };
        if !config.is_configured() {
            return Err(RestError::NotConfigured);
        }

        let base = url.trim().trim_end_matches('/').to_string();
        let valid = Url::parse(&base)
            .map(|u| matches!(u.scheme(), "http" | "https"))
            .unwrap_or(false);
        if !valid {
            return Err(RestError::InvalidUrl { url: url.clone() });
        }

        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            client,
            base,
            anon_key: anon_key.trim().to_string(),
            session: RwLock::new(None),
        })
    }

    /// Holds `token` as the current session.
    #[must_use]
    pub fn with_session(self, token: SessionToken) -> Self {
        *self.session.write() = Some(token);
        self
    }

    /// Public URL of an avatar object.
    #[must_use]
    pub fn public_avatar_url(&self, key: &str) -> String {
        format!("{}/storage/v1/object/public/{AVATAR_BUCKET}/{key}", self.base)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    fn authorized(&self, request: RequestBuilder, token: Option<&SessionToken>) -> RequestBuilder {
        let bearer = token.map_or(self.anon_key.as_str(), SessionToken::expose);
        request.header("apikey", &self.anon_key).bearer_auth(bearer)
    }

}

fn store_transport(e: &reqwest::Error) -> StoreError {
    StoreError::unavailable(e.to_string())
}

async fn store_status(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    if status.is_server_error() {
        Err(StoreError::unavailable(format!("{status}: {body}")))
    } else {
        Err(StoreError::rejected(status.as_u16(), body))
    }
}

#[async_trait]
impl IdentityProvider for RestBackend {
    async fn sign_in(
        &self,
        provider: OAuthProvider,
        redirect_to: &str,
    ) -> Result<String, ProviderError> {
        let url = Url::parse_with_params(
            &self.url("/auth/v1/authorize"),
            &[("provider", provider.as_str()), ("redirect_to", redirect_to)],
        )
        .map_err(|e| ProviderError::unavailable(e.to_string()))?;
        Ok(url.into())
    }

    async fn get_session(&self) -> Result<Option<SessionToken>, ProviderError> {
        Ok(self.session.read().clone())
    }

    async fn get_user(&self, token: &SessionToken) -> Result<Option<UserId>, ProviderError> {
        let request = self.authorized(self.client.get(self.url("/auth/v1/user")), Some(token));
        let response = request
            .send()
            .await
            .map_err(|e| ProviderError::unavailable(e.to_string()))?;

        let status = response.status();
        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            debug!(status = status.as_u16(), "session token rejected");
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::unexpected(status.as_u16(), body));
        }

        let user: UserBody = response
            .json()
            .await
            .map_err(|e| ProviderError::unexpected(status.as_u16(), e.to_string()))?;
        UserId::new(user.id)
            .map(Some)
            .map_err(|e| ProviderError::unexpected(status.as_u16(), e.to_string()))
    }

    async fn sign_out(&self, token: &SessionToken) -> Result<(), ProviderError> {
        let request = self.authorized(self.client.post(self.url("/auth/v1/logout")), Some(token));
        let response = request
            .send()
            .await
            .map_err(|e| ProviderError::unavailable(e.to_string()))?;

        {
            let mut session = self.session.write();
            if session.as_ref() == Some(token) {
                *session = None;
            }
        }

        let status = response.status();
        if status.is_success() || status == StatusCode::UNAUTHORIZED {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ProviderError::unexpected(status.as_u16(), body))
        }
    }
}

#[async_trait]
impl ProfileStore for RestBackend {
    async fn fetch(
        &self,
        user_id: &UserId,
        token: Option<&SessionToken>,
    ) -> Result<Option<ProfileRecord>, StoreError> {
        let request = self
            .client
            .get(self.url("/rest/v1/profiles"))
            .query(&[("id", format!("eq.{user_id}")), ("select", "*".to_string())]);
        let response = self
            .authorized(request, token)
            .send()
            .await
            .map_err(|e| store_transport(&e))?;

        let rows: Vec<ProfileRow> = store_status(response)
            .await?
            .json()
            .await
            .map_err(|e| StoreError::decode(e.to_string()))?;

        rows.into_iter()
            .next()
            .map(ProfileRecord::try_from)
            .transpose()
            .map_err(|e| StoreError::decode(e.to_string()))
    }

    async fn upsert(
        &self,
        record: ProfileRecord,
        token: Option<&SessionToken>,
    ) -> Result<ProfileRecord, StoreError> {
        let request = self
            .client
            .post(self.url("/rest/v1/profiles"))
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(&[ProfileRow::from(&record)]);
        let response = self
            .authorized(request, token)
            .send()
            .await
            .map_err(|e| store_transport(&e))?;

        let rows: Vec<ProfileRow> = store_status(response)
            .await?
            .json()
            .await
            .map_err(|e| StoreError::decode(e.to_string()))?;

        match rows.into_iter().next() {
            Some(row) => ProfileRecord::try_from(row).map_err(|e| StoreError::decode(e.to_string())),
            None => Ok(record),
        }
    }
}

#[async_trait]
impl ObjectStore for RestBackend {
    async fn upload(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
        token: Option<&SessionToken>,
    ) -> Result<String, StoreError> {
        let request = self
            .client
            .post(self.url(&format!("/storage/v1/object/{AVATAR_BUCKET}/{key}")))
            .header("x-upsert", "true")
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes);
        let response = self
            .authorized(request, token)
            .send()
            .await
            .map_err(|e| store_transport(&e))?;

        store_status(response).await?;
        Ok(self.public_avatar_url(key))
    }
}
