//! Collaborator implementations.
//!
//! | Backend | Used for |
//! |---------|----------|
//! | [`rest::RestBackend`] | the hosted auth / data / storage service |
//! | [`memory::MemoryBackend`] | tests and offline gate checks |

pub mod memory;
pub mod rest;

use crate::config::BackendConfig;
use crate::session::{SessionResolver, SessionToken};
use rest::{RestBackend, RestError};
use dyouth_types::ErrorCode;
use std::sync::Arc;
use tracing::{debug, warn};

/// Builds a [`SessionResolver`] over the REST backend described by `config`.
///
/// Without a usable url and anon key the resolver is unconfigured and
/// every resolution reports the missing configuration, so the gate fails
/// open instead of refusing to start.
///
/// # Errors
///
/// Returns [`RestError::Client`] if the HTTP client cannot be built.
pub fn session_resolver(
    config: &BackendConfig,
    token: Option<SessionToken>,
) -> Result<SessionResolver, RestError> {
    if !config.is_configured() {
        warn!("backend url or anon key missing; gate runs without a session service");
        return Ok(SessionResolver::unconfigured());
    }

    let mut backend = match RestBackend::from_config(config) {
        Ok(backend) => backend,
        Err(e @ (RestError::NotConfigured | RestError::InvalidUrl { .. })) => {
            warn!(
                code = e.code(),
                error = %e,
                "backend unusable; gate runs without a session service"
            );
            return Ok(SessionResolver::unconfigured());
        }
        Err(e) => return Err(e),
    };
    if let Some(token) = token {
        backend = backend.with_session(token);
    }
    debug!(timeout_ms = config.timeout_ms, "rest backend ready");

    let backend = Arc::new(backend);
    Ok(SessionResolver::new(backend.clone(), backend))
}
