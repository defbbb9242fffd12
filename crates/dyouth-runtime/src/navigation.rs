//! Navigation lifecycle for one client.
//!
//! # View States
//!
//! ```text
//!           begin(path)
//!   Idle ──────────────▶ Loading ──Allow────────▶ Rendered
//!                          │  ├──RedirectTo────▶ Redirected
//!                          │  └──Indeterminate─▶ Degraded
//!                          │
//!                          └── newer begin() ──▶ (stale, discarded)
//! ```
//!
//! While `Loading` nothing is rendered: neither the page nor a redirect.
//! Each [`Navigator::begin`] bumps a generation counter, and
//! [`Navigator::complete`] drops tickets from older generations so a slow
//! resolution never overrides a newer navigation.
//!
//! # Degraded Navigation
//!
//! An `Indeterminate` verdict keeps the previously rendered page if there
//! is one. On first load the requested page renders. Either way a
//! [`Banner`] is raised and stays up until a navigation resolves without
//! collaborator failures.

use crate::session::{Resolution, SessionContext};
use dyouth_auth::{AccessDecision, AccessPolicy, Verdict};
use dyouth_types::ErrorCode;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What the client is currently showing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ViewState {
    /// Nothing requested yet.
    Idle,
    /// Waiting for the session to resolve.
    Loading { path: String },
    /// Page shown.
    Rendered { path: String },
    /// Sent elsewhere.
    Redirected { from: String, to: String },
    /// Page shown without a full access check.
    Degraded { path: String, reason: String },
}

/// Handle for one in-flight navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationTicket {
    generation: u64,
    path: String,
}

impl NavigationTicket {
    /// Returns the requested path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the generation this ticket belongs to.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Result of a completed navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum NavigationOutcome {
    /// Show the page.
    Render { path: String },
    /// Navigate to `to` instead.
    Redirect { from: String, to: String },
    /// Keep showing `path`; the requested page could not be checked.
    Stand { path: String, reason: String },
    /// A newer navigation started first.
    Superseded,
}

/// Non-blocking notice that access checks are degraded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Banner {
    /// Stable error code of the failure.
    pub code: &'static str,
    /// Human-readable message.
    pub message: String,
}

#[derive(Debug)]
struct State {
    generation: u64,
    view: ViewState,
    last_rendered: Option<String>,
    banner: Option<Banner>,
}

/// Drives navigations through the session and the access policy.
pub struct Navigator {
    policy: Arc<dyn AccessPolicy>,
    session: Arc<SessionContext>,
    state: Mutex<State>,
}

impl Navigator {
    /// Creates an idle navigator.
    pub fn new(policy: Arc<dyn AccessPolicy>, session: Arc<SessionContext>) -> Self {
        Self {
            policy,
            session,
            state: Mutex::new(State {
                generation: 0,
                view: ViewState::Idle,
                last_rendered: None,
                banner: None,
            }),
        }
    }

    /// Returns the session context.
    #[must_use]
    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    /// Returns the current view state.
    #[must_use]
    pub fn view(&self) -> ViewState {
        self.state.lock().view.clone()
    }

    /// Returns the degraded-mode banner, if raised.
    #[must_use]
    pub fn banner(&self) -> Option<Banner> {
        self.state.lock().banner.clone()
    }

    /// Starts a navigation and enters `Loading`.
    pub fn begin(&self, path: &str) -> NavigationTicket {
        let mut state = self.state.lock();
        state.generation += 1;
        state.view = ViewState::Loading {
            path: path.to_string(),
        };
        debug!(path, generation = state.generation, "navigation started");
        NavigationTicket {
            generation: state.generation,
            path: path.to_string(),
        }
    }

    /// Finishes a navigation with a resolved session.
    ///
    /// Returns `None` if a newer navigation has started since `ticket`
    /// was issued.
    pub fn complete(
        &self,
        ticket: &NavigationTicket,
        resolution: &Resolution,
    ) -> Option<NavigationOutcome> {
        let verdict = self.policy.evaluate(&ticket.path, &resolution.viewer());

        let mut state = self.state.lock();
        if ticket.generation != state.generation {
            debug!(
                path = %ticket.path,
                stale = ticket.generation,
                current = state.generation,
                "discarding stale navigation"
            );
            return None;
        }

        state.banner = resolution.error().map(|e| Banner {
            code: e.code(),
            message: e.to_string(),
        });

        let path = ticket.path.clone();
        let outcome = match verdict {
            Verdict::Decided(AccessDecision::Allow) => {
                state.view = ViewState::Rendered { path: path.clone() };
                state.last_rendered = Some(path.clone());
                NavigationOutcome::Render { path }
            }
            Verdict::Decided(AccessDecision::RedirectTo(to)) => {
                state.view = ViewState::Redirected {
                    from: path.clone(),
                    to: to.clone(),
                };
                NavigationOutcome::Redirect { from: path, to }
            }
            Verdict::Indeterminate => {
                let reason = state
                    .banner
                    .as_ref()
                    .map_or_else(|| "access could not be verified".to_string(), |b| b.message.clone());
                warn!(path = %path, reason = %reason, "access indeterminate");

                match state.last_rendered.clone() {
                    Some(previous) => {
                        state.view = ViewState::Degraded {
                            path: previous.clone(),
                            reason: reason.clone(),
                        };
                        NavigationOutcome::Stand {
                            path: previous,
                            reason,
                        }
                    }
                    None => {
                        state.view = ViewState::Degraded {
                            path: path.clone(),
                            reason,
                        };
                        state.last_rendered = Some(path.clone());
                        NavigationOutcome::Render { path }
                    }
                }
            }
        };

        info!(outcome = ?outcome, "navigation complete");
        Some(outcome)
    }

    /// Runs a full navigation: begin, resolve, evaluate, complete.
    pub async fn navigate(&self, path: &str) -> NavigationOutcome {
        let ticket = self.begin(path);
        let resolution = self.session.current().await;
        self.complete(&ticket, &resolution)
            .unwrap_or(NavigationOutcome::Superseded)
    }
}

impl std::fmt::Debug for Navigator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Navigator")
            .field("state", &*self.state.lock())
            .finish_non_exhaustive()
    }
}
