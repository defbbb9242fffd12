//! Viewer identity types.
//!
//! A [`Viewer`] is what the gate knows about the person navigating:
//!
//! ```text
//! Viewer
//!  ├── Anonymous                      no valid session
//!  ├── Authenticated { identity,
//!  │                   profile }      session valid
//!  │      profile: Absent | Present(record) | Unknown
//!  └── Unknown                        identity provider unreachable
//! ```
//!
//! The `Unknown` forms exist only because collaborators can fail. They
//! are never collapsed into `Anonymous` or `Absent`.

use dyouth_types::{ProfileRecord, UserId};
use serde::{Deserialize, Serialize};

/// Authentication outcome for the current session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// `true` if the identity provider accepted the session.
    pub is_authenticated: bool,
    /// Present exactly when authenticated.
    pub user_id: Option<UserId>,
}

impl Identity {
    /// An unauthenticated identity.
    #[must_use]
    pub fn anonymous() -> Self {
        Self {
            is_authenticated: false,
            user_id: None,
        }
    }

    /// An authenticated identity for `user_id`.
    #[must_use]
    pub fn authenticated(user_id: UserId) -> Self {
        Self {
            is_authenticated: true,
            user_id: Some(user_id),
        }
    }
}

/// What is known about the viewer's profile record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileStatus {
    /// Looked up and not found (signed up, not yet set up).
    Absent,
    /// Looked up and found. May still be incomplete.
    Present(ProfileRecord),
    /// Lookup failed; completeness cannot be judged.
    Unknown,
}

impl ProfileStatus {
    /// Wraps an optional record.
    #[must_use]
    pub fn from_lookup(record: Option<ProfileRecord>) -> Self {
        record.map_or(Self::Absent, Self::Present)
    }

    /// Returns the record if present.
    #[must_use]
    pub fn record(&self) -> Option<&ProfileRecord> {
        match self {
            Self::Present(record) => Some(record),
            Self::Absent | Self::Unknown => None,
        }
    }

    /// `Some(true)` if complete, `Some(false)` if absent or incomplete,
    /// `None` if unknown.
    #[must_use]
    pub fn is_complete(&self) -> Option<bool> {
        match self {
            Self::Present(record) => Some(record.is_complete()),
            Self::Absent => Some(false),
            Self::Unknown => None,
        }
    }
}

/// State-machine view of a navigating user.
///
/// ```text
///   Anonymous ──sign in──▶ AuthIncomplete ──profile upsert──▶ AuthComplete
///       ▲          └──────────sign in (profile exists)───────────▶ │
///       └──────────────────────── sign out ◀─────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewerState {
    /// No valid session.
    Anonymous,
    /// Signed in, profile absent or without a display name.
    AuthIncomplete,
    /// Signed in with a complete profile.
    AuthComplete,
}

impl ViewerState {
    /// Returns the snake_case name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Anonymous => "anonymous",
            Self::AuthIncomplete => "auth_incomplete",
            Self::AuthComplete => "auth_complete",
        }
    }
}

impl std::fmt::Display for ViewerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the gate knows about the current viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Viewer {
    /// No valid session.
    Anonymous,
    /// Valid session.
    Authenticated {
        /// Authenticated user.
        user_id: UserId,
        /// Profile lookup result.
        profile: ProfileStatus,
    },
    /// The identity provider could not be reached.
    Unknown,
}

impl Viewer {
    /// Signed-in viewer with a profile lookup result.
    #[must_use]
    pub fn authenticated(user_id: UserId, profile: ProfileStatus) -> Self {
        Self::Authenticated { user_id, profile }
    }

    /// Returns the [`Identity`], or `None` while unknown.
    #[must_use]
    pub fn identity(&self) -> Option<Identity> {
        match self {
            Self::Anonymous => Some(Identity::anonymous()),
            Self::Authenticated { user_id, .. } => Some(Identity::authenticated(user_id.clone())),
            Self::Unknown => None,
        }
    }

    /// Returns the user id if signed in.
    #[must_use]
    pub fn user_id(&self) -> Option<&UserId> {
        match self {
            Self::Authenticated { user_id, .. } => Some(user_id),
            Self::Anonymous | Self::Unknown => None,
        }
    }

    /// Returns the profile record if signed in and present.
    #[must_use]
    pub fn profile(&self) -> Option<&ProfileRecord> {
        match self {
            Self::Authenticated { profile, .. } => profile.record(),
            Self::Anonymous | Self::Unknown => None,
        }
    }

    /// Returns the state-machine state, or `None` if anything is unknown.
    ///
    /// # Example
    ///
    /// ```
    /// use dyouth_auth::{ProfileStatus, Viewer, ViewerState};
    /// use dyouth_types::UserId;
    ///
    /// let id = UserId::new("u-1").unwrap();
    /// let viewer = Viewer::authenticated(id, ProfileStatus::Absent);
    /// assert_eq!(viewer.state(), Some(ViewerState::AuthIncomplete));
    /// assert_eq!(Viewer::Unknown.state(), None);
    /// ```
    #[must_use]
    pub fn state(&self) -> Option<ViewerState> {
        match self {
            Self::Anonymous => Some(ViewerState::Anonymous),
            Self::Authenticated { profile, .. } => profile.is_complete().map(|complete| {
                if complete {
                    ViewerState::AuthComplete
                } else {
                    ViewerState::AuthIncomplete
                }
            }),
            Self::Unknown => None,
        }
    }
}
