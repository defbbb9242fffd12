//! The access gate.
//!
//! [`AccessGate`] combines a [`RouteTable`] with the three well-known
//! pages (login, profile setup, home) and implements [`AccessPolicy`].
//!
//! # Decision Order
//!
//! First match wins:
//!
//! 1. Public route → `Allow`
//! 2. Not signed in → `RedirectTo(login)` (unless already on login)
//! 3. Profile route with absent or incomplete profile →
//!    `RedirectTo(setup)` (unless already on setup)
//! 4. `Allow`
//!
//! # No Redirect Loops
//!
//! [`AccessGate::new`] refuses to build a gate whose login page is not
//! public or whose setup page requires a complete profile. With those
//! two checks every redirect target is reachable by the viewer state
//! that triggered the redirect.

use crate::route::normalize_path;
use crate::{
    AccessDecision, AccessPolicy, GateError, Identity, RouteClass, RouteTable, Viewer, ViewerState,
};
use dyouth_types::ProfileRecord;
use serde::{Deserialize, Serialize};

/// Paths the gate redirects to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatePaths {
    /// Sign-in page. Must be public.
    pub login: String,
    /// Profile setup page. Must not require a complete profile.
    pub setup: String,
    /// Landing page for signed-in users with a complete profile.
    pub home: String,
}

impl Default for GatePaths {
    fn default() -> Self {
        Self {
            login: "/login".into(),
            setup: "/setup-profile".into(),
            home: "/".into(),
        }
    }
}

/// Route-table based [`AccessPolicy`].
///
/// # Example
///
/// ```
/// use dyouth_auth::{AccessDecision, AccessGate, AccessPolicy, GatePaths, Identity, RouteTable};
/// use dyouth_types::{ProfileRecord, UserId};
///
/// let table = RouteTable::builder()
///     .public("/")
///     .public("/login")
///     .auth_required("/setup-profile")
///     .profile_required("/profile")
///     .profile_required("/wall")
///     .build()
///     .unwrap();
/// let gate = AccessGate::new(table, GatePaths::default()).unwrap();
///
/// // Anonymous visitor is sent to login.
/// let decision = gate.decide("/wall", &Identity::anonymous(), None);
/// assert_eq!(decision, AccessDecision::RedirectTo("/login".into()));
///
/// // Signed in without a profile: setup is reachable, profile is not.
/// let id = UserId::new("u-1").unwrap();
/// let me = Identity::authenticated(id.clone());
/// assert_eq!(gate.decide("/setup-profile", &me, None), AccessDecision::Allow);
/// assert_eq!(
///     gate.decide("/profile", &me, None),
///     AccessDecision::RedirectTo("/setup-profile".into())
/// );
///
/// // After setup the same route opens.
/// let profile = ProfileRecord::empty(id).with_display_name("Jane");
/// assert_eq!(gate.decide("/wall", &me, Some(&profile)), AccessDecision::Allow);
/// ```
#[derive(Debug, Clone)]
pub struct AccessGate {
    table: RouteTable,
    paths: GatePaths,
}

impl AccessGate {
    /// Builds a gate, checking that no redirect can loop.
    ///
    /// # Errors
    ///
    /// - [`GateError::InvalidPattern`] if a configured path is not absolute
    /// - [`GateError::LoginNotPublic`] if the login page is not public
    /// - [`GateError::SetupRequiresProfile`] if the setup page is profile-gated
    pub fn new(table: RouteTable, paths: GatePaths) -> Result<Self, GateError> {
        let paths = GatePaths {
            login: absolute(&paths.login)?,
            setup: absolute(&paths.setup)?,
            home: absolute(&paths.home)?,
        };

        let login_class = table.classify(&paths.login);
        if login_class != RouteClass::Public {
            return Err(GateError::LoginNotPublic {
                path: paths.login,
                class: login_class,
            });
        }

        if table.classify(&paths.setup) == RouteClass::ProfileRequired {
            return Err(GateError::SetupRequiresProfile { path: paths.setup });
        }

        Ok(Self { table, paths })
    }

    /// Gate over [`RouteTable::site_default`] and [`GatePaths::default`].
    #[must_use]
    pub fn site_default() -> Self {
        Self {
            table: RouteTable::site_default(),
            paths: GatePaths::default(),
        }
    }

    /// Returns the route table.
    #[must_use]
    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Returns the redirect targets.
    #[must_use]
    pub fn paths(&self) -> &GatePaths {
        &self.paths
    }

    /// Where to send a viewer right after the OAuth callback.
    ///
    /// | Viewer | Landing |
    /// |--------|---------|
    /// | complete profile | home |
    /// | absent/incomplete profile | setup |
    /// | anonymous | login |
    /// | unknown | home (fail open) |
    #[must_use]
    pub fn landing_after_sign_in(&self, viewer: &Viewer) -> &str {
        match viewer.state() {
            Some(ViewerState::AuthComplete) | None => &self.paths.home,
            Some(ViewerState::AuthIncomplete) => &self.paths.setup,
            Some(ViewerState::Anonymous) => &self.paths.login,
        }
    }
}

impl AccessPolicy for AccessGate {
    fn classify(&self, path: &str) -> RouteClass {
        self.table.classify(path)
    }

    fn decide(
        &self,
        path: &str,
        identity: &Identity,
        profile: Option<&ProfileRecord>,
    ) -> AccessDecision {
        let path = normalize_path(path);
        let class = self.table.classify(&path);

        let decision = if class == RouteClass::Public {
            AccessDecision::Allow
        } else if !identity.is_authenticated {
            if path == self.paths.login {
                AccessDecision::Allow
            } else {
                AccessDecision::RedirectTo(self.paths.login.clone())
            }
        } else if class == RouteClass::ProfileRequired
            && !profile.is_some_and(ProfileRecord::is_complete)
            && path != self.paths.setup
        {
            AccessDecision::RedirectTo(self.paths.setup.clone())
        } else {
            AccessDecision::Allow
        };

        match &decision {
            AccessDecision::Allow => tracing::debug!(
                path = %path,
                class = %class,
                authenticated = identity.is_authenticated,
                "access allowed"
            ),
            AccessDecision::RedirectTo(target) => tracing::info!(
                path = %path,
                class = %class,
                authenticated = identity.is_authenticated,
                target = %target,
                "access redirected"
            ),
        }

        decision
    }
}

fn absolute(path: &str) -> Result<String, GateError> {
    if path.starts_with('/') {
        Ok(normalize_path(path))
    } else {
        Err(GateError::invalid_pattern(path, "path must start with '/'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ProfileStatus, Verdict};
    use dyouth_types::UserId;

    fn scenario_gate() -> AccessGate {
        let table = RouteTable::builder()
            .public("/")
            .public("/login")
            .auth_required("/setup-profile")
            .profile_required("/profile")
            .profile_required("/wall")
            .build()
            .unwrap();
        AccessGate::new(table, GatePaths::default()).unwrap()
    }

    fn uid() -> UserId {
        UserId::new("u-1").unwrap()
    }

    fn complete() -> ProfileRecord {
        ProfileRecord::empty(uid()).with_display_name("Jane")
    }

    fn incomplete() -> ProfileRecord {
        ProfileRecord::empty(uid())
    }

    const ALL_PATHS: &[&str] = &["/", "/login", "/setup-profile", "/profile", "/wall", "/other"];

    #[test]
    fn public_paths_allow_every_identity() {
        let gate = scenario_gate();
        let me = Identity::authenticated(uid());
        for path in ["/", "/login"] {
            assert_eq!(gate.decide(path, &Identity::anonymous(), None), AccessDecision::Allow);
            assert_eq!(gate.decide(path, &me, None), AccessDecision::Allow);
            assert_eq!(gate.decide(path, &me, Some(&incomplete())), AccessDecision::Allow);
            assert_eq!(gate.decide(path, &me, Some(&complete())), AccessDecision::Allow);
        }
    }

    #[test]
    fn anonymous_on_non_public_goes_to_login() {
        let gate = scenario_gate();
        for path in ALL_PATHS {
            if gate.classify(path) == RouteClass::Public {
                continue;
            }
            assert_eq!(
                gate.decide(path, &Identity::anonymous(), None),
                AccessDecision::RedirectTo("/login".into()),
                "path {path}"
            );
        }
    }

    #[test]
    fn incomplete_on_profile_routes_goes_to_setup() {
        let gate = scenario_gate();
        let me = Identity::authenticated(uid());
        for path in ["/profile", "/wall"] {
            assert_eq!(
                gate.decide(path, &me, None),
                AccessDecision::RedirectTo("/setup-profile".into())
            );
            assert_eq!(
                gate.decide(path, &me, Some(&incomplete())),
                AccessDecision::RedirectTo("/setup-profile".into())
            );
        }
    }

    #[test]
    fn incomplete_on_auth_required_is_allowed() {
        let gate = scenario_gate();
        let me = Identity::authenticated(uid());
        assert_eq!(gate.decide("/other", &me, None), AccessDecision::Allow);
        assert_eq!(gate.decide("/setup-profile", &me, None), AccessDecision::Allow);
    }

    #[test]
    fn complete_profile_reaches_everything() {
        let gate = scenario_gate();
        let me = Identity::authenticated(uid());
        for path in ALL_PATHS {
            assert_eq!(gate.decide(path, &me, Some(&complete())), AccessDecision::Allow);
        }
    }

    #[test]
    fn decide_is_idempotent() {
        let gate = scenario_gate();
        let me = Identity::authenticated(uid());
        for path in ALL_PATHS {
            let first = gate.decide(path, &me, Some(&incomplete()));
            let second = gate.decide(path, &me, Some(&incomplete()));
            assert_eq!(first, second);
        }
    }

    #[test]
    fn redirect_targets_are_reachable() {
        let gate = scenario_gate();
        let me = Identity::authenticated(uid());
        assert_eq!(gate.decide("/login", &Identity::anonymous(), None), AccessDecision::Allow);
        assert_eq!(gate.decide("/setup-profile", &me, Some(&incomplete())), AccessDecision::Allow);
    }

    #[test]
    fn login_outside_table_is_rejected() {
        let table = RouteTable::builder().public("/").build().unwrap();
        let err = AccessGate::new(table, GatePaths::default()).unwrap_err();
        assert!(matches!(err, GateError::LoginNotPublic { .. }));
    }

    #[test]
    fn profile_gated_setup_is_rejected() {
        let table = RouteTable::builder()
            .public("/login")
            .profile_required("/setup-profile")
            .build()
            .unwrap();
        let err = AccessGate::new(table, GatePaths::default()).unwrap_err();
        assert!(matches!(err, GateError::SetupRequiresProfile { .. }));
    }

    #[test]
    fn public_setup_is_accepted() {
        let table = RouteTable::builder()
            .public("/login")
            .public("/setup-profile")
            .build()
            .unwrap();
        assert!(AccessGate::new(table, GatePaths::default()).is_ok());
    }

    #[test]
    fn relative_login_path_is_rejected() {
        let paths = GatePaths {
            login: "login".into(),
            ..GatePaths::default()
        };
        let err = AccessGate::new(RouteTable::site_default(), paths).unwrap_err();
        assert!(matches!(err, GateError::InvalidPattern { .. }));
    }

    #[test]
    fn site_default_is_valid() {
        let built = AccessGate::new(RouteTable::site_default(), GatePaths::default());
        assert!(built.is_ok());
    }

    #[test]
    fn profile_completed_mid_session_unlocks() {
        let gate = scenario_gate();
        let before = Viewer::authenticated(uid(), ProfileStatus::Absent);
        assert_eq!(
            gate.evaluate("/wall", &before),
            Verdict::Decided(AccessDecision::RedirectTo("/setup-profile".into()))
        );

        let after = Viewer::authenticated(uid(), ProfileStatus::Present(complete()));
        assert_eq!(
            gate.evaluate("/wall", &after),
            Verdict::Decided(AccessDecision::Allow)
        );
    }

    #[test]
    fn landing_after_sign_in() {
        let gate = scenario_gate();
        let done = Viewer::authenticated(uid(), ProfileStatus::Present(complete()));
        let fresh = Viewer::authenticated(uid(), ProfileStatus::Absent);
        assert_eq!(gate.landing_after_sign_in(&done), "/");
        assert_eq!(gate.landing_after_sign_in(&fresh), "/setup-profile");
        assert_eq!(gate.landing_after_sign_in(&Viewer::Anonymous), "/login");
        assert_eq!(gate.landing_after_sign_in(&Viewer::Unknown), "/");
    }

    #[test]
    fn query_string_on_login_does_not_loop() {
        let gate = scenario_gate();
        assert_eq!(
            gate.decide("/login?next=/wall", &Identity::anonymous(), None),
            AccessDecision::Allow
        );
    }
}
