//! Access policy trait.
//!
//! [`AccessPolicy`] is the seam between the pure decision logic in this
//! crate and the runtime that resolves sessions. The runtime only ever
//! talks to `dyn AccessPolicy`; [`AccessGate`](crate::AccessGate) is the
//! standard implementation.
//!
//! ```text
//! AccessPolicy (dyouth-auth)        <- classify + decide, no I/O
//!        │
//!        ├── AccessGate             <- route table + login/setup paths
//!        └── test doubles
//! ```

use crate::{AccessDecision, Identity, ProfileStatus, RouteClass, Verdict, Viewer};
use dyouth_types::ProfileRecord;

/// Decides whether a viewer may see a path.
///
/// Implementations must be pure: the same inputs always produce the
/// same decision.
///
/// # Example
///
/// ```
/// use dyouth_auth::{AccessDecision, AccessPolicy, Identity, RouteClass, Verdict, Viewer};
/// use dyouth_types::ProfileRecord;
///
/// struct OpenDoor;
///
/// impl AccessPolicy for OpenDoor {
///     fn classify(&self, _path: &str) -> RouteClass {
///         RouteClass::Public
///     }
///
///     fn decide(
///         &self,
///         _path: &str,
///         _identity: &Identity,
///         _profile: Option<&ProfileRecord>,
///     ) -> AccessDecision {
///         AccessDecision::Allow
///     }
/// }
///
/// let verdict = OpenDoor.evaluate("/anything", &Viewer::Unknown);
/// assert_eq!(verdict, Verdict::Decided(AccessDecision::Allow));
/// ```
pub trait AccessPolicy: Send + Sync {
    /// Classifies a path.
    fn classify(&self, path: &str) -> RouteClass;

    /// Decides with a fully known identity and profile.
    fn decide(
        &self,
        path: &str,
        identity: &Identity,
        profile: Option<&ProfileRecord>,
    ) -> AccessDecision;

    /// Decides with whatever is known about the viewer.
    ///
    /// # Default Implementation
    ///
    /// | Viewer | Route | Verdict |
    /// |--------|-------|---------|
    /// | any | public | `decide` |
    /// | `Unknown` | not public | `Indeterminate` |
    /// | profile `Unknown` | profile required | `Indeterminate` |
    /// | profile `Unknown` | auth required | `decide` without profile |
    /// | otherwise | any | `decide` |
    fn evaluate(&self, path: &str, viewer: &Viewer) -> Verdict {
        let class = self.classify(path);

        match viewer {
            Viewer::Unknown if class != RouteClass::Public => Verdict::Indeterminate,
            Viewer::Unknown | Viewer::Anonymous => {
                Verdict::Decided(self.decide(path, &Identity::anonymous(), None))
            }
            Viewer::Authenticated { user_id, profile } => {
                if *profile == ProfileStatus::Unknown && class == RouteClass::ProfileRequired {
                    return Verdict::Indeterminate;
                }
                let identity = Identity::authenticated(user_id.clone());
                Verdict::Decided(self.decide(path, &identity, profile.record()))
            }
        }
    }
}
