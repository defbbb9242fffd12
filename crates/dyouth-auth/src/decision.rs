//! Gate decision types.
//!
//! ```text
//! Verdict
//!  ├── Decided(AccessDecision)
//!  │      ├── Allow
//!  │      └── RedirectTo(path)
//!  └── Indeterminate            infrastructure failure, fail open
//! ```

use serde::{Deserialize, Serialize};

/// Outcome of a gate decision. Derived per navigation, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "path", rename_all = "snake_case")]
pub enum AccessDecision {
    /// Render the requested page.
    Allow,
    /// Navigate to another page instead.
    RedirectTo(String),
}

impl AccessDecision {
    /// Returns `true` for [`Allow`](Self::Allow).
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    /// Returns the redirect target, if any.
    #[must_use]
    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            Self::Allow => None,
            Self::RedirectTo(path) => Some(path),
        }
    }
}

impl std::fmt::Display for AccessDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Allow => f.write_str("allow"),
            Self::RedirectTo(path) => write!(f, "redirect -> {path}"),
        }
    }
}

/// Decision made with possibly incomplete knowledge of the viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// The gate had enough information to decide.
    Decided(AccessDecision),
    /// Identity or profile is unknown and the route depends on it.
    Indeterminate,
}

impl Verdict {
    /// Returns the decision, if any.
    #[must_use]
    pub fn decision(&self) -> Option<&AccessDecision> {
        match self {
            Self::Decided(decision) => Some(decision),
            Self::Indeterminate => None,
        }
    }
}

impl From<AccessDecision> for Verdict {
    fn from(decision: AccessDecision) -> Self {
        Self::Decided(decision)
    }
}
