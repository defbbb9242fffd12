//! Configuration types.
//!
//! All types implement [`Default`] for compile-time fallback values.

use super::ConfigError;
use dyouth_auth::{AccessGate, GatePaths, RouteRule, RouteTable};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default avatar size limit (5 MiB).
pub const DEFAULT_MAX_AVATAR_BYTES: u64 = 5 * 1024 * 1024;

/// Main configuration structure.
///
/// This is the unified configuration after merging all layers.
///
/// # Example
///
/// ```
/// use dyouth_runtime::config::DyouthConfig;
///
/// let config = DyouthConfig::default();
/// assert!(!config.debug);
/// assert!(!config.backend.is_configured());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DyouthConfig {
    /// Enable debug logging.
    pub debug: bool,

    /// Route table and redirect targets.
    pub gate: GateConfig,

    /// Hosted auth/data/storage service.
    pub backend: BackendConfig,

    /// Session caching.
    pub session: SessionConfig,

    /// Profile form rules.
    pub profile: ProfileConfig,
}

impl DyouthConfig {
    /// Creates a new config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Deserializes from TOML string.
    ///
    /// # Errors
    ///
    /// Returns error if deserialization fails.
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Merges another config into this one.
    ///
    /// Values from `other` override values in `self` only if they
    /// differ from the default.
    pub fn merge(&mut self, other: &Self) {
        if other.debug {
            self.debug = true;
        }

        self.gate.merge(&other.gate);
        self.backend.merge(&other.backend);
        self.session.merge(&other.session);
        self.profile.merge(&other.profile);
    }
}

/// `[gate]` section.
///
/// ```toml
/// [gate]
/// login = "/login"
/// setup = "/setup-profile"
/// home = "/"
///
/// [[gate.routes]]
/// pattern = "/"
/// class = "public"
///
/// [[gate.routes]]
/// pattern = "/family/*"
/// class = "profile_required"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GateConfig {
    /// Sign-in page.
    pub login: String,

    /// Profile setup page.
    pub setup: String,

    /// Landing page after sign in with a complete profile.
    pub home: String,

    /// Route rules in priority order. Empty means the site default table.
    pub routes: Vec<RouteRule>,
}

impl Default for GateConfig {
    fn default() -> Self {
        let paths = GatePaths::default();
        Self {
            login: paths.login,
            setup: paths.setup,
            home: paths.home,
            routes: Vec::new(),
        }
    }
}

impl GateConfig {
    fn merge(&mut self, other: &Self) {
        let default = Self::default();

        if other.login != default.login {
            self.login.clone_from(&other.login);
        }
        if other.setup != default.setup {
            self.setup.clone_from(&other.setup);
        }
        if other.home != default.home {
            self.home.clone_from(&other.home);
        }
        // A layer that lists routes replaces the whole table.
        if !other.routes.is_empty() {
            self.routes.clone_from(&other.routes);
        }
    }

    /// Returns the redirect targets.
    #[must_use]
    pub fn paths(&self) -> GatePaths {
        GatePaths {
            login: self.login.clone(),
            setup: self.setup.clone(),
            home: self.home.clone(),
        }
    }

    /// Returns the configured table, or the site default when none is set.
    #[must_use]
    pub fn table(&self) -> RouteTable {
        if self.routes.is_empty() {
            RouteTable::site_default()
        } else {
            RouteTable::new(self.routes.clone())
        }
    }

    /// Builds the access gate.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Gate`] if the login page is not public or the
    /// setup page requires a complete profile.
    pub fn build_gate(&self) -> Result<AccessGate, ConfigError> {
        Ok(AccessGate::new(self.table(), self.paths())?)
    }
}

/// `[backend]` section.
///
/// Both `url` and `anon_key` are needed for the REST backend. A partial
/// configuration is not an error; sessions then resolve as unknown.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BackendConfig {
    /// Service base URL, e.g. `https://xyz.example.co`.
    pub url: Option<String>,

    /// Public (anon) API key.
    pub anon_key: Option<String>,

    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: None,
            anon_key: None,
            timeout_ms: 10_000,
        }
    }
}

impl BackendConfig {
    fn merge(&mut self, other: &Self) {
        let default = Self::default();

        if other.url.is_some() {
            self.url.clone_from(&other.url);
        }
        if other.anon_key.is_some() {
            self.anon_key.clone_from(&other.anon_key);
        }
        if other.timeout_ms != default.timeout_ms {
            self.timeout_ms = other.timeout_ms;
        }
    }

    /// Returns `true` when both URL and key are set and non-blank.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        let set = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        set(&self.url) && set(&self.anon_key)
    }

    /// Returns the request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// `[session]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    /// How long a resolution may be reused. `0` re-resolves on every navigation.
    pub cache_ttl_ms: u64,
}

impl SessionConfig {
    fn merge(&mut self, other: &Self) {
        if other.cache_ttl_ms != 0 {
            self.cache_ttl_ms = other.cache_ttl_ms;
        }
    }

    /// Returns the cache TTL.
    #[must_use]
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }
}

/// `[profile]` section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProfileConfig {
    /// Avatar size limit in bytes.
    pub max_avatar_bytes: u64,

    /// Also require cohort year and province when saving a profile.
    ///
    /// Only the form is affected; the gate still treats a display name
    /// as complete.
    pub require_cohort_and_province: bool,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            max_avatar_bytes: DEFAULT_MAX_AVATAR_BYTES,
            require_cohort_and_province: false,
        }
    }
}

impl ProfileConfig {
    fn merge(&mut self, other: &Self) {
        let default = Self::default();

        if other.max_avatar_bytes != default.max_avatar_bytes {
            self.max_avatar_bytes = other.max_avatar_bytes;
        }
        if other.require_cohort_and_province != default.require_cohort_and_province {
            self.require_cohort_and_province = other.require_cohort_and_province;
        }
    }
}
