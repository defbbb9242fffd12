//! Configuration management with hierarchical layering.
//!
//! ```text
//! Priority (highest to lowest):
//!
//! ┌───────────────────────────────────────────┐
//! │  1. CLI flags (ConfigResolver)            │
//! ├───────────────────────────────────────────┤
//! │  2. Environment Variables (DYOUTH_*)      │
//! ├───────────────────────────────────────────┤
//! │  3. Project Config (.dyouth/config.toml)  │
//! ├───────────────────────────────────────────┤
//! │  4. Global Config (~/.dyouth/config.toml) │
//! ├───────────────────────────────────────────┤
//! │  5. Default Values (compile-time)         │
//! └───────────────────────────────────────────┘
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Config Field | Type |
//! |----------|--------------|------|
//! | `DYOUTH_DEBUG` | `debug` | bool |
//! | `DYOUTH_BACKEND_URL` | `backend.url` | String |
//! | `DYOUTH_BACKEND_ANON_KEY` | `backend.anon_key` | String |
//! | `DYOUTH_SESSION_CACHE_TTL_MS` | `session.cache_ttl_ms` | u64 |
//! | `DYOUTH_STRICT_PROFILE` | `profile.require_cohort_and_province` | bool |
//!
//! # Example Configuration
//!
//! ```toml
//! debug = false
//!
//! [gate]
//! login = "/login"
//! setup = "/setup-profile"
//! home = "/"
//!
//! [backend]
//! url = "https://project.example.co"
//! anon_key = "public-anon-key"
//! timeout_ms = 10000
//!
//! [session]
//! cache_ttl_ms = 0
//!
//! [profile]
//! max_avatar_bytes = 5242880
//! require_cohort_and_province = false
//! ```

mod error;
mod loader;
mod resolver;
mod types;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use resolver::{ConfigResolver, NoOpResolver};
pub use types::{
    BackendConfig, DyouthConfig, GateConfig, ProfileConfig, SessionConfig,
    DEFAULT_MAX_AVATAR_BYTES,
};

/// Default global config directory.
pub fn default_config_dir() -> std::path::PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join(".dyouth")
}

/// Default global config file path.
pub fn default_config_path() -> std::path::PathBuf {
    default_config_dir().join("config.toml")
}

/// Project config directory name.
pub const PROJECT_CONFIG_DIR: &str = ".dyouth";

/// Project config file name.
pub const PROJECT_CONFIG_FILE: &str = "config.toml";
