//! Configuration resolver trait for layered overrides.
//!
//! ```text
//! ConfigLoader.load()  →  DyouthConfig (base)
//!                              │
//!                              ▼
//!                     ConfigResolver.apply()     (CLI flags)
//!                              │
//!                              ▼
//!                     DyouthConfig (final)
//! ```

use super::DyouthConfig;

/// Applies overrides on top of a loaded configuration.
///
/// Only values the caller actually specified should be applied.
pub trait ConfigResolver {
    /// Applies overrides to the given configuration.
    fn apply(&self, config: &mut DyouthConfig);
}

/// Resolver that makes no changes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpResolver;

impl ConfigResolver for NoOpResolver {
    fn apply(&self, _config: &mut DyouthConfig) {}
}
