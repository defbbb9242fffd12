//! Session resolution and per-client session state.
//!
//! # Architecture
//!
//! ```text
//! IdentityProvider + ProfileStore   (collaborator traits)
//!            │
//!            ▼
//!      SessionResolver              token → Resolution
//!            │
//!            ▼
//!      SessionContext               token, TTL cache, sign in/out
//!            │
//!            ▼
//!        Navigator                  Resolution → AccessPolicy → outcome
//! ```

mod context;
mod error;
mod provider;
mod resolver;

pub use context::SessionContext;
pub use error::{ProviderError, ResolveError, StoreError};
pub use provider::{IdentityProvider, OAuthProvider, ProfileStore, SessionToken};
pub use resolver::{Resolution, SessionResolver};
