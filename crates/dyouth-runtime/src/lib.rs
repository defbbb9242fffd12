//! D-Youth Runtime - session, navigation and profile layer.
//!
//! Everything here does I/O or holds per-client state; the decisions
//! themselves live in `dyouth-auth`.
//!
//! # Crate Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  dyouth-types : UserId, ProfileRecord, ErrorCode            │
//! │  dyouth-auth  : RouteTable, AccessGate, Viewer, Verdict     │
//! └─────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Runtime Layer (THIS CRATE)                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  config/     : DyouthConfig, ConfigLoader, ConfigResolver   │
//! │  session/    : SessionResolver, SessionContext, traits      │
//! │  navigation  : Navigator, ViewState, Banner                 │
//! │  profile/    : ProfileForm, ProfileUpsert, ObjectStore      │
//! │  rows        : data-store row shapes                        │
//! │  backend/    : RestBackend, MemoryBackend                   │
//! └─────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Frontend Layer (dyouth-cli)                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Navigation Flow
//!
//! ```text
//! Navigator.navigate(path)
//!   ├── SessionContext.current()      cached or fresh Resolution
//!   │     └── SessionResolver.resolve  IdentityProvider → ProfileStore
//!   ├── AccessPolicy.evaluate          Verdict
//!   └── NavigationOutcome              Render | Redirect | Stand | Superseded
//! ```

pub mod backend;
pub mod config;
pub mod navigation;
pub mod profile;
pub mod rows;
pub mod session;

pub use config::{ConfigError, ConfigLoader, ConfigResolver, DyouthConfig};
pub use navigation::{Banner, NavigationOutcome, NavigationTicket, Navigator, ViewState};
pub use profile::{AvatarUpload, ObjectStore, ProfileForm, ProfileUpsert, UpsertError};
pub use session::{
    IdentityProvider, ProfileStore, Resolution, ResolveError, SessionContext, SessionResolver,
    SessionToken,
};
