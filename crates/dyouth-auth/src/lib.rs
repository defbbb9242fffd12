//! Access control primitives for D-Youth.
//!
//! This crate decides, for every navigation, whether the viewer may see
//! the requested page or must be sent elsewhere. It performs no I/O: the
//! runtime resolves who the viewer is and hands the result to an
//! [`AccessPolicy`].
//!
//! # Model
//!
//! ```text
//! Verdict = AccessPolicy.evaluate(path, Viewer)
//!                          │            │
//!            RouteTable.classify     Anonymous | Authenticated | Unknown
//! ```
//!
//! | Type | Role |
//! |------|------|
//! | [`RouteTable`] | Ordered `(pattern, class)` rules, first match wins |
//! | [`Viewer`] | What is known about the navigating user |
//! | [`AccessGate`] | Standard [`AccessPolicy`] with login/setup redirects |
//! | [`Verdict`] | Decision, or `Indeterminate` when infrastructure failed |
//!
//! # Crate Architecture
//!
//! ```text
//! dyouth-types  (UserId, ProfileRecord)
//!       ↑
//! dyouth-auth  ◄── THIS CRATE
//!       ↑
//! dyouth-runtime (SessionResolver, Navigator)
//! ```

pub mod decision;
pub mod error;
pub mod gate;
pub mod policy;
pub mod route;
pub mod viewer;

pub use decision::{AccessDecision, Verdict};
pub use error::GateError;
pub use gate::{AccessGate, GatePaths};
pub use policy::AccessPolicy;
pub use route::{normalize_path, RouteClass, RoutePattern, RouteRule, RouteTable, RouteTableBuilder};
pub use viewer::{Identity, ProfileStatus, Viewer, ViewerState};
