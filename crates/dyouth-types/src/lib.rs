//! Core types for D-Youth.
//!
//! This crate holds the plain data shared by every other layer: user
//! identifiers, profile records, and the [`ErrorCode`] convention.
//!
//! # Crate Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  dyouth-types   : UserId, ProfileRecord, ErrorCode  ◄── HERE │
//! │  dyouth-auth    : RouteTable, AccessGate, Viewer            │
//! └─────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │  dyouth-runtime : SessionResolver, Navigator, ProfileUpsert │
//! └─────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │  dyouth-cli     : `dyouth` binary                           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here performs I/O.

pub mod error;
pub mod id;
pub mod profile;

pub use error::{assert_error_code, ErrorCode};
pub use id::{EmptyUserId, UserId};
pub use profile::ProfileRecord;
