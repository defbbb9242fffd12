//! Profile upsert: the write path from `AuthIncomplete` to `AuthComplete`.

mod form;
mod upsert;

pub use form::{AvatarUpload, ProfileForm, ValidationError};
pub use upsert::{ObjectStore, ProfileUpsert, UpsertError};
