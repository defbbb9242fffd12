//! Profile record types.
//!
//! A [`ProfileRecord`] is the user-editable data attached to an identity.
//! There is at most one record per [`UserId`]; it is created by the profile
//! upsert path and never deleted by the gate.

use crate::UserId;
use serde::{Deserialize, Serialize};

/// Profile data keyed by [`UserId`].
///
/// All text fields default to empty. A record is *complete* when its
/// display name is non-empty; that single field is what unlocks
/// profile-gated pages.
///
/// # Example
///
/// ```
/// use dyouth_types::{ProfileRecord, UserId};
///
/// let id = UserId::new("u-1").unwrap();
///
/// let empty = ProfileRecord::empty(id.clone());
/// assert!(!empty.is_complete());
///
/// let named = ProfileRecord::empty(id).with_display_name("Jane");
/// assert!(named.is_complete());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    /// Owner of the record.
    pub user_id: UserId,
    /// Name shown on walls and messages. Empty until setup completes.
    #[serde(default)]
    pub display_name: String,
    /// Home province.
    #[serde(default)]
    pub province: String,
    /// Alumni cohort year, kept as free text.
    #[serde(default)]
    pub cohort_year: String,
    /// Public URL of the uploaded avatar.
    #[serde(default)]
    pub avatar_url: String,
    /// Instagram handle.
    #[serde(default)]
    pub instagram: String,
}

impl ProfileRecord {
    /// Creates a record with every field empty.
    #[must_use]
    pub fn empty(user_id: UserId) -> Self {
        Self {
            user_id,
            display_name: String::new(),
            province: String::new(),
            cohort_year: String::new(),
            avatar_url: String::new(),
            instagram: String::new(),
        }
    }

    /// Returns a copy with the display name replaced.
    #[must_use]
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    /// Returns `true` if the display name is non-empty after trimming.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.display_name.trim().is_empty()
    }

    /// Returns `true` if cohort year and province are both filled in.
    ///
    /// Not used for gating. Some setup screens require these fields as
    /// well; the profile form can opt into that stricter check.
    #[must_use]
    pub fn has_cohort_and_province(&self) -> bool {
        !self.cohort_year.trim().is_empty() && !self.province.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uid() -> UserId {
        UserId::new("u-1").unwrap()
    }

    #[test]
    fn whitespace_name_is_incomplete() {
        let record = ProfileRecord::empty(uid()).with_display_name("   ");
        assert!(!record.is_complete());
    }

    #[test]
    fn cohort_and_province_do_not_affect_completeness() {
        let mut record = ProfileRecord::empty(uid());
        record.cohort_year = "2019".into();
        record.province = "Chiang Mai".into();
        assert!(record.has_cohort_and_province());
        assert!(!record.is_complete());
    }

    #[test]
    fn missing_optional_fields_deserialize_empty() {
        let record: ProfileRecord =
            serde_json::from_str(r#"{"user_id":"u-1","display_name":"Jane"}"#).unwrap();
        assert!(record.is_complete());
        assert!(record.avatar_url.is_empty());
        assert!(record.instagram.is_empty());
    }
}
