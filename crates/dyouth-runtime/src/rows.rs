//! Data-store row shapes.
//!
//! The data store speaks in its own column names and is loose about
//! types: ids arrive as numbers or strings, columns may be null, and an
//! embedded relation may be an object or an array. This module is the
//! single place where those rows become domain types.
//!
//! | Column | Field |
//! |--------|-------|
//! | `id` | `user_id` |
//! | `user_name` | `display_name` |
//! | `year` | `cohort_year` |
//! | `province` | `province` |
//! | `profile_img` | `avatar_url` |
//! | `ig` | `instagram` |

use chrono::{DateTime, Utc};
use dyouth_types::{EmptyUserId, ProfileRecord, UserId};
use serde::{Deserialize, Serialize};

/// A column that may hold text or a number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextOrNumber {
    Text(String),
    Number(i64),
}

impl TextOrNumber {
    fn into_text(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Number(n) => n.to_string(),
        }
    }
}

/// A `profiles` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRow {
    pub id: TextOrNumber,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub year: Option<TextOrNumber>,
    #[serde(default)]
    pub province: Option<String>,
    #[serde(default)]
    pub profile_img: Option<String>,
    #[serde(default)]
    pub ig: Option<String>,
}

impl TryFrom<ProfileRow> for ProfileRecord {
    type Error = EmptyUserId;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: UserId::new(row.id.into_text())?,
            display_name: row.user_name.unwrap_or_default(),
            province: row.province.unwrap_or_default(),
            cohort_year: row.year.map(TextOrNumber::into_text).unwrap_or_default(),
            avatar_url: row.profile_img.unwrap_or_default(),
            instagram: row.ig.unwrap_or_default(),
        })
    }
}

impl From<&ProfileRecord> for ProfileRow {
    fn from(record: &ProfileRecord) -> Self {
        let opt = |s: &str| (!s.is_empty()).then(|| s.to_string());
        Self {
            id: TextOrNumber::Text(record.user_id.as_str().to_string()),
            user_name: opt(&record.display_name),
            year: opt(&record.cohort_year).map(TextOrNumber::Text),
            province: opt(&record.province),
            profile_img: opt(&record.avatar_url),
            ig: opt(&record.instagram),
        }
    }
}

/// An embedded relation that arrives as one object or a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    /// Returns the single object or the first list element.
    pub fn into_first(self) -> Option<T> {
        match self {
            Self::One(item) => Some(item),
            Self::Many(items) => items.into_iter().next(),
        }
    }
}

/// A `walls` row with the sender's profile embedded as `profiles`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WallPostRow {
    pub id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub is_anonymous: Option<bool>,
    #[serde(default)]
    pub profiles: Option<OneOrMany<ProfileRow>>,
}

/// A wall post ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WallPost {
    pub id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub color: Option<String>,
    pub is_anonymous: bool,
    /// `None` for anonymous posts and posts whose sender is missing.
    pub author: Option<ProfileRecord>,
}

impl From<WallPostRow> for WallPost {
    fn from(row: WallPostRow) -> Self {
        let is_anonymous = row.is_anonymous.unwrap_or(false);
        let author = if is_anonymous {
            None
        } else {
            row.profiles
                .and_then(OneOrMany::into_first)
                .and_then(|p| ProfileRecord::try_from(p).ok())
        };

        Self {
            id: row.id,
            content: row.content,
            created_at: row.created_at,
            color: row.color,
            is_anonymous,
            author,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn profile_row_with_nulls() {
        let row: ProfileRow = serde_json::from_value(json!({
            "id": 42,
            "user_name": "Jane",
            "year": 2567,
            "province": null,
        }))
        .unwrap();

        let record = ProfileRecord::try_from(row).unwrap();
        assert_eq!(record.user_id.as_str(), "42");
        assert_eq!(record.cohort_year, "2567");
        assert_eq!(record.province, "");
        assert!(record.is_complete());
    }

    #[test]
    fn profile_row_without_id_is_rejected() {
        let row: ProfileRow = serde_json::from_value(json!({ "id": "" })).unwrap();
        assert!(ProfileRecord::try_from(row).is_err());
    }

    #[test]
    fn record_to_row_omits_empty_columns() {
        let record = ProfileRecord::empty(UserId::new("u-1").unwrap()).with_display_name("Jane");
        let value = serde_json::to_value(ProfileRow::from(&record)).unwrap();
        assert_eq!(value["id"], "u-1");
        assert_eq!(value["user_name"], "Jane");
        assert!(value["province"].is_null());
    }

    #[test]
    fn embedded_profile_object_or_array() {
        let object: WallPostRow = serde_json::from_value(json!({
            "id": 1,
            "content": "hi",
            "created_at": "2025-01-01T00:00:00Z",
            "profiles": { "id": "u-1", "user_name": "Jane" }
        }))
        .unwrap();
        let array: WallPostRow = serde_json::from_value(json!({
            "id": 2,
            "content": "hi",
            "created_at": "2025-01-01T00:00:00Z",
            "profiles": [{ "id": "u-1", "user_name": "Jane" }]
        }))
        .unwrap();
        let empty: WallPostRow = serde_json::from_value(json!({
            "id": 3,
            "content": "hi",
            "created_at": "2025-01-01T00:00:00Z",
            "profiles": []
        }))
        .unwrap();

        let name = |row: WallPostRow| WallPost::from(row).author.map(|a| a.display_name);
        assert_eq!(name(object), Some("Jane".into()));
        assert_eq!(name(array), Some("Jane".into()));
        assert_eq!(name(empty), None);
    }

    #[test]
    fn anonymous_post_hides_author() {
        let row: WallPostRow = serde_json::from_value(json!({
            "id": 1,
            "content": "secret",
            "created_at": "2025-01-01T00:00:00Z",
            "is_anonymous": true,
            "profiles": { "id": "u-1", "user_name": "Jane" }
        }))
        .unwrap();

        let post = WallPost::from(row);
        assert!(post.is_anonymous);
        assert!(post.author.is_none());
    }
}
