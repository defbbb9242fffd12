//! Profile setup form and its validation.

use crate::config::ProfileConfig;
use dyouth_types::{ErrorCode, ProfileRecord, UserId};
use thiserror::Error;

/// Avatar image chosen in the form.
#[derive(Clone, PartialEq, Eq)]
pub struct AvatarUpload {
    /// Original file name, used for the extension.
    pub file_name: String,
    /// MIME type reported by the client.
    pub content_type: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

impl AvatarUpload {
    /// Creates an upload.
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Returns the lower-cased file extension.
    ///
    /// Falls back to the MIME subtype (`image/png` → `png`) when the file
    /// name has none.
    #[must_use]
    pub fn extension(&self) -> String {
        let from_name = self
            .file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()));

        if let Some(ext) = from_name {
            return ext.to_ascii_lowercase();
        }

        let subtype = self
            .content_type
            .split_once('/')
            .map_or("", |(_, sub)| sub)
            .split(['+', ';'])
            .next()
            .unwrap_or("")
            .trim();

        if subtype.is_empty() {
            "img".to_string()
        } else {
            subtype.to_ascii_lowercase()
        }
    }

    /// Returns the object key inside the avatar bucket:
    /// `{user_id}-{version}.{ext}`.
    ///
    /// Each upload gets its own key, so the object a stored record points
    /// at is never overwritten before the record itself is replaced.
    #[must_use]
    pub fn object_key(&self, user_id: &UserId, version: i64) -> String {
        format!("{}-{}.{}", user_id, version, self.extension())
    }

    /// Returns the size in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

impl std::fmt::Debug for AvatarUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AvatarUpload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// Input of the profile setup page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileForm {
    pub user_id: UserId,
    pub display_name: String,
    pub cohort_year: String,
    pub province: String,
    pub instagram: String,
    pub avatar: Option<AvatarUpload>,
}

impl ProfileForm {
    /// Creates a form with only the display name filled in.
    pub fn new(user_id: UserId, display_name: impl Into<String>) -> Self {
        Self {
            user_id,
            display_name: display_name.into(),
            cohort_year: String::new(),
            province: String::new(),
            instagram: String::new(),
            avatar: None,
        }
    }

    /// Sets cohort year and province.
    #[must_use]
    pub fn with_cohort(mut self, year: impl Into<String>, province: impl Into<String>) -> Self {
        self.cohort_year = year.into();
        self.province = province.into();
        self
    }

    /// Attaches an avatar.
    #[must_use]
    pub fn with_avatar(mut self, avatar: AvatarUpload) -> Self {
        self.avatar = Some(avatar);
        self
    }

    /// Checks the form before anything is sent to a store.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validate(&self, rules: &ProfileConfig) -> Result<(), ValidationError> {
        if self.display_name.trim().is_empty() {
            return Err(ValidationError::DisplayNameMissing);
        }

        if rules.require_cohort_and_province {
            if self.cohort_year.trim().is_empty() {
                return Err(ValidationError::CohortYearMissing);
            }
            if self.province.trim().is_empty() {
                return Err(ValidationError::ProvinceMissing);
            }
        }

        if let Some(avatar) = &self.avatar {
            if !avatar.content_type.starts_with("image/") {
                return Err(ValidationError::AvatarNotImage {
                    content_type: avatar.content_type.clone(),
                });
            }
            if avatar.size() > rules.max_avatar_bytes {
                return Err(ValidationError::AvatarTooLarge {
                    size: avatar.size(),
                    max: rules.max_avatar_bytes,
                });
            }
        }

        Ok(())
    }

    /// Builds the record to store. Text fields are trimmed.
    #[must_use]
    pub fn to_record(&self, avatar_url: String) -> ProfileRecord {
        ProfileRecord {
            user_id: self.user_id.clone(),
            display_name: self.display_name.trim().to_string(),
            province: self.province.trim().to_string(),
            cohort_year: self.cohort_year.trim().to_string(),
            avatar_url,
            instagram: self.instagram.trim().to_string(),
        }
    }
}

/// Form input rejected before reaching a store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("display name is required")]
    DisplayNameMissing,

    #[error("cohort year is required")]
    CohortYearMissing,

    #[error("province is required")]
    ProvinceMissing,

    #[error("avatar is {size} bytes, limit is {max}")]
    AvatarTooLarge { size: u64, max: u64 },

    #[error("avatar must be an image, got '{content_type}'")]
    AvatarNotImage { content_type: String },
}

impl ErrorCode for ValidationError {
    fn code(&self) -> &'static str {
        match self {
            Self::DisplayNameMissing => "PROFILE_DISPLAY_NAME_MISSING",
            Self::CohortYearMissing => "PROFILE_COHORT_YEAR_MISSING",
            Self::ProvinceMissing => "PROFILE_PROVINCE_MISSING",
            Self::AvatarTooLarge { .. } => "PROFILE_AVATAR_TOO_LARGE",
            Self::AvatarNotImage { .. } => "PROFILE_AVATAR_NOT_IMAGE",
        }
    }

    fn is_recoverable(&self) -> bool {
        true
    }
}
