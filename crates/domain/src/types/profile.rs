//! Profile extension record keyed by identity id
//!
//! Rows live in the backend's `profiles` table and are created by a database
//! trigger after registration, so a profile may not exist yet when an
//! identity first appears.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Locally-fetched profile row for an identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Nullable column; absent or null means "not an admin".
    #[serde(default)]
    pub is_admin: Option<bool>,
}

impl Profile {
    #[must_use]
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            avatar_url: None,
            updated_at: None,
            is_admin: None,
        }
    }

    #[must_use]
    pub fn with_admin(mut self, is_admin: bool) -> Self {
        self.is_admin = Some(is_admin);
        self
    }

    /// Admin flag with the nullable column collapsed to `false`.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.is_admin.unwrap_or(false)
    }
}

/// Partial update for the signed-in identity's own profile row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl ProfileChanges {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.username.is_none() && self.avatar_url.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_admin_column_defaults_to_false() {
        let profile: Profile =
            serde_json::from_str(r#"{ "id": "u1", "username": "ada" }"#).unwrap();
        assert_eq!(profile.is_admin, None);
        assert!(!profile.is_admin());
    }

    #[test]
    fn null_admin_column_is_not_admin() {
        let profile: Profile =
            serde_json::from_str(r#"{ "id": "u1", "username": "ada", "is_admin": null }"#)
                .unwrap();
        assert!(!profile.is_admin());
    }

    #[test]
    fn parses_full_row() {
        let profile: Profile = serde_json::from_str(
            r#"{
                "id": "u1",
                "username": "ada",
                "avatar_url": "https://cdn.example.com/a.png",
                "updated_at": "2025-01-15T10:00:00+00:00",
                "is_admin": true
            }"#,
        )
        .unwrap();
        assert!(profile.is_admin());
        assert_eq!(profile.avatar_url.as_deref(), Some("https://cdn.example.com/a.png"));
        assert!(profile.updated_at.is_some());
    }

    #[test]
    fn changes_serialize_only_present_fields() {
        let changes = ProfileChanges { username: Some("grace".into()), avatar_url: None };
        let json = serde_json::to_value(&changes).unwrap();
        assert_eq!(json, serde_json::json!({ "username": "grace" }));
        assert!(ProfileChanges::default().is_empty());
    }
}
