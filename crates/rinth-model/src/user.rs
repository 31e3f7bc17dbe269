use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::literal::UserRole;
use crate::wire::{OpaqueMap, Wire};

/// A user, as returned by `/user/{id|username}`.
///
/// `email` and `payout_data` are only filled in when the request was made
/// with the user's own token.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
#[must_use]
pub struct UserModel {
    pub id: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(
        default,
        deserialize_with = "crate::wire::empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub avatar_url: Option<Url>,
    pub created: DateTime<Utc>,
    pub role: UserRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badges: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payout_data: Option<OpaqueMap>,
}

impl Wire for UserModel {
    const ENTITY: &'static str = "user";
}

/// A notification sent to a user.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
#[must_use]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub title: String,
    pub text: String,
    pub link: String,
    pub read: bool,
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub actions: Vec<serde_json::Value>,
}

impl Wire for Notification {
    const ENTITY: &'static str = "notification";
}

impl Notification {
    /// The project a notification is about, which the API wraps in `**` inside
    /// of the title.
    #[must_use]
    pub fn project_title(&self) -> Option<&str> {
        self.title.split("**").nth(1)
    }
}
