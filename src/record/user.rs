use serde::{Deserialize, Serialize};

use super::de;
use super::resort::RecordId;

/// A dashboard user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", default)]
    pub id: RecordId,
    #[serde(default, deserialize_with = "de::text")]
    pub username: String,
    #[serde(default, deserialize_with = "de::text")]
    pub email: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl User {
    /// Creation date as `YYYY-MM-DD`, or `Unknown`.
    pub fn created_label(&self) -> &str {
        match self.created_at.as_deref() {
            Some(ts) if ts.len() >= 10 && ts.is_char_boundary(10) => &ts[..10],
            Some(ts) if !ts.is_empty() => ts,
            _ => "Unknown",
        }
    }
}

/// Body of a user update request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserUpdate {
    pub username: String,
    pub email: String,
}

impl From<&User> for UserUpdate {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}
