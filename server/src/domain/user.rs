//! User identity records.

use serde::{Deserialize, Serialize};

use super::UserId;

/// A registered ShareIt user.
///
/// E-mail addresses are unique across all users and compared exactly as
/// stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Store-assigned identity.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Unique contact address.
    pub email: String,
}

/// Fields required to register a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Display name.
    pub name: String,
    /// Contact address; must not belong to another user.
    pub email: String,
}

/// Partial user update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    /// Replacement display name.
    pub name: Option<String>,
    /// Replacement contact address.
    pub email: Option<String>,
}

impl User {
    /// Apply a partial update, returning the merged record.
    ///
    /// # Examples
    /// ```
    /// use shareit_server::domain::{User, UserId, UserPatch};
    ///
    /// let user = User { id: UserId::new(1), name: "Ada".into(), email: "ada@example.com".into() };
    /// let merged = user.merged(UserPatch { name: Some("Grace".into()), email: None });
    /// assert_eq!(merged.name, "Grace");
    /// assert_eq!(merged.email, "ada@example.com");
    /// ```
    #[must_use]
    pub fn merged(self, patch: UserPatch) -> Self {
        Self {
            id: self.id,
            name: patch.name.unwrap_or(self.name),
            email: patch.email.unwrap_or(self.email),
        }
    }
}
