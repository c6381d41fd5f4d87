//! Driving port for user mutations.

use async_trait::async_trait;

use crate::domain::{Error, NewUser, User, UserId, UserPatch};

/// Driving port for registering, editing and removing users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserCommand: Send + Sync {
    /// Register a user; fails with a conflict when the e-mail is taken.
    async fn create_user(&self, user: NewUser) -> Result<User, Error>;

    /// Apply a partial update to an existing user.
    async fn update_user(&self, id: UserId, patch: UserPatch) -> Result<User, Error>;

    /// Delete a user and everything they own.
    async fn delete_user(&self, id: UserId) -> Result<(), Error>;
}
