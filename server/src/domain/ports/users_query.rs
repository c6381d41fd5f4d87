//! Driving port for user reads.

use async_trait::async_trait;

use crate::domain::{Error, User, UserId};

/// Driving port for looking users up.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersQuery: Send + Sync {
    /// Fetch one user or fail with not-found.
    async fn get_user(&self, id: UserId) -> Result<User, Error>;

    /// Every user ordered by id.
    async fn list_users(&self) -> Result<Vec<User>, Error>;
}
