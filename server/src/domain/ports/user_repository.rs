//! Port abstraction for user persistence adapters and their errors.

use async_trait::async_trait;

use crate::domain::{NewUser, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// The e-mail uniqueness constraint rejected the write.
        EmailConflict { email: String } => "email already registered: {email}",
    }
}

/// Port for storing and reading users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user and return it with its assigned id.
    async fn insert(&self, user: &NewUser) -> Result<User, UserPersistenceError>;

    /// Overwrite name and e-mail of an existing user.
    async fn update(&self, user: &User) -> Result<User, UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError>;

    /// List every user ordered by id.
    async fn list_all(&self) -> Result<Vec<User>, UserPersistenceError>;

    /// Delete a user together with their items, the bookings on those items,
    /// their own bookings, comments and requests. Returns `false` when absent.
    async fn delete(&self, id: UserId) -> Result<bool, UserPersistenceError>;
}
