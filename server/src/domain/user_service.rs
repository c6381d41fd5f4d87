//! User domain service.
//!
//! Implements the user driving ports over the [`UserRepository`] of each
//! transaction. E-mail uniqueness is left to the store, which reports
//! violations as [`UserPersistenceError::EmailConflict`].
//!
//! [`UserRepository`]: crate::domain::ports::UserRepository
//! [`UserPersistenceError::EmailConflict`]: crate::domain::ports::UserPersistenceError::EmailConflict

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{Repositories, TransactionMode, UnitOfWork, UserCommand, UsersQuery};
use crate::domain::transaction::{finish, open};
use crate::domain::{Error, NewUser, User, UserId, UserPatch};

/// User service implementing [`UserCommand`] and [`UsersQuery`].
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UnitOfWork>,
}

impl UserService {
    /// Create a service over the shared store.
    pub fn new(store: Arc<dyn UnitOfWork>) -> Self {
        Self { store }
    }
}

pub(crate) fn user_not_found(id: UserId) -> Error {
    Error::not_found(format!("user {id} not found"))
}

async fn load(repos: &Repositories, id: UserId) -> Result<User, Error> {
    repos
        .users
        .find_by_id(id)
        .await?
        .ok_or_else(|| user_not_found(id))
}

async fn update(repos: &Repositories, id: UserId, patch: UserPatch) -> Result<User, Error> {
    let current = load(repos, id).await?;
    Ok(repos.users.update(&current.merged(patch)).await?)
}

async fn delete(repos: &Repositories, id: UserId) -> Result<(), Error> {
    if !repos.users.delete(id).await? {
        return Err(user_not_found(id));
    }
    info!(user_id = %id, "user deleted");
    Ok(())
}

#[async_trait]
impl UserCommand for UserService {
    async fn create_user(&self, user: NewUser) -> Result<User, Error> {
        let tx = open(self.store.as_ref(), TransactionMode::ReadWrite).await?;
        let outcome = tx.repositories().users.insert(&user).await.map_err(Error::from);
        if let Ok(created) = &outcome {
            info!(user_id = %created.id, "user created");
        }
        finish(tx, outcome).await
    }

    async fn update_user(&self, id: UserId, patch: UserPatch) -> Result<User, Error> {
        let tx = open(self.store.as_ref(), TransactionMode::ReadWrite).await?;
        let outcome = update(tx.repositories(), id, patch).await;
        finish(tx, outcome).await
    }

    async fn delete_user(&self, id: UserId) -> Result<(), Error> {
        let tx = open(self.store.as_ref(), TransactionMode::ReadWrite).await?;
        let outcome = delete(tx.repositories(), id).await;
        finish(tx, outcome).await
    }
}

#[async_trait]
impl UsersQuery for UserService {
    async fn get_user(&self, id: UserId) -> Result<User, Error> {
        let tx = open(self.store.as_ref(), TransactionMode::ReadOnly).await?;
        let outcome = load(tx.repositories(), id).await;
        finish(tx, outcome).await
    }

    async fn list_users(&self) -> Result<Vec<User>, Error> {
        let tx = open(self.store.as_ref(), TransactionMode::ReadOnly).await?;
        let outcome = tx.repositories().users.list_all().await.map_err(Error::from);
        finish(tx, outcome).await
    }
}

#[cfg(test)]
#[path = "user_service_tests.rs"]
mod tests;
