//! PostgreSQL-backed `UserRepository`.
//!
//! E-mail uniqueness is enforced by `users_email_unique`; violations surface as
//! `UserPersistenceError::EmailConflict`. Deleting a user relies on
//! `ON DELETE CASCADE` foreign keys, so one statement removes the user's items,
//! bookings, comments and requests atomically.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{NewUser, User, UserId};

use super::diesel_error_mapping::{is_unique_violation, map_diesel_error, map_pool_error};
use super::models::{UserFields, UserRow};
use super::pool::{ConnectionSource, DbPool, PoolError};
use super::schema::users;

/// Diesel-backed user repository.
#[derive(Clone)]
pub struct DieselUserRepository {
    source: ConnectionSource,
}

impl DieselUserRepository {
    /// Create a repository over the shared pool.
    pub fn new(pool: DbPool) -> Self {
        Self::over(pool.into())
    }

    pub(crate) fn over(source: ConnectionSource) -> Self {
        Self { source }
    }
}

fn pool_error(error: PoolError) -> UserPersistenceError {
    map_pool_error(error, UserPersistenceError::connection)
}

fn diesel_error(error: &diesel::result::Error) -> UserPersistenceError {
    map_diesel_error(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

/// Writes touching `email` report uniqueness violations as conflicts.
fn write_error(error: &diesel::result::Error, email: &str) -> UserPersistenceError {
    if is_unique_violation(error) {
        UserPersistenceError::email_conflict(email)
    } else {
        diesel_error(error)
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, user: &NewUser) -> Result<User, UserPersistenceError> {
        let mut conn = self.source.get().await.map_err(pool_error)?;
        diesel::insert_into(users::table)
            .values(UserFields {
                name: &user.name,
                email: &user.email,
            })
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map(User::from)
            .map_err(|err| write_error(&err, &user.email))
    }

    async fn update(&self, user: &User) -> Result<User, UserPersistenceError> {
        let mut conn = self.source.get().await.map_err(pool_error)?;
        diesel::update(users::table.find(user.id.get()))
            .set(UserFields {
                name: &user.name,
                email: &user.email,
            })
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map(User::from)
            .map_err(|err| write_error(&err, &user.email))
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.source.get().await.map_err(pool_error)?;
        users::table
            .find(id.get())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map(|row| row.map(User::from))
            .map_err(|err| diesel_error(&err))
    }

    async fn list_all(&self) -> Result<Vec<User>, UserPersistenceError> {
        let mut conn = self.source.get().await.map_err(pool_error)?;
        let rows: Vec<UserRow> = users::table
            .order(users::id.asc())
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| diesel_error(&err))?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn delete(&self, id: UserId) -> Result<bool, UserPersistenceError> {
        let mut conn = self.source.get().await.map_err(pool_error)?;
        let removed = diesel::delete(users::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(|err| diesel_error(&err))?;
        Ok(removed > 0)
    }
}
