//! PostgreSQL-backed `UnitOfWork`.
//!
//! A transaction pins one pooled connection and hands every repository a
//! handle to it. Repository calls that open their own Diesel transaction run
//! as savepoints inside it. A transaction dropped without commit leaves its
//! connection mid-transaction; the pool treats such a connection as broken
//! and discards it, which rolls the work back.

use std::sync::Arc;

use async_trait::async_trait;
use diesel_async::{AnsiTransactionManager, SimpleAsyncConnection as _, TransactionManager};
use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::ports::{
    Repositories, Transaction, TransactionError, TransactionMode, UnitOfWork,
};

use super::diesel_error_mapping::map_pool_error;
use super::pool::{ConnectionSource, DbPool, PoolError, SharedConnection};
use super::{
    DieselBookingRepository, DieselCommentRepository, DieselItemRepository,
    DieselItemRequestRepository, DieselUserRepository,
};

/// Opens transactions on connections drawn from the shared pool.
#[derive(Clone)]
pub struct DieselUnitOfWork {
    pool: DbPool,
}

impl DieselUnitOfWork {
    /// Create a unit of work over the shared pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UnitOfWork for DieselUnitOfWork {
    async fn begin(
        &self,
        mode: TransactionMode,
    ) -> Result<Box<dyn Transaction>, TransactionError> {
        let mut conn = self.pool.get_owned().await.map_err(checkout_error)?;
        AnsiTransactionManager::begin_transaction(&mut *conn)
            .await
            .map_err(query_error)?;
        if mode == TransactionMode::ReadOnly {
            conn.batch_execute("SET TRANSACTION READ ONLY")
                .await
                .map_err(query_error)?;
        }
        debug!(?mode, "transaction opened");

        let conn: SharedConnection = Arc::new(Mutex::new(conn));
        Ok(Box::new(DieselTransaction {
            repositories: bound_repositories(&conn),
            conn,
        }))
    }
}

/// Repositories whose every call runs on `conn`.
fn bound_repositories(conn: &SharedConnection) -> Repositories {
    let source = || ConnectionSource::Transaction(Arc::clone(conn));
    Repositories {
        users: Arc::new(DieselUserRepository::over(source())),
        items: Arc::new(DieselItemRepository::over(source())),
        bookings: Arc::new(DieselBookingRepository::over(source())),
        comments: Arc::new(DieselCommentRepository::over(source())),
        requests: Arc::new(DieselItemRequestRepository::over(source())),
    }
}

struct DieselTransaction {
    conn: SharedConnection,
    repositories: Repositories,
}

#[async_trait]
impl Transaction for DieselTransaction {
    fn repositories(&self) -> &Repositories {
        &self.repositories
    }

    async fn commit(&self) -> Result<(), TransactionError> {
        let mut conn = self.conn.lock().await;
        AnsiTransactionManager::commit_transaction(&mut **conn)
            .await
            .map_err(query_error)
    }

    async fn rollback(&self) -> Result<(), TransactionError> {
        let mut conn = self.conn.lock().await;
        AnsiTransactionManager::rollback_transaction(&mut **conn)
            .await
            .map_err(query_error)
    }
}

fn checkout_error(error: PoolError) -> TransactionError {
    map_pool_error(error, TransactionError::connection)
}

fn query_error(error: diesel::result::Error) -> TransactionError {
    TransactionError::query(error.to_string())
}
