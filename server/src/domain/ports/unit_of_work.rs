//! Port opening the store transaction each service call runs in.
//!
//! Every read and write made through [`Transaction::repositories`] observes
//! one consistent snapshot. Writes become visible to other callers only after
//! [`Transaction::commit`]; a transaction dropped without commit is rolled
//! back.

use async_trait::async_trait;

use super::{Repositories, define_port_error};

define_port_error! {
    /// Failures opening or finishing a transaction.
    pub enum TransactionError {
        /// No connection could be obtained for the transaction.
        Connection { message: String } => "transaction connection failed: {message}",
        /// The store refused to begin or finish the transaction.
        Query { message: String } => "transaction failed: {message}",
    }
}

/// Access requested when opening a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionMode {
    /// Writes through the scope are refused.
    ReadOnly,
    /// Reads and writes.
    ReadWrite,
}

/// Source of transactional repository scopes.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Open a transaction in `mode`.
    async fn begin(&self, mode: TransactionMode)
    -> Result<Box<dyn Transaction>, TransactionError>;
}

/// An open transaction and the repositories bound to it.
#[async_trait]
pub trait Transaction: Send + Sync {
    /// Repositories whose calls all run inside this transaction.
    fn repositories(&self) -> &Repositories;

    /// Make the writes durable and visible.
    async fn commit(&self) -> Result<(), TransactionError>;

    /// Discard the writes.
    async fn rollback(&self) -> Result<(), TransactionError>;
}
