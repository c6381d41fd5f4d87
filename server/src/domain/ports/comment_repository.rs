//! Port abstraction for comment persistence adapters.

use async_trait::async_trait;

use crate::domain::{Comment, ItemId, NewComment};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by comment repository adapters.
    pub enum CommentPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "comment repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "comment repository query failed: {message}",
    }
}

/// Port for storing comments and reading them per item.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Insert a comment and return it joined with the author's name.
    async fn insert(&self, comment: &NewComment) -> Result<Comment, CommentPersistenceError>;

    /// Comments on `item`, oldest first.
    async fn list_by_item(&self, item: ItemId) -> Result<Vec<Comment>, CommentPersistenceError>;
}
