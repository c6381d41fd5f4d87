//! Port abstraction for item persistence adapters.

use async_trait::async_trait;
use pagination::Window;

use crate::domain::{Item, ItemId, NewItem, RequestId, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by item repository adapters.
    pub enum ItemPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "item repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "item repository query failed: {message}",
    }
}

/// Port for storing, listing and searching items.
///
/// Every listing is ordered by item id ascending.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// Insert a new item and return it with its assigned id.
    async fn insert(&self, item: &NewItem) -> Result<Item, ItemPersistenceError>;

    /// Overwrite the mutable fields of an existing item.
    async fn update(&self, item: &Item) -> Result<Item, ItemPersistenceError>;

    /// Fetch an item by identifier.
    async fn find_by_id(&self, id: ItemId) -> Result<Option<Item>, ItemPersistenceError>;

    /// Items owned by `owner`, windowed.
    async fn list_by_owner(
        &self,
        owner: UserId,
        window: Window,
    ) -> Result<Vec<Item>, ItemPersistenceError>;

    /// Items citing any of `request_ids`.
    async fn list_by_requests(
        &self,
        request_ids: &[RequestId],
    ) -> Result<Vec<Item>, ItemPersistenceError>;

    /// Available items whose name or description contains `text`, ignoring case.
    async fn search_available(
        &self,
        text: &str,
        window: Window,
    ) -> Result<Vec<Item>, ItemPersistenceError>;
}
