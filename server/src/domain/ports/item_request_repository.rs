//! Port abstraction for item request persistence adapters.

use async_trait::async_trait;
use pagination::Window;

use crate::domain::{ItemRequest, NewItemRequest, RequestId, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by item request repository adapters.
    pub enum ItemRequestPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "request repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "request repository query failed: {message}",
    }
}

/// Port for storing and listing item requests.
///
/// Listings are ordered by creation instant, newest first.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItemRequestRepository: Send + Sync {
    /// Insert a request and return it with its assigned id.
    async fn insert(
        &self,
        request: &NewItemRequest,
    ) -> Result<ItemRequest, ItemRequestPersistenceError>;

    /// Fetch a request by identifier.
    async fn find_by_id(
        &self,
        id: RequestId,
    ) -> Result<Option<ItemRequest>, ItemRequestPersistenceError>;

    /// Requests authored by `requestor`.
    async fn list_by_requestor(
        &self,
        requestor: UserId,
    ) -> Result<Vec<ItemRequest>, ItemRequestPersistenceError>;

    /// Requests authored by anyone except `requestor`, windowed.
    async fn list_by_others(
        &self,
        requestor: UserId,
        window: Window,
    ) -> Result<Vec<ItemRequest>, ItemRequestPersistenceError>;
}
