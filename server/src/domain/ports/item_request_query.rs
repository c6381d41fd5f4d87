//! Driving port for item request reads.

use async_trait::async_trait;
use pagination::PageRequest;

use crate::domain::{Error, ItemRequestDetails, RequestId, UserId};

/// Driving port for request listings joined with their fulfilling items.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItemRequestQuery: Send + Sync {
    /// Requests posted by `caller`, newest first.
    async fn list_own_requests(&self, caller: UserId) -> Result<Vec<ItemRequestDetails>, Error>;

    /// Requests posted by everyone else, newest first, windowed.
    async fn list_other_requests(
        &self,
        caller: UserId,
        page: PageRequest,
    ) -> Result<Vec<ItemRequestDetails>, Error>;

    /// One request; `caller` must exist.
    async fn get_request(
        &self,
        caller: UserId,
        id: RequestId,
    ) -> Result<ItemRequestDetails, Error>;
}
