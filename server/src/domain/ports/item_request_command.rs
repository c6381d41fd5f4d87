//! Driving port for posting item requests.

use async_trait::async_trait;

use crate::domain::{Error, ItemRequest, UserId};

/// Driving port for posting item requests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItemRequestCommand: Send + Sync {
    /// Store `description` verbatim for an existing `requestor`, stamped now.
    async fn create_request(
        &self,
        requestor: UserId,
        description: String,
    ) -> Result<ItemRequest, Error>;
}
