//! Driving port for item reads.

use async_trait::async_trait;
use pagination::PageRequest;

use crate::domain::{Error, Item, ItemDetails, ItemId, UserId};

/// Driving port for item lookups, owner listings and text search.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItemQuery: Send + Sync {
    /// Extended view of one item. Booking enrichment is attached only when
    /// `caller` owns it; comments are always attached.
    async fn get_item(&self, caller: UserId, id: ItemId) -> Result<ItemDetails, Error>;

    /// Items owned by `caller`, id ascending, enriched.
    async fn list_user_items(
        &self,
        caller: UserId,
        page: PageRequest,
    ) -> Result<Vec<ItemDetails>, Error>;

    /// Available items matching `text` in name or description, ignoring case.
    async fn search_items(&self, text: String, page: PageRequest) -> Result<Vec<Item>, Error>;
}
