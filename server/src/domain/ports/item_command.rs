//! Driving port for item mutations and comment posting.

use async_trait::async_trait;

use crate::domain::{Comment, Error, Item, ItemId, ItemPatch, NewItem, UserId};

/// Partial update issued by `caller` against `item_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateItemRequest {
    /// Calling user; must own the item.
    pub caller: UserId,
    /// Target item.
    pub item_id: ItemId,
    /// Fields to replace.
    pub patch: ItemPatch,
}

/// Comment posted by `author_id` on `item_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddCommentRequest {
    /// Posting user; must have rented the item before.
    pub author_id: UserId,
    /// Commented item.
    pub item_id: ItemId,
    /// Comment body.
    pub text: String,
}

/// Driving port for publishing and editing items.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItemCommand: Send + Sync {
    /// Publish an item for an existing owner, optionally fulfilling a request.
    async fn create_item(&self, item: NewItem) -> Result<Item, Error>;

    /// Owner-only partial update; other callers observe not-found.
    async fn update_item(&self, request: UpdateItemRequest) -> Result<Item, Error>;

    /// Post a comment, gated on a finished booking of the item by the author.
    async fn add_comment(&self, request: AddCommentRequest) -> Result<Comment, Error>;
}
