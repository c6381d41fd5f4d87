//! Items offered for lending and their extended read views.

use serde::{Deserialize, Serialize};

use super::{BookingSummary, Comment, ItemId, RequestId, UserId};

/// An item published by its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Store-assigned identity.
    pub id: ItemId,
    /// Owning user; never changes after creation.
    pub owner_id: UserId,
    /// Short title.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Whether the item may currently be booked.
    pub available: bool,
    /// Item request this item was created to fulfil.
    pub request_id: Option<RequestId>,
}

/// Fields required to publish an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    /// Owning user.
    pub owner_id: UserId,
    /// Short title.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Initial availability.
    pub available: bool,
    /// Request being fulfilled, if any.
    pub request_id: Option<RequestId>,
}

/// Partial item update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemPatch {
    /// Replacement title.
    pub name: Option<String>,
    /// Replacement description.
    pub description: Option<String>,
    /// Replacement availability.
    pub available: Option<bool>,
}

impl Item {
    /// Apply a partial update, returning the merged record.
    #[must_use]
    pub fn merged(self, patch: ItemPatch) -> Self {
        Self {
            name: patch.name.unwrap_or(self.name),
            description: patch.description.unwrap_or(self.description),
            available: patch.available.unwrap_or(self.available),
            ..self
        }
    }

    /// Whether `user` owns this item.
    #[must_use]
    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.owner_id == user
    }
}

/// Item view decorated with booking enrichment and comments.
///
/// `last_booking` and `next_booking` are only populated for the owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDetails {
    /// The item itself.
    pub item: Item,
    /// Most recent approved booking that has started.
    pub last_booking: Option<BookingSummary>,
    /// Soonest approved booking that has not started.
    pub next_booking: Option<BookingSummary>,
    /// Comments ordered by creation.
    pub comments: Vec<Comment>,
}
