//! Item requests posted by users looking to borrow something.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{Item, RequestId, UserId};

/// A request describing an item someone wishes to borrow.
///
/// `created` is stamped once by the service and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRequest {
    /// Store-assigned identity.
    pub id: RequestId,
    /// Requesting user.
    pub requestor_id: UserId,
    /// Free-text description, stored verbatim.
    pub description: String,
    /// Creation instant.
    pub created: NaiveDateTime,
}

/// Fields required to post a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItemRequest {
    /// Requesting user.
    pub requestor_id: UserId,
    /// Free-text description.
    pub description: String,
    /// Creation instant.
    pub created: NaiveDateTime,
}

/// A request joined with the items created to fulfil it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRequestDetails {
    /// The request.
    pub request: ItemRequest,
    /// Items citing this request.
    pub items: Vec<Item>,
}

impl ItemRequestDetails {
    /// Attach the fulfilling items from `items` to each request, keeping request order.
    #[must_use]
    pub fn join(requests: Vec<ItemRequest>, items: &[Item]) -> Vec<Self> {
        requests
            .into_iter()
            .map(|request| {
                let fulfilments = items
                    .iter()
                    .filter(|item| item.request_id == Some(request.id))
                    .cloned()
                    .collect();
                Self {
                    request,
                    items: fulfilments,
                }
            })
            .collect()
    }
}
