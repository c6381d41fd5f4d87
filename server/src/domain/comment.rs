//! Comments left by past renters.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{CommentId, ItemId, UserId};

/// A comment on an item, joined with its author's display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Store-assigned identity.
    pub id: CommentId,
    /// Commented item.
    pub item_id: ItemId,
    /// Authoring user.
    pub author_id: UserId,
    /// Author display name at read time.
    pub author_name: String,
    /// Comment body.
    pub text: String,
    /// Server-side creation instant.
    pub created: NaiveDateTime,
}

/// Fields required to post a comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    /// Commented item.
    pub item_id: ItemId,
    /// Authoring user.
    pub author_id: UserId,
    /// Comment body.
    pub text: String,
    /// Server-side creation instant.
    pub created: NaiveDateTime,
}
