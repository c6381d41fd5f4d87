//! Item domain service: publishing, editing, search and comments.
//!
//! Extended item reads are decorated by the booking engine. The last and next
//! approved bookings are attached only for the owner; comments always are.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use mockable::Clock;
use pagination::{PageRequest, PagingMode};
use tracing::{debug, info};

use crate::domain::booking_service::{approved_neighbours, has_finished_rental};
use crate::domain::ports::{
    AddCommentRequest, ItemCommand, ItemQuery, Repositories, TransactionMode, UnitOfWork,
    UpdateItemRequest,
};
use crate::domain::transaction::{finish, open};
use crate::domain::user_service::user_not_found;
use crate::domain::{
    Comment, Error, Item, ItemDetails, ItemId, NewComment, NewItem, User, UserId,
};

/// Item service implementing [`ItemCommand`] and [`ItemQuery`].
#[derive(Clone)]
pub struct ItemService {
    store: Arc<dyn UnitOfWork>,
    clock: Arc<dyn Clock>,
    paging: PagingMode,
}

fn item_not_found(id: ItemId) -> Error {
    Error::not_found(format!("item {id} not found"))
}

async fn require_user(repos: &Repositories, id: UserId) -> Result<User, Error> {
    repos
        .users
        .find_by_id(id)
        .await?
        .ok_or_else(|| user_not_found(id))
}

async fn load(repos: &Repositories, id: ItemId) -> Result<Item, Error> {
    repos
        .items
        .find_by_id(id)
        .await?
        .ok_or_else(|| item_not_found(id))
}

async fn details(
    repos: &Repositories,
    item: Item,
    with_bookings: bool,
    now: NaiveDateTime,
) -> Result<ItemDetails, Error> {
    let (last_booking, next_booking) = if with_bookings {
        approved_neighbours(repos.bookings.as_ref(), item.id, now).await?
    } else {
        (None, None)
    };
    let comments = repos.comments.list_by_item(item.id).await?;
    Ok(ItemDetails {
        item,
        last_booking,
        next_booking,
        comments,
    })
}

impl ItemService {
    /// Create the service over the shared store.
    pub fn new(store: Arc<dyn UnitOfWork>, clock: Arc<dyn Clock>, paging: PagingMode) -> Self {
        Self {
            store,
            clock,
            paging,
        }
    }

    fn now(&self) -> NaiveDateTime {
        self.clock.local().naive_local()
    }

    async fn create(repos: &Repositories, item: NewItem) -> Result<Item, Error> {
        require_user(repos, item.owner_id).await?;
        if let Some(request_id) = item.request_id {
            repos
                .requests
                .find_by_id(request_id)
                .await?
                .ok_or_else(|| Error::not_found(format!("request {request_id} not found")))?;
        }
        let created = repos.items.insert(&item).await?;
        info!(item_id = %created.id, owner_id = %created.owner_id, "item created");
        Ok(created)
    }

    async fn update(repos: &Repositories, request: UpdateItemRequest) -> Result<Item, Error> {
        let item = load(repos, request.item_id).await?;
        if !item.is_owned_by(request.caller) {
            return Err(Error::not_found(format!(
                "item {} not found for user {}",
                request.item_id, request.caller
            )));
        }
        Ok(repos.items.update(&item.merged(request.patch)).await?)
    }

    /// The rental check and the insert see the same snapshot.
    async fn comment(
        &self,
        repos: &Repositories,
        request: AddCommentRequest,
    ) -> Result<Comment, Error> {
        let now = self.now();
        let rented = has_finished_rental(
            repos.bookings.as_ref(),
            request.author_id,
            request.item_id,
            now,
        )
        .await?;
        if !rented {
            debug!(
                author_id = %request.author_id,
                item_id = %request.item_id,
                "comment refused without finished rental"
            );
            return Err(Error::invalid_request("item was not rented"));
        }
        let author = require_user(repos, request.author_id).await?;
        let item = load(repos, request.item_id).await?;
        Ok(repos
            .comments
            .insert(&NewComment {
                item_id: item.id,
                author_id: author.id,
                text: request.text,
                created: now,
            })
            .await?)
    }

    async fn item_details(
        &self,
        repos: &Repositories,
        caller: UserId,
        id: ItemId,
    ) -> Result<ItemDetails, Error> {
        let item = load(repos, id).await?;
        let is_owner = item.is_owned_by(caller);
        details(repos, item, is_owner, self.now()).await
    }

    async fn owned_items(
        &self,
        repos: &Repositories,
        caller: UserId,
        page: PageRequest,
    ) -> Result<Vec<ItemDetails>, Error> {
        require_user(repos, caller).await?;
        let now = self.now();
        let items = repos
            .items
            .list_by_owner(caller, page.window(self.paging))
            .await?;
        let mut enriched = Vec::with_capacity(items.len());
        for item in items {
            enriched.push(details(repos, item, true, now).await?);
        }
        Ok(enriched)
    }
}

#[async_trait]
impl ItemCommand for ItemService {
    async fn create_item(&self, item: NewItem) -> Result<Item, Error> {
        let tx = open(self.store.as_ref(), TransactionMode::ReadWrite).await?;
        let outcome = Self::create(tx.repositories(), item).await;
        finish(tx, outcome).await
    }

    async fn update_item(&self, request: UpdateItemRequest) -> Result<Item, Error> {
        let tx = open(self.store.as_ref(), TransactionMode::ReadWrite).await?;
        let outcome = Self::update(tx.repositories(), request).await;
        finish(tx, outcome).await
    }

    async fn add_comment(&self, request: AddCommentRequest) -> Result<Comment, Error> {
        let tx = open(self.store.as_ref(), TransactionMode::ReadWrite).await?;
        let outcome = self.comment(tx.repositories(), request).await;
        finish(tx, outcome).await
    }
}

#[async_trait]
impl ItemQuery for ItemService {
    async fn get_item(&self, caller: UserId, id: ItemId) -> Result<ItemDetails, Error> {
        let tx = open(self.store.as_ref(), TransactionMode::ReadOnly).await?;
        let outcome = self.item_details(tx.repositories(), caller, id).await;
        finish(tx, outcome).await
    }

    async fn list_user_items(
        &self,
        caller: UserId,
        page: PageRequest,
    ) -> Result<Vec<ItemDetails>, Error> {
        let tx = open(self.store.as_ref(), TransactionMode::ReadOnly).await?;
        let outcome = self.owned_items(tx.repositories(), caller, page).await;
        finish(tx, outcome).await
    }

    async fn search_items(&self, text: String, page: PageRequest) -> Result<Vec<Item>, Error> {
        if text.is_empty() {
            return Ok(Vec::new());
        }
        let tx = open(self.store.as_ref(), TransactionMode::ReadOnly).await?;
        let outcome = tx
            .repositories()
            .items
            .search_available(&text, page.window(self.paging))
            .await
            .map_err(Error::from);
        finish(tx, outcome).await
    }
}

#[cfg(test)]
#[path = "item_service_tests.rs"]
mod tests;
