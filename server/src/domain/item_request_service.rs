//! Item request service: posting requests and listing them with fulfilments.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::{PageRequest, PagingMode};
use tracing::info;

use crate::domain::ports::{
    ItemRequestCommand, ItemRequestQuery, Repositories, TransactionMode, UnitOfWork,
};
use crate::domain::transaction::{finish, open};
use crate::domain::user_service::user_not_found;
use crate::domain::{
    Error, ItemRequest, ItemRequestDetails, NewItemRequest, RequestId, UserId,
};

/// Item request service implementing [`ItemRequestCommand`] and
/// [`ItemRequestQuery`].
#[derive(Clone)]
pub struct ItemRequestService {
    store: Arc<dyn UnitOfWork>,
    clock: Arc<dyn Clock>,
    paging: PagingMode,
}

async fn require_user(repos: &Repositories, id: UserId) -> Result<(), Error> {
    repos
        .users
        .find_by_id(id)
        .await?
        .map(|_| ())
        .ok_or_else(|| user_not_found(id))
}

/// Attach fulfilling items to each request in one store round trip.
async fn with_items(
    repos: &Repositories,
    requests: Vec<ItemRequest>,
) -> Result<Vec<ItemRequestDetails>, Error> {
    if requests.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<RequestId> = requests.iter().map(|request| request.id).collect();
    let items = repos.items.list_by_requests(&ids).await?;
    Ok(ItemRequestDetails::join(requests, &items))
}

impl ItemRequestService {
    /// Create the service over the shared store.
    pub fn new(store: Arc<dyn UnitOfWork>, clock: Arc<dyn Clock>, paging: PagingMode) -> Self {
        Self {
            store,
            clock,
            paging,
        }
    }

    async fn create(
        &self,
        repos: &Repositories,
        requestor: UserId,
        description: String,
    ) -> Result<ItemRequest, Error> {
        require_user(repos, requestor).await?;
        let created = repos
            .requests
            .insert(&NewItemRequest {
                requestor_id: requestor,
                description,
                created: self.clock.local().naive_local(),
            })
            .await?;
        info!(request_id = %created.id, requestor_id = %requestor, "item request created");
        Ok(created)
    }

    async fn own(repos: &Repositories, caller: UserId) -> Result<Vec<ItemRequestDetails>, Error> {
        require_user(repos, caller).await?;
        let requests = repos.requests.list_by_requestor(caller).await?;
        with_items(repos, requests).await
    }

    async fn others(
        &self,
        repos: &Repositories,
        caller: UserId,
        page: PageRequest,
    ) -> Result<Vec<ItemRequestDetails>, Error> {
        require_user(repos, caller).await?;
        let requests = repos
            .requests
            .list_by_others(caller, page.window(self.paging))
            .await?;
        with_items(repos, requests).await
    }

    async fn one(
        repos: &Repositories,
        caller: UserId,
        id: RequestId,
    ) -> Result<ItemRequestDetails, Error> {
        require_user(repos, caller).await?;
        let request = repos
            .requests
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("request {id} not found")))?;
        let mut joined = with_items(repos, vec![request]).await?;
        joined
            .pop()
            .ok_or_else(|| Error::internal(format!("request {id} lost during join")))
    }
}

#[async_trait]
impl ItemRequestCommand for ItemRequestService {
    async fn create_request(
        &self,
        requestor: UserId,
        description: String,
    ) -> Result<ItemRequest, Error> {
        let tx = open(self.store.as_ref(), TransactionMode::ReadWrite).await?;
        let outcome = self.create(tx.repositories(), requestor, description).await;
        finish(tx, outcome).await
    }
}

#[async_trait]
impl ItemRequestQuery for ItemRequestService {
    async fn list_own_requests(&self, caller: UserId) -> Result<Vec<ItemRequestDetails>, Error> {
        let tx = open(self.store.as_ref(), TransactionMode::ReadOnly).await?;
        let outcome = Self::own(tx.repositories(), caller).await;
        finish(tx, outcome).await
    }

    async fn list_other_requests(
        &self,
        caller: UserId,
        page: PageRequest,
    ) -> Result<Vec<ItemRequestDetails>, Error> {
        let tx = open(self.store.as_ref(), TransactionMode::ReadOnly).await?;
        let outcome = self.others(tx.repositories(), caller, page).await;
        finish(tx, outcome).await
    }

    async fn get_request(
        &self,
        caller: UserId,
        id: RequestId,
    ) -> Result<ItemRequestDetails, Error> {
        let tx = open(self.store.as_ref(), TransactionMode::ReadOnly).await?;
        let outcome = Self::one(tx.repositories(), caller, id).await;
        finish(tx, outcome).await
    }
}

#[cfg(test)]
#[path = "item_request_service_tests.rs"]
mod tests;
