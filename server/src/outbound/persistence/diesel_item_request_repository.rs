//! PostgreSQL-backed `ItemRequestRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::Window;

use crate::domain::ports::{ItemRequestPersistenceError, ItemRequestRepository};
use crate::domain::{ItemRequest, NewItemRequest, RequestId, UserId};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewRequestRow, RequestRow};
use super::pool::{ConnectionSource, DbPool, PoolError};
use super::schema::requests;

/// Diesel-backed item request repository.
#[derive(Clone)]
pub struct DieselItemRequestRepository {
    source: ConnectionSource,
}

impl DieselItemRequestRepository {
    /// Create a repository over the shared pool.
    pub fn new(pool: DbPool) -> Self {
        Self::over(pool.into())
    }

    pub(crate) fn over(source: ConnectionSource) -> Self {
        Self { source }
    }
}

fn pool_error(error: PoolError) -> ItemRequestPersistenceError {
    map_pool_error(error, ItemRequestPersistenceError::connection)
}

fn diesel_error(error: diesel::result::Error) -> ItemRequestPersistenceError {
    map_diesel_error(
        &error,
        ItemRequestPersistenceError::query,
        ItemRequestPersistenceError::connection,
    )
}

fn into_requests(rows: Vec<RequestRow>) -> Vec<ItemRequest> {
    rows.into_iter().map(ItemRequest::from).collect()
}

#[async_trait]
impl ItemRequestRepository for DieselItemRequestRepository {
    async fn insert(
        &self,
        request: &NewItemRequest,
    ) -> Result<ItemRequest, ItemRequestPersistenceError> {
        let mut conn = self.source.get().await.map_err(pool_error)?;
        diesel::insert_into(requests::table)
            .values(NewRequestRow {
                requestor_id: request.requestor_id.get(),
                description: &request.description,
                created: request.created,
            })
            .returning(RequestRow::as_returning())
            .get_result(&mut conn)
            .await
            .map(ItemRequest::from)
            .map_err(diesel_error)
    }

    async fn find_by_id(
        &self,
        id: RequestId,
    ) -> Result<Option<ItemRequest>, ItemRequestPersistenceError> {
        let mut conn = self.source.get().await.map_err(pool_error)?;
        requests::table
            .find(id.get())
            .select(RequestRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map(|row| row.map(ItemRequest::from))
            .map_err(diesel_error)
    }

    async fn list_by_requestor(
        &self,
        requestor: UserId,
    ) -> Result<Vec<ItemRequest>, ItemRequestPersistenceError> {
        let mut conn = self.source.get().await.map_err(pool_error)?;
        requests::table
            .filter(requests::requestor_id.eq(requestor.get()))
            .order((requests::created.desc(), requests::id.desc()))
            .select(RequestRow::as_select())
            .load(&mut conn)
            .await
            .map(into_requests)
            .map_err(diesel_error)
    }

    async fn list_by_others(
        &self,
        requestor: UserId,
        window: Window,
    ) -> Result<Vec<ItemRequest>, ItemRequestPersistenceError> {
        let mut conn = self.source.get().await.map_err(pool_error)?;
        requests::table
            .filter(requests::requestor_id.ne(requestor.get()))
            .order((requests::created.desc(), requests::id.desc()))
            .offset(window.offset)
            .limit(window.limit)
            .select(RequestRow::as_select())
            .load(&mut conn)
            .await
            .map(into_requests)
            .map_err(diesel_error)
    }
}
