//! PostgreSQL-backed `ItemRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::Window;

use crate::domain::ports::{ItemPersistenceError, ItemRepository};
use crate::domain::{Item, ItemId, NewItem, RequestId, UserId};

use super::diesel_error_mapping::{contains_pattern, map_diesel_error, map_pool_error};
use super::models::{ItemRow, ItemUpdate, NewItemRow};
use super::pool::{ConnectionSource, DbPool, PoolError};
use super::schema::items;

/// Diesel-backed item repository.
#[derive(Clone)]
pub struct DieselItemRepository {
    source: ConnectionSource,
}

impl DieselItemRepository {
    /// Create a repository over the shared pool.
    pub fn new(pool: DbPool) -> Self {
        Self::over(pool.into())
    }

    pub(crate) fn over(source: ConnectionSource) -> Self {
        Self { source }
    }
}

fn pool_error(error: PoolError) -> ItemPersistenceError {
    map_pool_error(error, ItemPersistenceError::connection)
}

fn diesel_error(error: diesel::result::Error) -> ItemPersistenceError {
    map_diesel_error(
        &error,
        ItemPersistenceError::query,
        ItemPersistenceError::connection,
    )
}

fn into_items(rows: Vec<ItemRow>) -> Vec<Item> {
    rows.into_iter().map(Item::from).collect()
}

#[async_trait]
impl ItemRepository for DieselItemRepository {
    async fn insert(&self, item: &NewItem) -> Result<Item, ItemPersistenceError> {
        let mut conn = self.source.get().await.map_err(pool_error)?;
        diesel::insert_into(items::table)
            .values(NewItemRow {
                owner_id: item.owner_id.get(),
                name: &item.name,
                description: &item.description,
                available: item.available,
                request_id: item.request_id.map(RequestId::get),
            })
            .returning(ItemRow::as_returning())
            .get_result(&mut conn)
            .await
            .map(Item::from)
            .map_err(diesel_error)
    }

    async fn update(&self, item: &Item) -> Result<Item, ItemPersistenceError> {
        let mut conn = self.source.get().await.map_err(pool_error)?;
        diesel::update(items::table.find(item.id.get()))
            .set(ItemUpdate {
                name: &item.name,
                description: &item.description,
                available: item.available,
            })
            .returning(ItemRow::as_returning())
            .get_result(&mut conn)
            .await
            .map(Item::from)
            .map_err(diesel_error)
    }

    async fn find_by_id(&self, id: ItemId) -> Result<Option<Item>, ItemPersistenceError> {
        let mut conn = self.source.get().await.map_err(pool_error)?;
        items::table
            .find(id.get())
            .select(ItemRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map(|row| row.map(Item::from))
            .map_err(diesel_error)
    }

    async fn list_by_owner(
        &self,
        owner: UserId,
        window: Window,
    ) -> Result<Vec<Item>, ItemPersistenceError> {
        let mut conn = self.source.get().await.map_err(pool_error)?;
        items::table
            .filter(items::owner_id.eq(owner.get()))
            .order(items::id.asc())
            .offset(window.offset)
            .limit(window.limit)
            .select(ItemRow::as_select())
            .load(&mut conn)
            .await
            .map(into_items)
            .map_err(diesel_error)
    }

    async fn list_by_requests(
        &self,
        request_ids: &[RequestId],
    ) -> Result<Vec<Item>, ItemPersistenceError> {
        if request_ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<i64> = request_ids.iter().map(|id| id.get()).collect();
        let mut conn = self.source.get().await.map_err(pool_error)?;
        items::table
            .filter(items::request_id.eq_any(ids))
            .order(items::id.asc())
            .select(ItemRow::as_select())
            .load(&mut conn)
            .await
            .map(into_items)
            .map_err(diesel_error)
    }

    async fn search_available(
        &self,
        text: &str,
        window: Window,
    ) -> Result<Vec<Item>, ItemPersistenceError> {
        let pattern = contains_pattern(text);
        let mut conn = self.source.get().await.map_err(pool_error)?;
        items::table
            .filter(items::available.eq(true))
            .filter(
                items::name
                    .ilike(pattern.as_str())
                    .or(items::description.ilike(pattern.as_str())),
            )
            .order(items::id.asc())
            .offset(window.offset)
            .limit(window.limit)
            .select(ItemRow::as_select())
            .load(&mut conn)
            .await
            .map(into_items)
            .map_err(diesel_error)
    }
}
