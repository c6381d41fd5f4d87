//! PostgreSQL-backed `CommentRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, RunQueryDsl};

use crate::domain::ports::{CommentPersistenceError, CommentRepository};
use crate::domain::{Comment, ItemId, NewComment};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{CommentRow, NewCommentRow};
use super::pool::{ConnectionSource, DbPool, PoolError};
use super::schema::{comments, users};

/// Diesel-backed comment repository.
#[derive(Clone)]
pub struct DieselCommentRepository {
    source: ConnectionSource,
}

impl DieselCommentRepository {
    /// Create a repository over the shared pool.
    pub fn new(pool: DbPool) -> Self {
        Self::over(pool.into())
    }

    pub(crate) fn over(source: ConnectionSource) -> Self {
        Self { source }
    }
}

fn pool_error(error: PoolError) -> CommentPersistenceError {
    map_pool_error(error, CommentPersistenceError::connection)
}

fn diesel_error(error: diesel::result::Error) -> CommentPersistenceError {
    map_diesel_error(
        &error,
        CommentPersistenceError::query,
        CommentPersistenceError::connection,
    )
}

#[async_trait]
impl CommentRepository for DieselCommentRepository {
    async fn insert(&self, comment: &NewComment) -> Result<Comment, CommentPersistenceError> {
        let mut conn = self.source.get().await.map_err(pool_error)?;
        let row = NewCommentRow {
            item_id: comment.item_id.get(),
            author_id: comment.author_id.get(),
            text: &comment.text,
            created: comment.created,
        };

        let (stored, author_name) = conn
            .transaction(|conn| {
                async move {
                    let stored: CommentRow = diesel::insert_into(comments::table)
                        .values(row)
                        .returning(CommentRow::as_returning())
                        .get_result(conn)
                        .await?;
                    let author_name: String = users::table
                        .find(stored.author_id)
                        .select(users::name)
                        .first(conn)
                        .await?;
                    Ok((stored, author_name))
                }
                .scope_boxed()
            })
            .await
            .map_err(diesel_error)?;

        Ok(stored.with_author(author_name))
    }

    async fn list_by_item(&self, item: ItemId) -> Result<Vec<Comment>, CommentPersistenceError> {
        let mut conn = self.source.get().await.map_err(pool_error)?;
        let rows: Vec<(CommentRow, String)> = comments::table
            .inner_join(users::table.on(users::id.eq(comments::author_id)))
            .filter(comments::item_id.eq(item.get()))
            .order((comments::created.asc(), comments::id.asc()))
            .select((CommentRow::as_select(), users::name))
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(rows
            .into_iter()
            .map(|(row, author_name)| row.with_author(author_name))
            .collect())
    }
}
