//! Item endpoints: publishing, editing, extended reads, search and comments.
//!
//! ```text
//! POST  /items {"name":"Drill","description":"Cordless","available":true}
//! GET   /items/search?text=drill&from=0&size=20
//! POST  /items/1/comment {"text":"Worked great"}
//! ```

use actix_web::{get, patch, post, web};
use chrono::NaiveDateTime;
use pagination::{DEFAULT_SIZE, PageQuery};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{AddCommentRequest, UpdateItemRequest};
use crate::domain::{
    BookingSummary, Comment, Item, ItemDetails, ItemId, ItemPatch, NewItem, RequestId,
};

use super::error::{ApiResult, ErrorBody};
use super::page_request;
use super::sharer::Sharer;
use super::state::HttpState;
use super::timestamp;

/// Plain item representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemDto {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub available: bool,
    pub request_id: Option<i64>,
}

impl From<Item> for ItemDto {
    fn from(item: Item) -> Self {
        Self {
            id: item.id.get(),
            name: item.name,
            description: item.description,
            available: item.available,
            request_id: item.request_id.map(RequestId::get),
        }
    }
}

/// Booking attached to an extended item view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemBookingDto {
    pub id: i64,
    pub booker_id: i64,
    #[serde(with = "timestamp")]
    #[schema(value_type = String, example = "2024-07-01T10:00:00")]
    pub start: NaiveDateTime,
    #[serde(with = "timestamp")]
    #[schema(value_type = String, example = "2024-07-02T10:00:00")]
    pub end: NaiveDateTime,
}

impl From<BookingSummary> for ItemBookingDto {
    fn from(summary: BookingSummary) -> Self {
        Self {
            id: summary.id.get(),
            booker_id: summary.booker_id.get(),
            start: summary.start,
            end: summary.end,
        }
    }
}

/// Comment representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentDto {
    pub id: i64,
    pub text: String,
    pub author_name: String,
    #[serde(with = "timestamp")]
    #[schema(value_type = String, example = "2024-06-01T00:00:00")]
    pub created: NaiveDateTime,
}

impl From<Comment> for CommentDto {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id.get(),
            text: comment.text,
            author_name: comment.author_name,
            created: comment.created,
        }
    }
}

/// Item decorated with booking enrichment and comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemDetailsDto {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub available: bool,
    pub request_id: Option<i64>,
    pub last_booking: Option<ItemBookingDto>,
    pub next_booking: Option<ItemBookingDto>,
    pub comments: Vec<CommentDto>,
}

impl From<ItemDetails> for ItemDetailsDto {
    fn from(details: ItemDetails) -> Self {
        let ItemDetails {
            item,
            last_booking,
            next_booking,
            comments,
        } = details;
        Self {
            id: item.id.get(),
            name: item.name,
            description: item.description,
            available: item.available,
            request_id: item.request_id.map(RequestId::get),
            last_booking: last_booking.map(ItemBookingDto::from),
            next_booking: next_booking.map(ItemBookingDto::from),
            comments: comments.into_iter().map(CommentDto::from).collect(),
        }
    }
}

/// Body of `POST /items`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewItemBody {
    pub name: String,
    pub description: String,
    pub available: bool,
    pub request_id: Option<i64>,
}

/// Body of `PATCH /items/{id}`; absent or null fields are left untouched.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemPatchBody {
    pub name: Option<String>,
    pub description: Option<String>,
    pub available: Option<bool>,
}

/// Body of `POST /items/{id}/comment`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CommentBody {
    pub text: String,
}

/// Query of `GET /items/search`.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub text: Option<String>,
    pub from: Option<i64>,
    pub size: Option<i64>,
}

/// Publish an item owned by the caller.
#[utoipa::path(
    post,
    path = "/items",
    request_body = NewItemBody,
    params(("X-Sharer-User-Id" = i64, Header, description = "Calling user")),
    responses(
        (status = 200, description = "Created item", body = ItemDto),
        (status = 404, description = "Unknown owner or request", body = ErrorBody)
    ),
    tags = ["items"],
    operation_id = "createItem"
)]
#[post("/items")]
pub async fn create_item(
    state: web::Data<HttpState>,
    Sharer(caller): Sharer,
    payload: web::Json<NewItemBody>,
) -> ApiResult<web::Json<ItemDto>> {
    let NewItemBody {
        name,
        description,
        available,
        request_id,
    } = payload.into_inner();
    let item = state
        .items
        .create_item(NewItem {
            owner_id: caller,
            name,
            description,
            available,
            request_id: request_id.map(RequestId::new),
        })
        .await?;
    Ok(web::Json(item.into()))
}

/// Partially update an item; only its owner may.
#[utoipa::path(
    patch,
    path = "/items/{id}",
    request_body = ItemPatchBody,
    params(
        ("id" = i64, Path, description = "Item identifier"),
        ("X-Sharer-User-Id" = i64, Header, description = "Calling user")
    ),
    responses(
        (status = 200, description = "Updated item", body = ItemDto),
        (status = 404, description = "Unknown item or not the owner", body = ErrorBody)
    ),
    tags = ["items"],
    operation_id = "updateItem"
)]
#[patch("/items/{id}")]
pub async fn update_item(
    state: web::Data<HttpState>,
    Sharer(caller): Sharer,
    path: web::Path<i64>,
    payload: web::Json<ItemPatchBody>,
) -> ApiResult<web::Json<ItemDto>> {
    let ItemPatchBody {
        name,
        description,
        available,
    } = payload.into_inner();
    let item = state
        .items
        .update_item(UpdateItemRequest {
            caller,
            item_id: ItemId::new(path.into_inner()),
            patch: ItemPatch {
                name,
                description,
                available,
            },
        })
        .await?;
    Ok(web::Json(item.into()))
}

/// Search available items by name or description, case-insensitively.
#[utoipa::path(
    get,
    path = "/items/search",
    params(
        ("text" = Option<String>, Query, description = "Search text; empty yields no results"),
        ("from" = Option<i64>, Query, description = "Row offset"),
        ("size" = Option<i64>, Query, description = "Window size")
    ),
    responses((status = 200, description = "Matching items", body = [ItemDto])),
    tags = ["items"],
    operation_id = "searchItems"
)]
#[get("/items/search")]
pub async fn search_items(
    state: web::Data<HttpState>,
    query: web::Query<SearchQuery>,
) -> ApiResult<web::Json<Vec<ItemDto>>> {
    let SearchQuery { text, from, size } = query.into_inner();
    let page = page_request(PageQuery { from, size }, DEFAULT_SIZE)?;
    let items = state
        .items_query
        .search_items(text.unwrap_or_default(), page)
        .await?;
    Ok(web::Json(items.into_iter().map(ItemDto::from).collect()))
}

/// Extended item view; bookings are attached for the owner only.
#[utoipa::path(
    get,
    path = "/items/{id}",
    params(
        ("id" = i64, Path, description = "Item identifier"),
        ("X-Sharer-User-Id" = i64, Header, description = "Calling user")
    ),
    responses(
        (status = 200, description = "Item", body = ItemDetailsDto),
        (status = 404, description = "Unknown item", body = ErrorBody)
    ),
    tags = ["items"],
    operation_id = "getItem"
)]
#[get("/items/{id}")]
pub async fn get_item(
    state: web::Data<HttpState>,
    Sharer(caller): Sharer,
    path: web::Path<i64>,
) -> ApiResult<web::Json<ItemDetailsDto>> {
    let details = state
        .items_query
        .get_item(caller, ItemId::new(path.into_inner()))
        .await?;
    Ok(web::Json(details.into()))
}

/// The caller's items, extended, ordered by id.
#[utoipa::path(
    get,
    path = "/items",
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Calling user"),
        ("from" = Option<i64>, Query, description = "Row offset"),
        ("size" = Option<i64>, Query, description = "Window size")
    ),
    responses(
        (status = 200, description = "Owned items", body = [ItemDetailsDto]),
        (status = 404, description = "Unknown user", body = ErrorBody)
    ),
    tags = ["items"],
    operation_id = "listUserItems"
)]
#[get("/items")]
pub async fn list_user_items(
    state: web::Data<HttpState>,
    Sharer(caller): Sharer,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<Vec<ItemDetailsDto>>> {
    let page = page_request(query.into_inner(), DEFAULT_SIZE)?;
    let items = state.items_query.list_user_items(caller, page).await?;
    Ok(web::Json(items.into_iter().map(ItemDetailsDto::from).collect()))
}

/// Comment on an item the caller has finished renting.
#[utoipa::path(
    post,
    path = "/items/{id}/comment",
    request_body = CommentBody,
    params(
        ("id" = i64, Path, description = "Item identifier"),
        ("X-Sharer-User-Id" = i64, Header, description = "Calling user")
    ),
    responses(
        (status = 200, description = "Created comment", body = CommentDto),
        (status = 400, description = "Item was not rented", body = ErrorBody),
        (status = 404, description = "Unknown user or item", body = ErrorBody)
    ),
    tags = ["items"],
    operation_id = "addComment"
)]
#[post("/items/{id}/comment")]
pub async fn add_comment(
    state: web::Data<HttpState>,
    Sharer(caller): Sharer,
    path: web::Path<i64>,
    payload: web::Json<CommentBody>,
) -> ApiResult<web::Json<CommentDto>> {
    let comment = state
        .items
        .add_comment(AddCommentRequest {
            author_id: caller,
            item_id: ItemId::new(path.into_inner()),
            text: payload.into_inner().text,
        })
        .await?;
    Ok(web::Json(comment.into()))
}
