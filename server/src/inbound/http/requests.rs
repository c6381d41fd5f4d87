//! Item-request endpoints.
//!
//! ```text
//! POST /requests {"description":"Need a ladder"}
//! GET  /requests
//! GET  /requests/all?from=0&size=20
//! GET  /requests/1
//! ```

use actix_web::{get, post, web};
use chrono::NaiveDateTime;
use pagination::{DEFAULT_SIZE, PageQuery};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{ItemRequest, ItemRequestDetails, RequestId};

use super::error::{ApiResult, ErrorBody};
use super::items::ItemDto;
use super::page_request;
use super::sharer::Sharer;
use super::state::HttpState;
use super::timestamp;

/// Request joined with the items created to fulfil it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequestDto {
    pub id: i64,
    pub description: String,
    #[serde(with = "timestamp")]
    #[schema(value_type = String, example = "2024-06-01T00:00:00")]
    pub created: NaiveDateTime,
    pub items: Vec<ItemDto>,
}

impl From<ItemRequestDetails> for RequestDto {
    fn from(details: ItemRequestDetails) -> Self {
        let ItemRequestDetails { request, items } = details;
        Self {
            id: request.id.get(),
            description: request.description,
            created: request.created,
            items: items.into_iter().map(ItemDto::from).collect(),
        }
    }
}

impl From<ItemRequest> for RequestDto {
    fn from(request: ItemRequest) -> Self {
        ItemRequestDetails {
            request,
            items: Vec::new(),
        }
        .into()
    }
}

/// Body of `POST /requests`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct NewRequestBody {
    pub description: String,
}

/// Post a request for an item the caller wishes to borrow.
#[utoipa::path(
    post,
    path = "/requests",
    request_body = NewRequestBody,
    params(("X-Sharer-User-Id" = i64, Header, description = "Requesting user")),
    responses(
        (status = 200, description = "Created request", body = RequestDto),
        (status = 404, description = "Unknown user", body = ErrorBody)
    ),
    tags = ["requests"],
    operation_id = "createRequest"
)]
#[post("/requests")]
pub async fn create_request(
    state: web::Data<HttpState>,
    Sharer(caller): Sharer,
    payload: web::Json<NewRequestBody>,
) -> ApiResult<web::Json<RequestDto>> {
    let request = state
        .requests
        .create_request(caller, payload.into_inner().description)
        .await?;
    Ok(web::Json(request.into()))
}

/// The caller's own requests, newest first.
#[utoipa::path(
    get,
    path = "/requests",
    params(("X-Sharer-User-Id" = i64, Header, description = "Requesting user")),
    responses(
        (status = 200, description = "Own requests", body = [RequestDto]),
        (status = 404, description = "Unknown user", body = ErrorBody)
    ),
    tags = ["requests"],
    operation_id = "listOwnRequests"
)]
#[get("/requests")]
pub async fn list_own_requests(
    state: web::Data<HttpState>,
    Sharer(caller): Sharer,
) -> ApiResult<web::Json<Vec<RequestDto>>> {
    let requests = state.requests_query.list_own_requests(caller).await?;
    Ok(web::Json(requests.into_iter().map(RequestDto::from).collect()))
}

/// Other users' requests, newest first.
#[utoipa::path(
    get,
    path = "/requests/all",
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Calling user"),
        ("from" = Option<i64>, Query, description = "Row offset"),
        ("size" = Option<i64>, Query, description = "Window size")
    ),
    responses(
        (status = 200, description = "Requests by others", body = [RequestDto]),
        (status = 404, description = "Unknown user", body = ErrorBody)
    ),
    tags = ["requests"],
    operation_id = "listOtherRequests"
)]
#[get("/requests/all")]
pub async fn list_other_requests(
    state: web::Data<HttpState>,
    Sharer(caller): Sharer,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<Vec<RequestDto>>> {
    let page = page_request(query.into_inner(), DEFAULT_SIZE)?;
    let requests = state
        .requests_query
        .list_other_requests(caller, page)
        .await?;
    Ok(web::Json(requests.into_iter().map(RequestDto::from).collect()))
}

/// One request with its fulfilling items.
#[utoipa::path(
    get,
    path = "/requests/{id}",
    params(
        ("id" = i64, Path, description = "Request identifier"),
        ("X-Sharer-User-Id" = i64, Header, description = "Calling user")
    ),
    responses(
        (status = 200, description = "Request", body = RequestDto),
        (status = 404, description = "Unknown user or request", body = ErrorBody)
    ),
    tags = ["requests"],
    operation_id = "getRequest"
)]
#[get("/requests/{id}")]
pub async fn get_request(
    state: web::Data<HttpState>,
    Sharer(caller): Sharer,
    path: web::Path<i64>,
) -> ApiResult<web::Json<RequestDto>> {
    let details = state
        .requests_query
        .get_request(caller, RequestId::new(path.into_inner()))
        .await?;
    Ok(web::Json(details.into()))
}
