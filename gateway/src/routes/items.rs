//! `/items` routes, all keyed on the caller header.

use actix_web::{HttpResponse, get, patch, post, web};
use pagination::{DEFAULT_SIZE, PageQuery};
use reqwest::Method;
use serde::Deserialize;

use super::paged;
use crate::error::{GatewayError, GatewayResult};
use crate::forwarder::ForwardRequest;
use crate::sharer::Sharer;
use crate::state::GatewayState;
use crate::validation::{CommentPayload, NewItemPayload, decode};

/// `GET /items/search` parameters.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// Case-insensitive needle.
    pub text: Option<String>,
    /// Row offset.
    pub from: Option<i64>,
    /// Window size.
    pub size: Option<i64>,
}

#[post("/items")]
pub async fn create_item(
    state: web::Data<GatewayState>,
    sharer: Sharer,
    body: web::Bytes,
) -> GatewayResult<HttpResponse> {
    decode::<NewItemPayload>(&body)?.validate()?;
    let request = ForwardRequest::new(Method::POST, "items")
        .with_sharer(sharer.0)
        .with_body(body.to_vec());
    state.forward(request).await
}

/// Partial updates carry no required fields; the body only has to be JSON.
#[patch("/items/{id}")]
pub async fn update_item(
    state: web::Data<GatewayState>,
    sharer: Sharer,
    path: web::Path<i64>,
    body: web::Bytes,
) -> GatewayResult<HttpResponse> {
    decode::<serde_json::Value>(&body)?;
    let id = path.into_inner();
    let request = ForwardRequest::new(Method::PATCH, format!("items/{id}"))
        .with_sharer(sharer.0)
        .with_body(body.to_vec());
    state.forward(request).await
}

#[get("/items/search")]
pub async fn search_items(
    state: web::Data<GatewayState>,
    sharer: Sharer,
    query: web::Query<SearchQuery>,
) -> GatewayResult<HttpResponse> {
    let SearchQuery { text, from, size } = query.into_inner();
    let text = text.ok_or_else(|| GatewayError::validation("text query parameter is required"))?;
    let request = ForwardRequest::new(Method::GET, "items/search")
        .with_sharer(sharer.0)
        .with_query("text", text);
    state
        .forward(paged(request, PageQuery { from, size }, DEFAULT_SIZE)?)
        .await
}

#[get("/items/{id}")]
pub async fn get_item(
    state: web::Data<GatewayState>,
    sharer: Sharer,
    path: web::Path<i64>,
) -> GatewayResult<HttpResponse> {
    let id = path.into_inner();
    state
        .forward(ForwardRequest::new(Method::GET, format!("items/{id}")).with_sharer(sharer.0))
        .await
}

#[get("/items")]
pub async fn list_user_items(
    state: web::Data<GatewayState>,
    sharer: Sharer,
    query: web::Query<PageQuery>,
) -> GatewayResult<HttpResponse> {
    let request = ForwardRequest::new(Method::GET, "items").with_sharer(sharer.0);
    state
        .forward(paged(request, query.into_inner(), DEFAULT_SIZE)?)
        .await
}

#[post("/items/{id}/comment")]
pub async fn add_comment(
    state: web::Data<GatewayState>,
    sharer: Sharer,
    path: web::Path<i64>,
    body: web::Bytes,
) -> GatewayResult<HttpResponse> {
    decode::<CommentPayload>(&body)?.validate()?;
    let id = path.into_inner();
    let request = ForwardRequest::new(Method::POST, format!("items/{id}/comment"))
        .with_sharer(sharer.0)
        .with_body(body.to_vec());
    state.forward(request).await
}
