//! `/users` routes. None of them require a caller header.

use actix_web::{HttpResponse, delete, get, patch, post, web};
use reqwest::Method;

use crate::error::GatewayResult;
use crate::forwarder::ForwardRequest;
use crate::state::GatewayState;
use crate::validation::{NewUserPayload, UserPatchPayload, decode};

/// Register a user after checking name and e-mail.
#[post("/users")]
pub async fn create_user(
    state: web::Data<GatewayState>,
    body: web::Bytes,
) -> GatewayResult<HttpResponse> {
    decode::<NewUserPayload>(&body)?.validate()?;
    state
        .forward(ForwardRequest::new(Method::POST, "users").with_body(body.to_vec()))
        .await
}

/// Patch a user; a supplied e-mail must be well formed.
#[patch("/users/{id}")]
pub async fn update_user(
    state: web::Data<GatewayState>,
    path: web::Path<i64>,
    body: web::Bytes,
) -> GatewayResult<HttpResponse> {
    decode::<UserPatchPayload>(&body)?.validate()?;
    let id = path.into_inner();
    state
        .forward(ForwardRequest::new(Method::PATCH, format!("users/{id}")).with_body(body.to_vec()))
        .await
}

#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<GatewayState>,
    path: web::Path<i64>,
) -> GatewayResult<HttpResponse> {
    let id = path.into_inner();
    state
        .forward(ForwardRequest::new(Method::GET, format!("users/{id}")))
        .await
}

#[get("/users")]
pub async fn list_users(state: web::Data<GatewayState>) -> GatewayResult<HttpResponse> {
    state.forward(ForwardRequest::new(Method::GET, "users")).await
}

#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<GatewayState>,
    path: web::Path<i64>,
) -> GatewayResult<HttpResponse> {
    let id = path.into_inner();
    state
        .forward(ForwardRequest::new(Method::DELETE, format!("users/{id}")))
        .await
}
