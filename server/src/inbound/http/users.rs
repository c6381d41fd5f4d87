//! User endpoints.
//!
//! ```text
//! POST /users {"name":"Ada","email":"ada@example.com"}
//! PATCH /users/1 {"email":"lovelace@example.com"}
//! GET /users/1
//! GET /users
//! DELETE /users/1
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{NewUser, User, UserId, UserPatch};

use super::error::{ApiResult, ErrorBody};
use super::state::HttpState;

/// User representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: i64,
    pub name: String,
    pub email: String,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id.get(),
            name: user.name,
            email: user.email,
        }
    }
}

/// Body of `POST /users`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewUserBody {
    pub name: String,
    pub email: String,
}

/// Body of `PATCH /users/{id}`; absent or null fields are left untouched.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserPatchBody {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Register a user.
#[utoipa::path(
    post,
    path = "/users",
    request_body = NewUserBody,
    responses(
        (status = 200, description = "Created user", body = UserDto),
        (status = 400, description = "Invalid request", body = ErrorBody),
        (status = 409, description = "E-mail already in use", body = ErrorBody)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("/users")]
pub async fn create_user(
    state: web::Data<HttpState>,
    payload: web::Json<NewUserBody>,
) -> ApiResult<web::Json<UserDto>> {
    let NewUserBody { name, email } = payload.into_inner();
    let user = state.users.create_user(NewUser { name, email }).await?;
    Ok(web::Json(user.into()))
}

/// Partially update a user.
#[utoipa::path(
    patch,
    path = "/users/{id}",
    request_body = UserPatchBody,
    params(("id" = i64, Path, description = "User identifier")),
    responses(
        (status = 200, description = "Updated user", body = UserDto),
        (status = 404, description = "Unknown user", body = ErrorBody),
        (status = 409, description = "E-mail already in use", body = ErrorBody)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[patch("/users/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
    payload: web::Json<UserPatchBody>,
) -> ApiResult<web::Json<UserDto>> {
    let UserPatchBody { name, email } = payload.into_inner();
    let user = state
        .users
        .update_user(UserId::new(path.into_inner()), UserPatch { name, email })
        .await?;
    Ok(web::Json(user.into()))
}

/// Fetch one user.
#[utoipa::path(
    get,
    path = "/users/{id}",
    params(("id" = i64, Path, description = "User identifier")),
    responses(
        (status = 200, description = "User", body = UserDto),
        (status = 404, description = "Unknown user", body = ErrorBody)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<web::Json<UserDto>> {
    let user = state
        .users_query
        .get_user(UserId::new(path.into_inner()))
        .await?;
    Ok(web::Json(user.into()))
}

/// List every user ordered by id.
#[utoipa::path(
    get,
    path = "/users",
    responses((status = 200, description = "Users", body = [UserDto])),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<UserDto>>> {
    let users = state.users_query.list_users().await?;
    Ok(web::Json(users.into_iter().map(UserDto::from).collect()))
}

/// Delete a user together with their items, bookings and requests.
#[utoipa::path(
    delete,
    path = "/users/{id}",
    params(("id" = i64, Path, description = "User identifier")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Unknown user", body = ErrorBody)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    state
        .users
        .delete_user(UserId::new(path.into_inner()))
        .await?;
    Ok(HttpResponse::Ok().finish())
}
