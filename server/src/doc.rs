//! OpenAPI document for the ShareIt server.
//!
//! Served by Swagger UI at `/docs` in debug builds and exported by the
//! `openapi-dump` binary.

use utoipa::OpenApi;

use crate::inbound::http::{bookings, health, items, requests, users};

/// OpenAPI document covering every server route.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "ShareIt server API",
        description = "Item sharing: users, items, bookings, comments and item requests. \
                       The calling user is identified by the X-Sharer-User-Id header."
    ),
    paths(
        users::create_user,
        users::update_user,
        users::get_user,
        users::list_users,
        users::delete_user,
        items::create_item,
        items::update_item,
        items::search_items,
        items::get_item,
        items::list_user_items,
        items::add_comment,
        bookings::create_booking,
        bookings::decide_booking,
        bookings::list_booker_bookings,
        bookings::list_owner_bookings,
        bookings::get_booking,
        requests::create_request,
        requests::list_own_requests,
        requests::list_other_requests,
        requests::get_request,
        health::ready,
        health::live,
    ),
    tags(
        (name = "users", description = "User registry"),
        (name = "items", description = "Items, search and comments"),
        (name = "bookings", description = "Booking engine"),
        (name = "requests", description = "Item requests"),
        (name = "health", description = "Liveness and readiness")
    )
)]
pub struct ApiDoc;
