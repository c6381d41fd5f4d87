//! Gateway routes mirroring the server's HTTP surface.
//!
//! Each handler validates what it can without touching state, then forwards
//! the call. Literal segments such as `/items/search` are registered before
//! their `{id}` siblings so they are matched first.

use actix_web::web;
use pagination::{PageQuery, PageRequest};

use crate::error;
use crate::forwarder::ForwardRequest;

pub mod bookings;
pub mod items;
pub mod requests;
pub mod users;

#[cfg(test)]
pub(crate) mod test_utils;

/// Validate `from`/`size` and attach the resolved values to `request`.
///
/// Defaults are made explicit so the server sees the gateway's window.
pub(crate) fn paged(
    request: ForwardRequest,
    query: PageQuery,
    default_size: i64,
) -> Result<ForwardRequest, error::GatewayError> {
    let page: PageRequest = query.into_request(default_size)?;
    Ok(request
        .with_query("from", page.from())
        .with_query("size", page.size()))
}

/// Register extractor configuration and every gateway route.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(error::query_config())
        .app_data(error::path_config())
        .service(users::create_user)
        .service(users::list_users)
        .service(users::get_user)
        .service(users::update_user)
        .service(users::delete_user)
        .service(items::create_item)
        .service(items::list_user_items)
        .service(items::search_items)
        .service(items::get_item)
        .service(items::update_item)
        .service(items::add_comment)
        .service(bookings::create_booking)
        .service(bookings::list_booker_bookings)
        .service(bookings::list_owner_bookings)
        .service(bookings::get_booking)
        .service(bookings::decide_booking)
        .service(requests::create_request)
        .service(requests::list_own_requests)
        .service(requests::list_other_requests)
        .service(requests::get_request);
}
