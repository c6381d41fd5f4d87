//! HTTP inbound adapter exposing the ShareIt REST routes.

pub mod bookings;
pub mod error;
pub mod health;
pub mod items;
pub mod requests;
pub mod sharer;
pub mod state;
#[cfg(test)]
pub(crate) mod test_utils;
pub mod timestamp;
pub mod users;

use actix_web::web;
use pagination::{PageQuery, PageRequest};

use crate::domain::Error;

pub use error::{ApiResult, ErrorBody};

/// Validate `from`/`size`, filling gaps with `default_size`.
pub(crate) fn page_request(query: PageQuery, default_size: i64) -> Result<PageRequest, Error> {
    query
        .into_request(default_size)
        .map_err(|err| Error::invalid_request(err.to_string()))
}

/// Register extractor configuration and every resource route.
///
/// Literal segments (`/items/search`, `/bookings/owner`, `/requests/all`) are
/// registered ahead of their `{id}` siblings.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(error::json_config())
        .app_data(error::query_config())
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
