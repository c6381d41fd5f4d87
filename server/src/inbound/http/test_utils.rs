//! Mock-backed state and request helpers for handler tests.

use actix_web::dev::ServiceResponse;
use actix_web::{App, test, web};

use crate::domain::ports::{
    MockBookingCommand, MockBookingQuery, MockItemCommand, MockItemQuery, MockItemRequestCommand,
    MockItemRequestQuery, MockUserCommand, MockUsersQuery,
};

use super::sharer::SHARER_HEADER;
use super::state::{HttpState, HttpStatePorts};

/// One mock per driving port; set expectations before calling `send`.
#[derive(Default)]
pub(crate) struct MockPorts {
    pub users: MockUserCommand,
    pub users_query: MockUsersQuery,
    pub items: MockItemCommand,
    pub items_query: MockItemQuery,
    pub bookings: MockBookingCommand,
    pub bookings_query: MockBookingQuery,
    pub requests: MockItemRequestCommand,
    pub requests_query: MockItemRequestQuery,
}

impl MockPorts {
    pub(crate) fn into_state(self) -> HttpState {
        use std::sync::Arc;

        HttpState::new(HttpStatePorts {
            users: Arc::new(self.users),
            users_query: Arc::new(self.users_query),
            items: Arc::new(self.items),
            items_query: Arc::new(self.items_query),
            bookings: Arc::new(self.bookings),
            bookings_query: Arc::new(self.bookings_query),
            requests: Arc::new(self.requests),
            requests_query: Arc::new(self.requests_query),
        })
    }
}

/// Run `request` through an app exposing every ShareIt route.
pub(crate) async fn send(state: HttpState, request: test::TestRequest) -> ServiceResponse {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(super::configure),
    )
    .await;
    test::call_service(&app, request.to_request()).await
}

/// Attach the caller header.
pub(crate) fn as_user(request: test::TestRequest, id: i64) -> test::TestRequest {
    request.insert_header((SHARER_HEADER, id.to_string()))
}
