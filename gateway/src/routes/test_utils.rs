//! Mock-forwarder harness for route tests.

use std::sync::Arc;

use actix_web::dev::ServiceResponse;
use actix_web::{App, test, web};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use mockable::Clock;

use crate::forwarder::{ForwardedResponse, MockServerForwarder};
use crate::sharer::SHARER_HEADER;
use crate::state::GatewayState;

/// Clock fixed at 2024-06-01T00:00 local time.
pub(crate) struct FixedClock(DateTime<Local>);

impl Default for FixedClock {
    fn default() -> Self {
        let instant = NaiveDateTime::parse_from_str("2024-06-01T00:00", "%Y-%m-%dT%H:%M")
            .expect("fixture instant");
        Self(
            Local
                .from_local_datetime(&instant)
                .earliest()
                .expect("representable instant"),
        )
    }
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0.with_timezone(&Utc)
    }
}

/// Canned server reply.
pub(crate) fn reply(status: u16, body: &str) -> ForwardedResponse {
    ForwardedResponse {
        status,
        content_type: Some("application/json".to_owned()),
        body: body.as_bytes().to_vec(),
    }
}

/// Forwarder that fails the test if called.
pub(crate) fn untouched() -> MockServerForwarder {
    let mut forwarder = MockServerForwarder::new();
    forwarder.expect_forward().never();
    forwarder
}

/// Run `request` through the gateway routes backed by `forwarder`.
pub(crate) async fn send(
    forwarder: MockServerForwarder,
    request: test::TestRequest,
) -> ServiceResponse {
    let state = GatewayState::new(Arc::new(forwarder), Arc::new(FixedClock::default()));
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

/// Decode an error body's message.
pub(crate) async fn error_message(response: ServiceResponse) -> String {
    let body: crate::error::ErrorBody = test::read_body_json(response).await;
    body.error
}
