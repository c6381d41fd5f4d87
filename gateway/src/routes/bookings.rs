//! `/bookings` routes.
//!
//! Listing routes resolve `state` here, case-insensitively, and forward the
//! canonical upper-case name. Unknown states fail with 400 before the server
//! is consulted.

use actix_web::{HttpResponse, get, patch, post, web};
use pagination::{DEFAULT_BOOKING_SIZE, PageQuery};
use reqwest::Method;
use serde::Deserialize;

use super::paged;
use crate::booking_state::BookingState;
use crate::error::{GatewayError, GatewayResult};
use crate::forwarder::ForwardRequest;
use crate::sharer::Sharer;
use crate::state::GatewayState;
use crate::validation::{NewBookingPayload, decode};

/// `PATCH /bookings/{id}` parameters.
#[derive(Debug, Deserialize)]
pub struct DecisionQuery {
    /// Owner's decision.
    pub approved: Option<bool>,
}

/// Booking listing parameters.
#[derive(Debug, Deserialize)]
pub struct StateQuery {
    /// Requested classification, `ALL` when absent.
    pub state: Option<String>,
    /// Row offset.
    pub from: Option<i64>,
    /// Window size, 10 when absent.
    pub size: Option<i64>,
}

#[post("/bookings")]
pub async fn create_booking(
    state: web::Data<GatewayState>,
    sharer: Sharer,
    body: web::Bytes,
) -> GatewayResult<HttpResponse> {
    decode::<NewBookingPayload>(&body)?.validate(state.now())?;
    let request = ForwardRequest::new(Method::POST, "bookings")
        .with_sharer(sharer.0)
        .with_body(body.to_vec());
    state.forward(request).await
}

#[patch("/bookings/{id}")]
pub async fn decide_booking(
    state: web::Data<GatewayState>,
    sharer: Sharer,
    path: web::Path<i64>,
    query: web::Query<DecisionQuery>,
) -> GatewayResult<HttpResponse> {
    let approved = query
        .approved
        .ok_or_else(|| GatewayError::validation("approved query parameter is required"))?;
    let id = path.into_inner();
    let request = ForwardRequest::new(Method::PATCH, format!("bookings/{id}"))
        .with_sharer(sharer.0)
        .with_query("approved", approved);
    state.forward(request).await
}

async fn list(
    state: &GatewayState,
    path: &str,
    sharer: Sharer,
    query: StateQuery,
) -> GatewayResult<HttpResponse> {
    let StateQuery {
        state: raw_state,
        from,
        size,
    } = query;
    let booking_state = BookingState::from_param(raw_state.as_deref())?;
    let request = ForwardRequest::new(Method::GET, path)
        .with_sharer(sharer.0)
        .with_query("state", booking_state);
    state
        .forward(paged(request, PageQuery { from, size }, DEFAULT_BOOKING_SIZE)?)
        .await
}

/// Bookings made by the caller.
#[get("/bookings")]
pub async fn list_booker_bookings(
    state: web::Data<GatewayState>,
    sharer: Sharer,
    query: web::Query<StateQuery>,
) -> GatewayResult<HttpResponse> {
    list(&state, "bookings", sharer, query.into_inner()).await
}

/// Bookings of items the caller owns.
#[get("/bookings/owner")]
pub async fn list_owner_bookings(
    state: web::Data<GatewayState>,
    sharer: Sharer,
    query: web::Query<StateQuery>,
) -> GatewayResult<HttpResponse> {
    list(&state, "bookings/owner", sharer, query.into_inner()).await
}

#[get("/bookings/{id}")]
pub async fn get_booking(
    state: web::Data<GatewayState>,
    sharer: Sharer,
    path: web::Path<i64>,
) -> GatewayResult<HttpResponse> {
    let id = path.into_inner();
    state
        .forward(ForwardRequest::new(Method::GET, format!("bookings/{id}")).with_sharer(sharer.0))
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test::TestRequest;
    use rstest::rstest;
    use serde_json::json;

    use crate::forwarder::MockServerForwarder;
    use crate::routes::test_utils::{as_user, error_message, reply, send, untouched};

    fn pairs(req: &ForwardRequest) -> Vec<String> {
        req.query
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect()
    }

    #[rstest]
    #[case("/bookings", "bookings", vec!["state=ALL", "from=0", "size=10"])]
    #[case("/bookings?state=future&size=3", "bookings", vec!["state=FUTURE", "from=0", "size=3"])]
    #[case("/bookings/owner?state=Waiting&from=4", "bookings/owner", vec!["state=WAITING", "from=4", "size=10"])]
    #[actix_web::test]
    async fn listings_forward_canonical_state_and_window(
        #[case] uri: &str,
        #[case] path: &'static str,
        #[case] expected: Vec<&'static str>,
    ) {
        let mut forwarder = MockServerForwarder::new();
        forwarder
            .expect_forward()
            .withf(move |req| req.path == path && req.sharer == Some(1) && pairs(req) == expected)
            .times(1)
            .returning(|_| Ok(reply(200, "[]")));
        let res = send(forwarder, as_user(TestRequest::get().uri(uri), 1)).await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[rstest]
    #[case("/bookings?state=SOMETIME", "Unknown state: SOMETIME")]
    #[case("/bookings/owner?state=unsupported", "Unknown state: unsupported")]
    #[actix_web::test]
    async fn unknown_state_is_a_bad_request(#[case] uri: &str, #[case] expected: &str) {
        let res = send(untouched(), as_user(TestRequest::get().uri(uri), 1)).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_message(res).await, expected);
    }

    #[rstest]
    #[actix_web::test]
    async fn booking_in_the_past_is_rejected() {
        let res = send(
            untouched(),
            as_user(TestRequest::post().uri("/bookings"), 2).set_json(json!({
                "itemId": 1,
                "start": "2024-05-01T10:00:00",
                "end": "2024-07-01T10:00:00"
            })),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_message(res).await, "start must not be in the past");
    }

    #[rstest]
    #[actix_web::test]
    async fn inverted_window_is_left_to_the_server() {
        let mut forwarder = MockServerForwarder::new();
        forwarder
            .expect_forward()
            .withf(|req| req.method == Method::POST && req.path == "bookings")
            .times(1)
            .returning(|_| Ok(reply(400, r#"{"error":"invalid dates"}"#)));
        let res = send(
            forwarder,
            as_user(TestRequest::post().uri("/bookings"), 2).set_json(json!({
                "itemId": 1,
                "start": "2024-07-02T10:00:00",
                "end": "2024-07-01T10:00:00"
            })),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_message(res).await, "invalid dates");
    }

    #[rstest]
    #[actix_web::test]
    async fn decision_requires_approved() {
        let res = send(untouched(), as_user(TestRequest::patch().uri("/bookings/4"), 1)).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_message(res).await, "approved query parameter is required");
    }

    #[rstest]
    #[actix_web::test]
    async fn decision_is_forwarded() {
        let mut forwarder = MockServerForwarder::new();
        forwarder
            .expect_forward()
            .withf(|req| {
                req.method == Method::PATCH
                    && req.path == "bookings/4"
                    && pairs(req) == ["approved=false"]
            })
            .times(1)
            .returning(|_| Ok(reply(200, r#"{"id":4,"status":"REJECTED"}"#)));
        let res = send(
            forwarder,
            as_user(TestRequest::patch().uri("/bookings/4?approved=false"), 1),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[rstest]
    #[actix_web::test]
    async fn owner_listing_is_not_taken_for_an_id() {
        let mut forwarder = MockServerForwarder::new();
        forwarder
            .expect_forward()
            .withf(|req| req.path == "bookings/owner")
            .times(1)
            .returning(|_| Ok(reply(200, "[]")));
        let res = send(forwarder, as_user(TestRequest::get().uri("/bookings/owner"), 1)).await;
        assert_eq!(res.status(), StatusCode::OK);
    }
}
