//! `/requests` routes.

use actix_web::{HttpResponse, get, post, web};
use pagination::{DEFAULT_SIZE, PageQuery};
use reqwest::Method;

use super::paged;
use crate::error::GatewayResult;
use crate::forwarder::ForwardRequest;
use crate::sharer::Sharer;
use crate::state::GatewayState;
use crate::validation::{NewRequestPayload, decode};

#[post("/requests")]
pub async fn create_request(
    state: web::Data<GatewayState>,
    sharer: Sharer,
    body: web::Bytes,
) -> GatewayResult<HttpResponse> {
    decode::<NewRequestPayload>(&body)?.validate()?;
    let request = ForwardRequest::new(Method::POST, "requests")
        .with_sharer(sharer.0)
        .with_body(body.to_vec());
    state.forward(request).await
}

/// The caller's own requests; not paginated.
#[get("/requests")]
pub async fn list_own_requests(
    state: web::Data<GatewayState>,
    sharer: Sharer,
) -> GatewayResult<HttpResponse> {
    state
        .forward(ForwardRequest::new(Method::GET, "requests").with_sharer(sharer.0))
        .await
}

/// Requests published by other users.
#[get("/requests/all")]
pub async fn list_other_requests(
    state: web::Data<GatewayState>,
    sharer: Sharer,
    query: web::Query<PageQuery>,
) -> GatewayResult<HttpResponse> {
    let request = ForwardRequest::new(Method::GET, "requests/all").with_sharer(sharer.0);
    state
        .forward(paged(request, query.into_inner(), DEFAULT_SIZE)?)
        .await
}

#[get("/requests/{id}")]
pub async fn get_request(
    state: web::Data<GatewayState>,
    sharer: Sharer,
    path: web::Path<i64>,
) -> GatewayResult<HttpResponse> {
    let id = path.into_inner();
    state
        .forward(ForwardRequest::new(Method::GET, format!("requests/{id}")).with_sharer(sharer.0))
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

    #[rstest]
    #[actix_web::test]
    async fn blank_description_is_rejected() {
        let res = send(
            untouched(),
            as_user(TestRequest::post().uri("/requests"), 1).set_json(json!({"description": "  "})),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_message(res).await, "description must not be blank");
    }

    #[rstest]
    #[actix_web::test]
    async fn other_requests_use_the_item_window() {
        let mut forwarder = MockServerForwarder::new();
        forwarder
            .expect_forward()
            .withf(|req| {
                req.path == "requests/all"
                    && req.query
                        == [
                            ("from".to_owned(), "0".to_owned()),
                            ("size".to_owned(), "20".to_owned()),
                        ]
            })
            .times(1)
            .returning(|_| Ok(reply(200, "[]")));
        let res = send(forwarder, as_user(TestRequest::get().uri("/requests/all"), 3)).await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[rstest]
    #[actix_web::test]
    async fn own_requests_need_a_caller() {
        let res = send(
            untouched(),
            TestRequest::get()
                .uri("/requests")
                .insert_header(("X-Sharer-User-Id", "-2")),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            error_message(res).await,
            "X-Sharer-User-Id must be a positive integer"
        );
    }
}
