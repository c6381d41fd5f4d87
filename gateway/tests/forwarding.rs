//! Forwarding behaviour against a stub upstream bound to an ephemeral port.

use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

use actix_web::dev::ServiceResponse;
use actix_web::http::StatusCode;
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, test, web};
use mockable::DefaultClock;
use rstest::rstest;
use serde_json::{Value, json};
use url::Url;

use shareit_gateway::middleware::TRACE_ID_HEADER;
use shareit_gateway::routes::configure;
use shareit_gateway::sharer::SHARER_HEADER;
use shareit_gateway::{GatewayState, HttpForwarder, Trace};

/// Echo what the gateway sent, or a canned 404 for `/users/404`.
async fn echo(req: HttpRequest, body: web::Bytes) -> HttpResponse {
    if req.path() == "/users/404" {
        return HttpResponse::NotFound().json(json!({"error": "user 404 not found"}));
    }
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
    };
    HttpResponse::Created().json(json!({
        "method": req.method().as_str(),
        "path": req.path(),
        "query": req.query_string(),
        "sharer": header(SHARER_HEADER),
        "traceId": header(TRACE_ID_HEADER),
        "contentType": header("content-type"),
        "body": String::from_utf8_lossy(&body),
    }))
}

fn spawn_upstream() -> Url {
    let server = HttpServer::new(|| App::new().default_service(web::to(echo)))
        .workers(1)
        .disable_signals()
        .bind(("127.0.0.1", 0))
        .expect("bind stub upstream");
    let addr = server.addrs().first().copied().expect("bound address");
    actix_web::rt::spawn(server.run());
    Url::parse(&format!("http://{addr}")).expect("upstream url")
}

fn closed_port_url() -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").expect("reserve port");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    Url::parse(&format!("http://{addr}")).expect("closed url")
}

async fn call(base: Url, request: test::TestRequest) -> ServiceResponse {
    let forwarder = HttpForwarder::new(base, Duration::from_secs(5)).expect("client");
    let state = GatewayState::new(Arc::new(forwarder), Arc::new(DefaultClock));
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .wrap(Trace)
            .configure(configure),
    )
    .await;
    test::call_service(&app, request.to_request()).await
}

#[rstest]
#[actix_web::test]
async fn body_and_caller_reach_the_server() {
    let base = spawn_upstream();
    let res = call(
        base,
        test::TestRequest::post()
            .uri("/requests")
            .insert_header((SHARER_HEADER, "7"))
            .set_json(json!({"description": "need a ladder"})),
    )
    .await;

    assert_eq!(res.status(), StatusCode::CREATED);
    let gateway_trace = res
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
        .expect("trace id header");
    let seen: Value = test::read_body_json(res).await;
    assert_eq!(seen["method"], "POST");
    assert_eq!(seen["path"], "/requests");
    assert_eq!(seen["sharer"], "7");
    assert_eq!(seen["contentType"], "application/json");
    assert_eq!(seen["traceId"], gateway_trace.as_str());
    let body: Value =
        serde_json::from_str(seen["body"].as_str().expect("body text")).expect("json body");
    assert_eq!(body, json!({"description": "need a ladder"}));
}

#[rstest]
#[actix_web::test]
async fn booking_listing_is_normalised_before_forwarding() {
    let base = spawn_upstream();
    let res = call(
        base,
        test::TestRequest::get()
            .uri("/bookings/owner?state=past&from=20")
            .insert_header((SHARER_HEADER, "3")),
    )
    .await;

    assert_eq!(res.status(), StatusCode::CREATED);
    let seen: Value = test::read_body_json(res).await;
    assert_eq!(seen["method"], "GET");
    assert_eq!(seen["path"], "/bookings/owner");
    assert_eq!(seen["query"], "state=PAST&from=20&size=10");
}

#[rstest]
#[actix_web::test]
async fn server_errors_are_relayed_unchanged() {
    let base = spawn_upstream();
    let res = call(base, test::TestRequest::get().uri("/users/404")).await;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body, json!({"error": "user 404 not found"}));
}

#[rstest]
#[actix_web::test]
async fn unreachable_server_is_a_bad_gateway() {
    let res = call(closed_port_url(), test::TestRequest::get().uri("/users")).await;

    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    let body: Value = test::read_body_json(res).await;
    assert!(
        body["error"]
            .as_str()
            .is_some_and(|message| message.starts_with("upstream unavailable"))
    );
}
