//! Relaying validated calls to the ShareIt server.
//!
//! The server's reply is handed back unchanged: status, content type and body.
//! Only transport failures are turned into gateway errors.

use std::time::Duration;

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use async_trait::async_trait;
use reqwest::{Client, Method, Url, header};
use tracing::debug;

use crate::error::GatewayError;
use crate::middleware::{TRACE_ID_HEADER, TraceId};
use crate::sharer::SHARER_HEADER;

/// A call to replay against the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardRequest {
    /// HTTP method.
    pub method: Method,
    /// Path relative to the server base URL, without a leading slash.
    pub path: String,
    /// Query pairs in the order they should be encoded.
    pub query: Vec<(String, String)>,
    /// Caller identity for `X-Sharer-User-Id`.
    pub sharer: Option<i64>,
    /// JSON body bytes exactly as received.
    pub body: Option<Vec<u8>>,
}

impl ForwardRequest {
    /// Start a request for `path`.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            sharer: None,
            body: None,
        }
    }

    /// Attach the caller identity.
    #[must_use]
    pub fn with_sharer(self, sharer: i64) -> Self {
        Self {
            sharer: Some(sharer),
            ..self
        }
    }

    /// Append a query pair.
    #[must_use]
    pub fn with_query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_owned(), value.to_string()));
        self
    }

    /// Attach a JSON body.
    #[must_use]
    pub fn with_body(self, body: impl Into<Vec<u8>>) -> Self {
        Self {
            body: Some(body.into()),
            ..self
        }
    }
}

/// Server reply as received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardedResponse {
    /// Status code.
    pub status: u16,
    /// `Content-Type` header, when present.
    pub content_type: Option<String>,
    /// Raw body bytes.
    pub body: Vec<u8>,
}

impl ForwardedResponse {
    /// Rebuild the reply for the gateway's client.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Upstream`] when the status code is not valid HTTP.
    pub fn into_response(self) -> Result<HttpResponse, GatewayError> {
        let status = StatusCode::from_u16(self.status)
            .map_err(|err| GatewayError::upstream(format!("invalid status from server: {err}")))?;
        let mut builder = HttpResponse::build(status);
        if let Some(content_type) = self.content_type {
            builder.content_type(content_type);
        }
        Ok(builder.body(self.body))
    }
}

/// Outbound port to the server.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ServerForwarder: Send + Sync {
    /// Replay `request` and return the server's reply.
    async fn forward(&self, request: ForwardRequest) -> Result<ForwardedResponse, GatewayError>;
}

/// Reqwest-backed [`ServerForwarder`].
pub struct HttpForwarder {
    client: Client,
    base: Url,
}

impl HttpForwarder {
    /// Build a forwarder for the server rooted at `base`.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(mut base: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base })
    }

    fn target(&self, request: &ForwardRequest) -> Result<Url, GatewayError> {
        let mut url = self
            .base
            .join(request.path.trim_start_matches('/'))
            .map_err(|err| GatewayError::upstream(format!("invalid server path: {err}")))?;
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.query);
        }
        Ok(url)
    }
}

fn map_transport_error(error: reqwest::Error) -> GatewayError {
    if error.is_timeout() {
        GatewayError::upstream(format!("server timed out: {error}"))
    } else {
        GatewayError::upstream(error.to_string())
    }
}

#[async_trait]
impl ServerForwarder for HttpForwarder {
    async fn forward(&self, request: ForwardRequest) -> Result<ForwardedResponse, GatewayError> {
        let url = self.target(&request)?;
        debug!(method = %request.method, %url, "forwarding to server");
        let mut outbound = self
            .client
            .request(request.method, url)
            .header(header::ACCEPT, "application/json");
        if let Some(sharer) = request.sharer {
            outbound = outbound.header(SHARER_HEADER, sharer.to_string());
        }
        if let Some(trace_id) = TraceId::current() {
            outbound = outbound.header(TRACE_ID_HEADER, trace_id.to_string());
        }
        if let Some(body) = request.body {
            outbound = outbound
                .header(header::CONTENT_TYPE, "application/json")
                .body(body);
        }

        let response = outbound.send().await.map_err(map_transport_error)?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let body = response.bytes().await.map_err(map_transport_error)?;
        Ok(ForwardedResponse {
            status,
            content_type,
            body: body.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use rstest::rstest;

    fn forwarder(base: &str) -> HttpForwarder {
        HttpForwarder::new(Url::parse(base).expect("url"), Duration::from_secs(1))
            .expect("client")
    }

    #[rstest]
    #[case("http://localhost:9090", "http://localhost:9090/items/search?text=drill&from=0")]
    #[case("http://localhost:9090/api", "http://localhost:9090/api/items/search?text=drill&from=0")]
    #[case("http://localhost:9090/api/", "http://localhost:9090/api/items/search?text=drill&from=0")]
    fn target_joins_under_the_base_path(#[case] base: &str, #[case] expected: &str) {
        let request = ForwardRequest::new(Method::GET, "/items/search")
            .with_query("text", "drill")
            .with_query("from", 0);
        let url = forwarder(base).target(&request).expect("target");
        assert_eq!(url.as_str(), expected);
    }

    #[rstest]
    fn target_omits_empty_query() {
        let url = forwarder("http://localhost:9090")
            .target(&ForwardRequest::new(Method::GET, "users/3"))
            .expect("target");
        assert_eq!(url.as_str(), "http://localhost:9090/users/3");
    }

    #[rstest]
    #[actix_web::test]
    async fn reply_is_relayed_unchanged() {
        let reply = ForwardedResponse {
            status: 409,
            content_type: Some("application/json".to_owned()),
            body: br#"{"error":"Email a@b.c already in use"}"#.to_vec(),
        };
        let response = reply.into_response().expect("valid status");
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(
            response
                .headers()
                .get(actix_web::http::header::CONTENT_TYPE)
                .and_then(|value| value.to_str().ok()),
            Some("application/json")
        );
        let bytes = to_bytes(response.into_body()).await.expect("body");
        assert_eq!(bytes.as_ref(), br#"{"error":"Email a@b.c already in use"}"#);
    }

    #[rstest]
    fn out_of_range_status_is_an_upstream_failure() {
        let reply = ForwardedResponse {
            status: 1000,
            content_type: None,
            body: Vec::new(),
        };
        assert!(matches!(
            reply.into_response(),
            Err(GatewayError::Upstream { .. })
        ));
    }
}
