//! HTTP mapping for domain errors.
//!
//! Every failure leaves the server as `{"error": "<message>"}`. Internal
//! failures are logged with their details and redacted before rendering.

use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError};
use actix_web::{HttpRequest, HttpResponse, ResponseError, http::StatusCode, web};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};
use utoipa::ToSchema;

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

/// Wire shape of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// Human-readable message.
    pub error: String,
}

const fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::UnsupportedState | ErrorCode::InternalError => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn rendered_message(error: &Error) -> String {
    match error.code() {
        ErrorCode::InternalError => {
            error!(
                trace_id = error.trace_id(),
                message = error.message(),
                details = ?error.details(),
                "internal error"
            );
            "Internal server error".to_owned()
        }
        ErrorCode::ServiceUnavailable => {
            warn!(trace_id = error.trace_id(), message = error.message(), "store unavailable");
            error.message().to_owned()
        }
        _ => error.message().to_owned(),
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        builder.json(ErrorBody {
            error: rendered_message(self),
        })
    }
}

/// JSON body extractor configuration rejecting malformed payloads with 400.
#[must_use]
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err: JsonPayloadError, _req: &HttpRequest| {
        Error::invalid_request(format!("malformed request body: {err}")).into()
    })
}

/// Query-string extractor configuration rejecting malformed parameters with 400.
#[must_use]
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err: QueryPayloadError, _req: &HttpRequest| {
        Error::invalid_request(format!("malformed query string: {err}")).into()
    })
}

/// Path extractor configuration rejecting non-numeric identifiers with 400.
#[must_use]
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err: PathError, _req: &HttpRequest| {
        Error::invalid_request(format!("malformed path: {err}")).into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use rstest::rstest;
    use serde_json::json;

    async fn body_of(error: &Error) -> ErrorBody {
        let bytes = to_bytes(error.error_response().into_body())
            .await
            .expect("body");
        serde_json::from_slice(&bytes).expect("error body")
    }

    #[rstest]
    #[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
    #[case(Error::not_found("missing"), StatusCode::NOT_FOUND)]
    #[case(Error::conflict("Email a@b.c already in use"), StatusCode::CONFLICT)]
    #[case(Error::unsupported_state("SOMETIME"), StatusCode::INTERNAL_SERVER_ERROR)]
    #[case(Error::service_unavailable("down"), StatusCode::SERVICE_UNAVAILABLE)]
    #[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
    fn status_code_matches_error_code(#[case] error: Error, #[case] expected: StatusCode) {
        assert_eq!(ResponseError::status_code(&error), expected);
    }

    #[rstest]
    #[actix_web::test]
    async fn internal_errors_are_redacted() {
        let error = Error::internal("pool exhausted").with_details(json!({"secret": "x"}));
        assert_eq!(body_of(&error).await.error, "Internal server error");
    }

    #[rstest]
    #[actix_web::test]
    async fn unsupported_state_keeps_its_message() {
        let body = body_of(&Error::unsupported_state("SOMETIME")).await;
        assert_eq!(body.error, "Unknown state: SOMETIME");
    }

    #[rstest]
    fn trace_id_is_echoed_as_header() {
        let error = Error::not_found("gone").with_trace_id("abc");
        let response = error.error_response();
        assert_eq!(
            response
                .headers()
                .get(TRACE_ID_HEADER)
                .and_then(|value| value.to_str().ok()),
            Some("abc")
        );
    }
}
