//! Gateway failures and their HTTP rendering.
//!
//! Errors produced by the gateway itself use the same `{"error": "<message>"}`
//! body as the server. Responses relayed from the server are never wrapped.

use actix_web::error::{PathError, QueryPayloadError};
use actix_web::{HttpRequest, HttpResponse, ResponseError, http::StatusCode, web};
use pagination::PaginationError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Result alias for gateway handlers.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Wire shape of every gateway-generated error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable message.
    pub error: String,
}

/// Failures raised before or while forwarding a call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// A header, parameter or body field failed validation.
    #[error("{message}")]
    Validation {
        /// Message naming the offending field.
        message: String,
    },
    /// The `state` query parameter is not a known booking state.
    #[error("Unknown state: {state}")]
    UnsupportedState {
        /// Text as supplied by the client.
        state: String,
    },
    /// The server could not be reached or its reply could not be read.
    #[error("upstream unavailable: {message}")]
    Upstream {
        /// Transport failure description.
        message: String,
    },
}

impl GatewayError {
    /// Build a validation failure.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Build an unknown-state failure.
    pub fn unsupported_state(state: impl Into<String>) -> Self {
        Self::UnsupportedState {
            state: state.into(),
        }
    }

    /// Build an upstream transport failure.
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream {
            message: message.into(),
        }
    }
}

impl From<PaginationError> for GatewayError {
    fn from(value: PaginationError) -> Self {
        Self::validation(value.to_string())
    }
}

impl ResponseError for GatewayError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } | Self::UnsupportedState { .. } => StatusCode::BAD_REQUEST,
            Self::Upstream { .. } => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let Self::Upstream { message } = self {
            warn!(%message, "server call failed");
        }
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
        })
    }
}

/// Query-string extractor configuration rejecting malformed parameters with 400.
#[must_use]
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err: QueryPayloadError, _req: &HttpRequest| {
        GatewayError::validation(format!("malformed query string: {err}")).into()
    })
}

/// Path extractor configuration rejecting non-numeric identifiers with 400.
#[must_use]
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err: PathError, _req: &HttpRequest| {
        GatewayError::validation(format!("malformed path: {err}")).into()
    })
}
