//! Required caller identity for item, booking and request routes.

use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::{Ready, ready};

use crate::error::GatewayError;

/// Header carrying the calling user's identifier.
pub const SHARER_HEADER: &str = "X-Sharer-User-Id";

/// Calling user as declared by `X-Sharer-User-Id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sharer(pub i64);

impl Sharer {
    fn from_headers(req: &HttpRequest) -> Result<Self, GatewayError> {
        let raw = req
            .headers()
            .get(SHARER_HEADER)
            .ok_or_else(|| GatewayError::validation(format!("missing {SHARER_HEADER} header")))?;
        raw.to_str()
            .ok()
            .and_then(|text| text.trim().parse::<i64>().ok())
            .filter(|id| *id > 0)
            .map(Self)
            .ok_or_else(|| {
                GatewayError::validation(format!("{SHARER_HEADER} must be a positive integer"))
            })
    }
}

impl FromRequest for Sharer {
    type Error = GatewayError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Self::from_headers(req))
    }
}
