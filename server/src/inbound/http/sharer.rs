//! `X-Sharer-User-Id` extractor.

use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::{Ready, ready};

use crate::domain::{Error, UserId};

/// Header carrying the calling user's identifier.
pub const SHARER_HEADER: &str = "X-Sharer-User-Id";

/// Identity of the calling user, trusted as supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sharer(pub UserId);

impl Sharer {
    fn from_request_head(req: &HttpRequest) -> Result<Self, Error> {
        let raw = req
            .headers()
            .get(SHARER_HEADER)
            .ok_or_else(|| Error::invalid_request(format!("missing {SHARER_HEADER} header")))?;
        raw.to_str()
            .ok()
            .and_then(|text| text.parse::<UserId>().ok())
            .filter(|id| id.get() > 0)
            .map(Self)
            .ok_or_else(|| {
                Error::invalid_request(format!("{SHARER_HEADER} must be a positive integer"))
            })
    }
}

impl FromRequest for Sharer {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Self::from_request_head(req))
    }
}
