//! Shared handler state: the outbound port and the wall clock.

use std::sync::Arc;

use actix_web::HttpResponse;
use chrono::NaiveDateTime;
use mockable::Clock;

use crate::error::GatewayResult;
use crate::forwarder::{ForwardRequest, ServerForwarder};

/// Dependencies injected into every gateway handler.
#[derive(Clone)]
pub struct GatewayState {
    forwarder: Arc<dyn ServerForwarder>,
    clock: Arc<dyn Clock>,
}

impl GatewayState {
    /// Bundle the forwarder and clock.
    pub fn new(forwarder: Arc<dyn ServerForwarder>, clock: Arc<dyn Clock>) -> Self {
        Self { forwarder, clock }
    }

    /// Local wall-clock time used for booking date checks.
    #[must_use]
    pub fn now(&self) -> NaiveDateTime {
        self.clock.local().naive_local()
    }

    /// Replay `request` against the server and relay its reply.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Upstream`](crate::error::GatewayError::Upstream)
    /// when the server cannot be reached.
    pub async fn forward(&self, request: ForwardRequest) -> GatewayResult<HttpResponse> {
        self.forwarder.forward(request).await?.into_response()
    }
}
