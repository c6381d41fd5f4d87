//! ShareIt gateway: a stateless validating front for the ShareIt server.
//!
//! Requests are checked for the caller header, well-formed bodies, pagination
//! windows and booking states. Accepted calls are replayed against the server
//! and its reply is relayed unchanged.

pub mod booking_state;
pub mod error;
pub mod forwarder;
pub mod health;
pub mod middleware;
pub mod routes;
pub mod sharer;
pub mod state;
pub mod validation;

pub use error::{GatewayError, GatewayResult};
pub use forwarder::{ForwardRequest, ForwardedResponse, HttpForwarder, ServerForwarder};
pub use middleware::Trace;
pub use state::GatewayState;
