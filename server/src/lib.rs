//! ShareIt server library.
//!
//! Hexagonal layout: [`domain`] holds entities, errors, services and ports;
//! [`inbound::http`] exposes the REST routes; [`outbound::persistence`]
//! implements the repositories over PostgreSQL or in process.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
