//! Peer-help marketplace backend.
//!
//! - **domain**: entities, lifecycle rules, services and ports
//! - **inbound**: the actix-web adapter exposing `/api/v1`
//! - **outbound**: storage, external services and metrics adapters
//! - **wiring**: composition root shared by the binary and tests

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod wiring;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
