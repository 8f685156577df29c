//! Outbound adapters implementing the driven ports.
//!
//! - **memory**: process-local store used by tests and database-less runs
//! - **persistence**: PostgreSQL repositories using Diesel
//! - **http_report_validator** / **http_identity_verifier**: reqwest clients
//!   for the external classifier and identity service
//! - **metrics**: Prometheus exporters (feature-gated)
//!
//! Adapters translate between domain types and infrastructure types; they
//! hold no business rules.

pub mod http_identity_verifier;
pub mod http_report_validator;
mod http_support;
pub mod memory;
#[cfg(feature = "metrics")]
pub mod metrics;
pub mod persistence;
