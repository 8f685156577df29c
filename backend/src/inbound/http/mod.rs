//! HTTP inbound adapter exposing REST endpoints.

pub mod admin;
pub mod chats;
pub mod envelope;
pub mod error;
pub mod health;
pub mod members;
pub mod notifications;
pub mod params;
pub mod reports;
pub mod requests;
pub mod responses;
pub mod routes;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod sessions;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;

pub use error::ApiResult;
