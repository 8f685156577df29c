//! HTTP server configuration object.

use std::net::SocketAddr;

use actix_web::cookie::{Key, SameSite};
#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetrics;

use buddy_backend::outbound::persistence::DbPool;
use buddy_backend::wiring::Policy;

use super::settings::ClientEndpoint;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) policy: Policy,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) identity: Option<ClientEndpoint>,
    pub(crate) validator: Option<ClientEndpoint>,
    #[cfg(feature = "metrics")]
    pub(crate) prometheus: Option<PrometheusMetrics>,
}

impl ServerConfig {
    #[must_use]
    pub fn new(key: Key, cookie_secure: bool, same_site: SameSite, bind_addr: SocketAddr) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            policy: Policy::default(),
            db_pool: None,
            identity: None,
            validator: None,
            #[cfg(feature = "metrics")]
            prometheus: None,
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: Policy) -> Self {
        self.policy = policy;
        self
    }

    /// Back every repository with PostgreSQL instead of the in-memory store.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Verify identity tokens against a remote service.
    #[must_use]
    pub fn with_identity(mut self, endpoint: Option<ClientEndpoint>) -> Self {
        self.identity = endpoint;
        self
    }

    /// Validate reports with a remote classifier.
    #[must_use]
    pub fn with_validator(mut self, endpoint: Option<ClientEndpoint>) -> Self {
        self.validator = endpoint;
        self
    }

    #[cfg(feature = "metrics")]
    /// Attach Prometheus middleware; its registry also receives the
    /// moderation counters.
    #[must_use]
    pub fn with_metrics(mut self, prometheus: Option<PrometheusMetrics>) -> Self {
        self.prometheus = prometheus;
        self
    }
}
