//! Builders choosing the adapters behind each port.
//!
//! A configured pool selects the Diesel repositories; otherwise one
//! in-memory store backs every port. Remote collaborators are used when an
//! endpoint is configured and fall back to local implementations.

use std::io;
use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;
use tracing::{info, warn};

use buddy_backend::domain::ports::{
    FixtureIdentityVerifier, HeuristicReportValidator, IdentityVerifier, ModerationMetrics,
    NoOpModerationMetrics, ReportValidator,
};
use buddy_backend::inbound::http::state::HttpState;
use buddy_backend::outbound::http_identity_verifier::HttpIdentityVerifier;
use buddy_backend::outbound::http_report_validator::HttpReportValidator;
use buddy_backend::outbound::memory::MemoryStore;
#[cfg(feature = "metrics")]
use buddy_backend::outbound::metrics::PrometheusModerationMetrics;
use buddy_backend::outbound::persistence::{
    DbPool, DieselChatRepository, DieselMemberRepository, DieselNotificationRepository,
    DieselReportRepository, DieselRequestRepository, DieselResponseRepository,
};
use buddy_backend::wiring::{Collaborators, Repositories, build_http_state as wire};

use super::ServerConfig;

fn build_verifier(config: &ServerConfig) -> io::Result<Arc<dyn IdentityVerifier>> {
    match &config.identity {
        Some(endpoint) => {
            let verifier = HttpIdentityVerifier::new(endpoint.url.clone(), endpoint.timeout)
                .map_err(|err| io::Error::other(format!("identity client: {err}")))?;
            info!(url = %endpoint.url, "verifying identities remotely");
            Ok(Arc::new(verifier))
        }
        None if cfg!(debug_assertions) => {
            warn!("no identity service configured; accepting fixture tokens");
            Ok(Arc::new(FixtureIdentityVerifier))
        }
        None => Err(io::Error::other(
            "identity_url must be configured in release builds",
        )),
    }
}

fn build_validator(config: &ServerConfig) -> io::Result<Arc<dyn ReportValidator>> {
    match &config.validator {
        Some(endpoint) => {
            let validator = HttpReportValidator::new(endpoint.url.clone(), endpoint.timeout)
                .map_err(|err| io::Error::other(format!("validator client: {err}")))?;
            info!(url = %endpoint.url, "validating reports remotely");
            Ok(Arc::new(validator))
        }
        None => Ok(Arc::new(HeuristicReportValidator)),
    }
}

#[cfg(feature = "metrics")]
fn build_metrics(config: &ServerConfig) -> io::Result<Arc<dyn ModerationMetrics>> {
    match &config.prometheus {
        Some(prom) => {
            let metrics = PrometheusModerationMetrics::new(&prom.registry).map_err(|err| {
                io::Error::other(format!("moderation metrics registration failed: {err}"))
            })?;
            Ok(Arc::new(metrics))
        }
        None => Ok(Arc::new(NoOpModerationMetrics)),
    }
}

#[cfg(not(feature = "metrics"))]
fn build_metrics(_config: &ServerConfig) -> io::Result<Arc<dyn ModerationMetrics>> {
    Ok(Arc::new(NoOpModerationMetrics))
}

fn diesel_repositories(
    pool: &DbPool,
) -> Repositories<
    DieselMemberRepository,
    DieselRequestRepository,
    DieselResponseRepository,
    DieselChatRepository,
    DieselReportRepository,
    DieselNotificationRepository,
> {
    Repositories {
        members: Arc::new(DieselMemberRepository::new(pool.clone())),
        requests: Arc::new(DieselRequestRepository::new(pool.clone())),
        responses: Arc::new(DieselResponseRepository::new(pool.clone())),
        chats: Arc::new(DieselChatRepository::new(pool.clone())),
        reports: Arc::new(DieselReportRepository::new(pool.clone())),
        notifications: Arc::new(DieselNotificationRepository::new(pool.clone())),
    }
}

/// Build the shared HTTP state for `config`.
pub(super) fn build_http_state(config: &ServerConfig) -> io::Result<web::Data<HttpState>> {
    let collaborators = Collaborators {
        verifier: build_verifier(config)?,
        validator: build_validator(config)?,
        metrics: build_metrics(config)?,
        clock: Arc::new(DefaultClock),
    };

    let state = match &config.db_pool {
        Some(pool) => wire(diesel_repositories(pool), collaborators, config.policy),
        None => {
            warn!("no database configured; state lives in memory and is lost on restart");
            wire(
                Repositories::shared(Arc::new(MemoryStore::new())),
                collaborators,
                config.policy,
            )
        }
    };
    Ok(web::Data::new(state))
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use actix_web::cookie::{Key, SameSite};
    use rstest::rstest;

    use super::*;
    use crate::server::settings::ClientEndpoint;

    fn config() -> ServerConfig {
        ServerConfig::new(
            Key::generate(),
            false,
            SameSite::Lax,
            SocketAddr::from(([127, 0, 0, 1], 0)),
        )
    }

    #[rstest]
    fn memory_state_builds_without_collaborators() {
        assert!(build_http_state(&config()).is_ok());
    }

    #[rstest]
    fn remote_collaborators_build_from_endpoints() {
        let endpoint = ClientEndpoint {
            url: url::Url::parse("http://127.0.0.1:9/verify").expect("url"),
            timeout: std::time::Duration::from_millis(100),
        };
        let config = config()
            .with_identity(Some(endpoint.clone()))
            .with_validator(Some(endpoint));

        assert!(build_http_state(&config).is_ok());
    }
}
