//! Application settings loaded via OrthoConfig.
//!
//! Values come from `BUDDY_*` environment variables, command-line flags or a
//! configuration file. Every field is optional; accessors supply defaults.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use buddy_backend::domain::{
    BlockThreshold, DEFAULT_AT_RISK_THRESHOLD, DEFAULT_BLOCK_THRESHOLD, ExpiryHours,
};
use buddy_backend::wiring::Policy;

const DEFAULT_BIND_ADDR: ([u8; 4], u16) = ([0, 0, 0, 0], 8080);
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_CLIENT_TIMEOUT_MS: u64 = 2_000;

/// Raised when a configured value cannot be used.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid {name}: {message}")]
    Invalid { name: &'static str, message: String },
}

/// Endpoint and timeout for an outbound HTTP collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientEndpoint {
    pub url: Url,
    pub timeout: Duration,
}

/// Process-wide settings for the marketplace server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "BUDDY")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<SocketAddr>,
    /// PostgreSQL URL. Without one the in-memory store is used.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub db_max_connections: Option<u32>,
    /// Warnings at which a member is blocked.
    pub block_threshold: Option<u32>,
    /// Warnings at which a member is listed as at risk.
    pub at_risk_threshold: Option<u32>,
    /// Lifetime given to requests that do not ask for one.
    pub default_expiry_hours: Option<u32>,
    /// Report validation service.
    pub validator_url: Option<String>,
    pub validator_timeout_ms: Option<u64>,
    /// Identity verification service.
    pub identity_url: Option<String>,
    pub identity_timeout_ms: Option<u64>,
}

impl AppSettings {
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
            .unwrap_or_else(|| SocketAddr::from(DEFAULT_BIND_ADDR))
    }

    pub fn database_url(&self) -> Option<&str> {
        self.database_url.as_deref().filter(|url| !url.trim().is_empty())
    }

    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections.unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
    }

    /// Marketplace rules derived from the thresholds and expiry default.
    ///
    /// # Errors
    ///
    /// Fails when the default expiry is outside the accepted range.
    pub fn policy(&self) -> Result<Policy, SettingsError> {
        let default_expiry = match self.default_expiry_hours {
            Some(hours) => ExpiryHours::new(hours).map_err(|err| SettingsError::Invalid {
                name: "default_expiry_hours",
                message: err.to_string(),
            })?,
            None => ExpiryHours::default(),
        };
        Ok(Policy {
            block_threshold: BlockThreshold::new(
                self.block_threshold.unwrap_or(DEFAULT_BLOCK_THRESHOLD),
            ),
            at_risk_threshold: self.at_risk_threshold.unwrap_or(DEFAULT_AT_RISK_THRESHOLD),
            default_expiry,
        })
    }

    /// Report validation endpoint, when configured.
    pub fn validator(&self) -> Result<Option<ClientEndpoint>, SettingsError> {
        endpoint(
            "validator_url",
            self.validator_url.as_deref(),
            self.validator_timeout_ms,
        )
    }

    /// Identity verification endpoint, when configured.
    pub fn identity(&self) -> Result<Option<ClientEndpoint>, SettingsError> {
        endpoint(
            "identity_url",
            self.identity_url.as_deref(),
            self.identity_timeout_ms,
        )
    }
}

fn endpoint(
    name: &'static str,
    raw: Option<&str>,
    timeout_ms: Option<u64>,
) -> Result<Option<ClientEndpoint>, SettingsError> {
    let Some(raw) = raw.filter(|value| !value.trim().is_empty()) else {
        return Ok(None);
    };
    let url = Url::parse(raw).map_err(|err| SettingsError::Invalid {
        name,
        message: err.to_string(),
    })?;
    Ok(Some(ClientEndpoint {
        url,
        timeout: Duration::from_millis(timeout_ms.unwrap_or(DEFAULT_CLIENT_TIMEOUT_MS)),
    }))
}

#[cfg(test)]
mod tests {
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    use super::*;

    const VARS: [&str; 10] = [
        "BUDDY_BIND_ADDR",
        "BUDDY_DATABASE_URL",
        "BUDDY_DB_MAX_CONNECTIONS",
        "BUDDY_BLOCK_THRESHOLD",
        "BUDDY_AT_RISK_THRESHOLD",
        "BUDDY_DEFAULT_EXPIRY_HOURS",
        "BUDDY_VALIDATOR_URL",
        "BUDDY_VALIDATOR_TIMEOUT_MS",
        "BUDDY_IDENTITY_URL",
        "BUDDY_IDENTITY_TIMEOUT_MS",
    ];

    fn env_with(overrides: &[(&str, &str)]) -> Vec<(&'static str, Option<String>)> {
        VARS.iter()
            .map(|name| {
                let value = overrides
                    .iter()
                    .find(|(key, _)| key == name)
                    .map(|(_, value)| (*value).to_owned());
                (*name, value)
            })
            .collect()
    }

    fn load() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("buddy-backend")])
            .expect("settings should load")
    }

    #[rstest]
    fn defaults_apply_when_nothing_is_set() {
        let _guard = lock_env(env_with(&[]));

        let settings = load();
        let policy = settings.policy().expect("default policy");

        assert_eq!(settings.bind_addr(), SocketAddr::from(DEFAULT_BIND_ADDR));
        assert!(settings.database_url().is_none());
        assert_eq!(settings.db_max_connections(), DEFAULT_DB_MAX_CONNECTIONS);
        assert_eq!(policy, Policy::default());
        assert_eq!(settings.validator().expect("no validator"), None);
        assert_eq!(settings.identity().expect("no verifier"), None);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env(env_with(&[
            ("BUDDY_BIND_ADDR", "127.0.0.1:9090"),
            ("BUDDY_DATABASE_URL", "postgres://localhost/buddy"),
            ("BUDDY_BLOCK_THRESHOLD", "3"),
            ("BUDDY_AT_RISK_THRESHOLD", "2"),
            ("BUDDY_DEFAULT_EXPIRY_HOURS", "48"),
            ("BUDDY_VALIDATOR_URL", "http://validator.internal/validate"),
            ("BUDDY_VALIDATOR_TIMEOUT_MS", "500"),
        ]));

        let settings = load();
        let policy = settings.policy().expect("policy");
        let validator = settings
            .validator()
            .expect("valid url")
            .expect("validator configured");

        assert_eq!(settings.bind_addr().port(), 9090);
        assert_eq!(settings.database_url(), Some("postgres://localhost/buddy"));
        assert_eq!(policy.block_threshold.get(), 3);
        assert_eq!(policy.at_risk_threshold, 2);
        assert_eq!(policy.default_expiry.get(), 48);
        assert_eq!(validator.timeout, Duration::from_millis(500));
    }

    #[rstest]
    #[case("0")]
    #[case("500")]
    fn out_of_range_default_expiry_is_rejected(#[case] hours: &str) {
        let _guard = lock_env(env_with(&[("BUDDY_DEFAULT_EXPIRY_HOURS", hours)]));

        let err = load().policy().expect_err("expiry out of range");
        assert!(matches!(
            err,
            SettingsError::Invalid {
                name: "default_expiry_hours",
                ..
            }
        ));
    }

    #[rstest]
    fn malformed_identity_url_is_rejected() {
        let _guard = lock_env(env_with(&[("BUDDY_IDENTITY_URL", "not a url")]));

        assert!(load().identity().is_err());
    }
}
