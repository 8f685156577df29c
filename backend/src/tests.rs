//! Tests for the server bootstrap: readiness signalling and metrics setup.

use std::net::SocketAddr;

use actix_web::cookie::{Key, SameSite};
use actix_web::web;
use rstest::{fixture, rstest};

#[cfg(feature = "metrics")]
use super::{PrometheusMetricsBuilder, initialize_metrics};
use super::{HealthState, ServerConfig, create_server};

#[fixture]
fn health_state() -> web::Data<HealthState> {
    web::Data::new(HealthState::new())
}

#[fixture]
fn config() -> ServerConfig {
    ServerConfig::new(
        Key::generate(),
        false,
        SameSite::Lax,
        SocketAddr::from(([127, 0, 0, 1], 0)),
    )
}

#[cfg(feature = "metrics")]
#[test]
fn initialize_metrics_returns_none_on_error() {
    let metrics = initialize_metrics(|| -> Result<_, &str> { Err("boom") });
    assert!(metrics.is_none(), "expected metrics to be absent on error");
}

#[cfg(feature = "metrics")]
#[test]
fn initialize_metrics_returns_metrics_on_success() {
    let metrics = initialize_metrics(|| {
        PrometheusMetricsBuilder::new("buddy_test")
            .endpoint("/metrics")
            .build()
    });
    assert!(metrics.is_some(), "expected metrics to be present on success");
}

#[rstest]
#[actix_rt::test]
async fn create_server_marks_ready_over_memory_store(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) {
    assert!(!health_state.is_ready(), "state should start unready");

    let _server = create_server(health_state.clone(), config).expect("server should build");

    assert!(health_state.is_ready(), "server creation should mark readiness");
}

#[cfg(feature = "metrics")]
#[rstest]
#[actix_rt::test]
async fn create_server_marks_ready_with_metrics(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) {
    let metrics = initialize_metrics(|| {
        PrometheusMetricsBuilder::new("buddy_ready")
            .endpoint("/metrics")
            .build()
    });
    assert!(metrics.is_some());

    let _server = create_server(health_state.clone(), config.with_metrics(metrics))
        .expect("server should build with metrics");

    assert!(health_state.is_ready(), "server creation should mark readiness");
}
