//! Prometheus adapter for moderation counters.
//!
//! Exports:
//! - `buddy_reports_filed_total{validated="true|false"}`
//! - `buddy_members_blocked_total`

use async_trait::async_trait;
use prometheus::{IntCounter, IntCounterVec, Opts, Registry};

use crate::domain::ports::{ModerationMetrics, ModerationMetricsError};

/// Prometheus-backed moderation metrics recorder.
pub struct PrometheusModerationMetrics {
    reports_filed: IntCounterVec,
    members_blocked: IntCounter,
}

impl PrometheusModerationMetrics {
    /// Create the counters and register them with `registry`.
    ///
    /// # Errors
    ///
    /// Fails when a metric with the same name is already registered.
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let reports_filed = IntCounterVec::new(
            Opts::new("buddy_reports_filed_total", "Reports filed by validation outcome"),
            &["validated"],
        )?;
        let members_blocked = IntCounter::new(
            "buddy_members_blocked_total",
            "Members automatically blocked after crossing the warning threshold",
        )?;
        registry.register(Box::new(reports_filed.clone()))?;
        registry.register(Box::new(members_blocked.clone()))?;
        Ok(Self {
            reports_filed,
            members_blocked,
        })
    }
}

fn validated_label(validated: bool) -> &'static str {
    if validated { "true" } else { "false" }
}

#[async_trait]
impl ModerationMetrics for PrometheusModerationMetrics {
    async fn record_report_filed(&self, validated: bool) -> Result<(), ModerationMetricsError> {
        self.reports_filed
            .with_label_values(&[validated_label(validated)])
            .inc();
        Ok(())
    }

    async fn record_member_blocked(&self) -> Result<(), ModerationMetricsError> {
        self.members_blocked.inc();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_both_counters() {
        let registry = Registry::new();
        let _metrics = PrometheusModerationMetrics::new(&registry).expect("register");

        let names: Vec<String> = registry
            .gather()
            .iter()
            .map(|family| family.name().to_owned())
            .collect();

        assert!(names.iter().any(|name| name == "buddy_members_blocked_total"));
    }

    #[test]
    fn second_registration_fails() {
        let registry = Registry::new();
        let _first = PrometheusModerationMetrics::new(&registry).expect("register");
        assert!(PrometheusModerationMetrics::new(&registry).is_err());
    }

    #[tokio::test]
    async fn reports_are_split_by_validation_outcome() {
        let registry = Registry::new();
        let metrics = PrometheusModerationMetrics::new(&registry).expect("register");

        metrics.record_report_filed(true).await.expect("record");
        metrics.record_report_filed(false).await.expect("record");
        metrics.record_report_filed(false).await.expect("record");

        assert_eq!(metrics.reports_filed.with_label_values(&["true"]).get(), 1);
        assert_eq!(metrics.reports_filed.with_label_values(&["false"]).get(), 2);
    }

    #[tokio::test]
    async fn blocks_are_counted() {
        let registry = Registry::new();
        let metrics = PrometheusModerationMetrics::new(&registry).expect("register");

        metrics.record_member_blocked().await.expect("record");

        assert_eq!(metrics.members_blocked.get(), 1);
    }
}
