//! Port for moderation counters.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised when recording moderation metrics.
    pub enum ModerationMetricsError {
        /// Metrics exporter rejected the sample.
        Export { message: String } =>
            "moderation metrics export failed: {message}",
    }
}

/// Port for moderation counters.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModerationMetrics: Send + Sync {
    /// Count one filed report, labelled by its validation outcome.
    async fn record_report_filed(&self, validated: bool) -> Result<(), ModerationMetricsError>;

    /// Count one automatic block.
    async fn record_member_blocked(&self) -> Result<(), ModerationMetricsError>;
}

/// Metrics adapter that discards every sample.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpModerationMetrics;

#[async_trait]
impl ModerationMetrics for NoOpModerationMetrics {
    async fn record_report_filed(&self, _validated: bool) -> Result<(), ModerationMetricsError> {
        Ok(())
    }

    async fn record_member_blocked(&self) -> Result<(), ModerationMetricsError> {
        Ok(())
    }
}
