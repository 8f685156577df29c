//! Prometheus exporters for the metrics ports. Compiled with the `metrics`
//! feature.

mod prometheus_moderation;

pub use prometheus_moderation::PrometheusModerationMetrics;
