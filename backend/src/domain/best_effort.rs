//! Fire-and-forget boundary for side effects.
//!
//! Notifications and counters attached to a primary transition run through
//! [`fire_and_forget`] after the transition commits. A failure is logged and
//! reported as [`SideEffectOutcome::Failed`]; it never reaches the caller of
//! the primary operation.

use std::fmt::Display;
use std::future::Future;

use tracing::{debug, warn};

/// Side effects that may run outside the critical path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideEffect {
    NotifyMember,
    NotifyRole,
    IncrementHelpCount,
    RecordMetric,
}

impl SideEffect {
    /// Label used in logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotifyMember => "notify_member",
            Self::NotifyRole => "notify_role",
            Self::IncrementHelpCount => "increment_help_count",
            Self::RecordMetric => "record_metric",
        }
    }
}

/// Result of a fire-and-forget attempt. Callers may discard it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideEffectOutcome {
    Applied,
    Failed,
}

/// Run `effect`, logging and swallowing any error.
pub async fn fire_and_forget<Fut, T, E>(effect: SideEffect, fut: Fut) -> SideEffectOutcome
where
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    match fut.await {
        Ok(_) => {
            debug!(effect = effect.as_str(), "side effect applied");
            SideEffectOutcome::Applied
        }
        Err(error) => {
            warn!(effect = effect.as_str(), error = %error, "side effect failed; continuing");
            SideEffectOutcome::Failed
        }
    }
}
