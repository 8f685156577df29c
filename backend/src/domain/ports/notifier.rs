//! Driving port for best-effort notification fan-out.
//!
//! Callers wrap every `send` in
//! [`fire_and_forget`](crate::domain::fire_and_forget); the result never
//! decides the outcome of the triggering operation.

use async_trait::async_trait;

use crate::domain::{Audience, Error, NotificationKind};

/// Inbound contract for appending notifications.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Address `kind` to `audience`; returns the number of rows written.
    ///
    /// Role audiences resolve to the role's members at send time.
    async fn send(&self, audience: Audience, kind: NotificationKind) -> Result<usize, Error>;
}
