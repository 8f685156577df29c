//! Driving port for a member's notification inbox.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::{Error, Notification, NotificationId, Page, PageRequest, Principal};

/// One page of the inbox plus the unread total.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InboxPage {
    #[serde(flatten)]
    pub page: Page<Notification>,
    pub unread_count: u64,
}

/// Inbound contract for the addressee of notifications.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationInbox: Send + Sync {
    async fn list(
        &self,
        caller: Principal,
        unread_only: bool,
        page: PageRequest,
    ) -> Result<InboxPage, Error>;

    /// Mark one notification read; owner only.
    async fn mark_read(&self, caller: Principal, id: NotificationId) -> Result<(), Error>;

    /// Mark every notification read; returns the number changed.
    async fn mark_all_read(&self, caller: Principal) -> Result<u64, Error>;

    /// Delete one notification; owner only.
    async fn delete(&self, caller: Principal, id: NotificationId) -> Result<(), Error>;
}
