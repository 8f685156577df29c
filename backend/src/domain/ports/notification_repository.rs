//! Port for notification persistence.

use async_trait::async_trait;

use crate::domain::{MemberId, Notification, NotificationId, Page, PageRequest};

use super::define_port_error;

define_port_error! {
    /// Errors raised by notification repository adapters.
    pub enum NotificationRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "notification repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "notification repository query failed: {message}",
    }
}

/// Port for notification storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Append notifications in one batch.
    async fn insert_many(
        &self,
        notifications: &[Notification],
    ) -> Result<(), NotificationRepositoryError>;

    /// Fetch a notification by id.
    async fn find(
        &self,
        id: NotificationId,
    ) -> Result<Option<Notification>, NotificationRepositoryError>;

    /// Notifications for `recipient`, newest first.
    async fn list_for(
        &self,
        recipient: MemberId,
        unread_only: bool,
        page: PageRequest,
    ) -> Result<Page<Notification>, NotificationRepositoryError>;

    /// Number of unread notifications for `recipient`.
    async fn count_unread(&self, recipient: MemberId) -> Result<u64, NotificationRepositoryError>;

    /// Mark one notification read.
    async fn mark_read(&self, id: NotificationId) -> Result<(), NotificationRepositoryError>;

    /// Mark every notification of `recipient` read; returns the number changed.
    async fn mark_all_read(&self, recipient: MemberId) -> Result<u64, NotificationRepositoryError>;

    /// Remove one notification.
    async fn delete(&self, id: NotificationId) -> Result<(), NotificationRepositoryError>;
}
