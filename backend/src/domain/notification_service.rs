//! Notifier fan-out and the addressee's inbox.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::debug;

use super::service_support::{map_member_error, map_notification_error};
use super::ports::{
    InboxPage, MemberRepository, NotificationInbox, NotificationRepository, Notifier,
};
use super::{Audience, Error, Notification, NotificationId, NotificationKind, PageRequest, Principal};

/// Appends notification rows for members or whole roles.
#[derive(Clone)]
pub struct NotifierService<M, N> {
    members: Arc<M>,
    notifications: Arc<N>,
    clock: Arc<dyn Clock>,
}

impl<M, N> NotifierService<M, N> {
    /// Create a notifier that resolves role audiences through `members`.
    pub fn new(members: Arc<M>, notifications: Arc<N>, clock: Arc<dyn Clock>) -> Self {
        Self {
            members,
            notifications,
            clock,
        }
    }
}

#[async_trait]
impl<M, N> Notifier for NotifierService<M, N>
where
    M: MemberRepository,
    N: NotificationRepository,
{
    async fn send(&self, audience: Audience, kind: NotificationKind) -> Result<usize, Error> {
        let recipients = match audience {
            Audience::Member(id) => vec![id],
            Audience::Role(role) => self
                .members
                .list_ids_by_role(role)
                .await
                .map_err(map_member_error)?,
        };
        if recipients.is_empty() {
            debug!(kind = kind.type_name(), "no recipients for notification");
            return Ok(0);
        }

        let now = self.clock.utc();
        let batch: Vec<Notification> = recipients
            .into_iter()
            .map(|recipient| Notification::new(recipient, kind.clone(), now))
            .collect();
        self.notifications
            .insert_many(&batch)
            .await
            .map_err(map_notification_error)?;
        debug!(kind = kind.type_name(), count = batch.len(), "notifications appended");
        Ok(batch.len())
    }
}

/// Inbox operations restricted to the addressee.
#[derive(Clone)]
pub struct NotificationInboxService<N> {
    notifications: Arc<N>,
}

impl<N> NotificationInboxService<N> {
    /// Create an inbox service over the notification repository.
    pub fn new(notifications: Arc<N>) -> Self {
        Self { notifications }
    }
}

impl<N> NotificationInboxService<N>
where
    N: NotificationRepository,
{
    async fn owned(&self, caller: Principal, id: NotificationId) -> Result<Notification, Error> {
        let notification = self
            .notifications
            .find(id)
            .await
            .map_err(map_notification_error)?
            .ok_or_else(|| Error::not_found(format!("notification {id} not found")))?;
        if notification.recipient != caller.member_id {
            return Err(Error::forbidden("notification belongs to another member"));
        }
        Ok(notification)
    }
}

#[async_trait]
impl<N> NotificationInbox for NotificationInboxService<N>
where
    N: NotificationRepository,
{
    async fn list(
        &self,
        caller: Principal,
        unread_only: bool,
        page: PageRequest,
    ) -> Result<InboxPage, Error> {
        let page = self
            .notifications
            .list_for(caller.member_id, unread_only, page)
            .await
            .map_err(map_notification_error)?;
        let unread_count = self
            .notifications
            .count_unread(caller.member_id)
            .await
            .map_err(map_notification_error)?;
        Ok(InboxPage { page, unread_count })
    }

    async fn mark_read(&self, caller: Principal, id: NotificationId) -> Result<(), Error> {
        let notification = self.owned(caller, id).await?;
        if notification.is_read {
            return Ok(());
        }
        self.notifications
            .mark_read(id)
            .await
            .map_err(map_notification_error)
    }

    async fn mark_all_read(&self, caller: Principal) -> Result<u64, Error> {
        self.notifications
            .mark_all_read(caller.member_id)
            .await
            .map_err(map_notification_error)
    }

    async fn delete(&self, caller: Principal, id: NotificationId) -> Result<(), Error> {
        self.owned(caller, id).await?;
        self.notifications
            .delete(id)
            .await
            .map_err(map_notification_error)
    }
}

#[cfg(test)]
#[path = "notification_service_tests.rs"]
mod tests;
