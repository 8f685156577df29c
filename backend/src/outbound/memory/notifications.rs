//! Notification storage.

use async_trait::async_trait;

use super::{MemoryStore, newest_first};
use crate::domain::ports::{NotificationRepository, NotificationRepositoryError};
use crate::domain::{MemberId, Notification, NotificationId, Page, PageRequest};

fn poisoned(err: super::StorePoisoned) -> NotificationRepositoryError {
    NotificationRepositoryError::query(err.to_string())
}

#[async_trait]
impl NotificationRepository for MemoryStore {
    async fn insert_many(
        &self,
        notifications: &[Notification],
    ) -> Result<(), NotificationRepositoryError> {
        let mut state = self.lock().map_err(poisoned)?;
        for notification in notifications {
            state
                .notifications
                .insert(notification.id, notification.clone());
        }
        Ok(())
    }

    async fn find(
        &self,
        id: NotificationId,
    ) -> Result<Option<Notification>, NotificationRepositoryError> {
        let state = self.lock().map_err(poisoned)?;
        Ok(state.notifications.get(&id).cloned())
    }

    async fn list_for(
        &self,
        recipient: MemberId,
        unread_only: bool,
        page: PageRequest,
    ) -> Result<Page<Notification>, NotificationRepositoryError> {
        let state = self.lock().map_err(poisoned)?;
        let mut found: Vec<Notification> = state
            .notifications
            .values()
            .filter(|n| n.recipient == recipient && !(unread_only && n.is_read))
            .cloned()
            .collect();
        newest_first(&mut found, |n| (n.created_at, n.id));
        Ok(Page::from_ordered(found, page))
    }

    async fn count_unread(&self, recipient: MemberId) -> Result<u64, NotificationRepositoryError> {
        let state = self.lock().map_err(poisoned)?;
        let unread = state
            .notifications
            .values()
            .filter(|n| n.recipient == recipient && !n.is_read)
            .count();
        Ok(unread as u64)
    }

    async fn mark_read(&self, id: NotificationId) -> Result<(), NotificationRepositoryError> {
        let mut state = self.lock().map_err(poisoned)?;
        if let Some(notification) = state.notifications.get_mut(&id) {
            notification.is_read = true;
        }
        Ok(())
    }

    async fn mark_all_read(&self, recipient: MemberId) -> Result<u64, NotificationRepositoryError> {
        let mut state = self.lock().map_err(poisoned)?;
        let mut changed = 0_u64;
        for notification in state
            .notifications
            .values_mut()
            .filter(|n| n.recipient == recipient && !n.is_read)
        {
            notification.is_read = true;
            changed += 1;
        }
        Ok(changed)
    }

    async fn delete(&self, id: NotificationId) -> Result<(), NotificationRepositoryError> {
        let mut state = self.lock().map_err(poisoned)?;
        state.notifications.remove(&id);
        Ok(())
    }
}
