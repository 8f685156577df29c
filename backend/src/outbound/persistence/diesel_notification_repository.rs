//! PostgreSQL-backed `NotificationRepository`.
//!
//! Payloads are stored as tagged JSON next to a plain `notification_type`
//! column used for filtering and inspection.

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{NotificationRepository, NotificationRepositoryError};
use crate::domain::{MemberId, Notification, NotificationId, Page, PageRequest};

use super::error_mapping::{Failure, classify, decode_failure, impl_from_failure, pool_failure};
use super::models::NotificationRow;
use super::paging::{total, window};
use super::pool::DbPool;
use super::schema::notifications;

impl_from_failure!(NotificationRepositoryError);

/// Diesel implementation of the notification repository port.
#[derive(Clone)]
pub struct DieselNotificationRepository {
    pool: DbPool,
}

impl DieselNotificationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn decode(row: NotificationRow) -> Result<Notification, Failure> {
    Notification::try_from(row).map_err(decode_failure)
}

#[async_trait]
impl NotificationRepository for DieselNotificationRepository {
    async fn insert_many(
        &self,
        batch: &[Notification],
    ) -> Result<(), NotificationRepositoryError> {
        if batch.is_empty() {
            return Ok(());
        }
        let rows = batch
            .iter()
            .map(NotificationRow::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(decode_failure)?;
        let mut conn = self.pool.get().await.map_err(pool_failure)?;
        diesel::insert_into(notifications::table)
            .values(&rows)
            .execute(&mut conn)
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn find(
        &self,
        id: NotificationId,
    ) -> Result<Option<Notification>, NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_failure)?;
        let row = notifications::table
            .find(*id.as_uuid())
            .select(NotificationRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(classify)?;
        Ok(row.map(decode).transpose()?)
    }

    async fn list_for(
        &self,
        recipient: MemberId,
        unread_only: bool,
        page: PageRequest,
    ) -> Result<Page<Notification>, NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_failure)?;
        let recipient = *recipient.as_uuid();
        let (limit, offset) = window(page);
        let inbox = || -> notifications::BoxedQuery<'static, Pg> {
            let mut query = notifications::table
                .filter(notifications::recipient.eq(recipient))
                .into_boxed();
            if unread_only {
                query = query.filter(notifications::is_read.eq(false));
            }
            query
        };
        let count: i64 = inbox()
            .count()
            .get_result(&mut conn)
            .await
            .map_err(classify)?;
        let rows = inbox()
            .order((notifications::created_at.desc(), notifications::id.desc()))
            .limit(limit)
            .offset(offset)
            .select(NotificationRow::as_select())
            .load(&mut conn)
            .await
            .map_err(classify)?;
        let items = rows.into_iter().map(decode).collect::<Result<Vec<_>, _>>()?;
        Ok(Page::from_window(items, page, total(count)))
    }

    async fn count_unread(&self, recipient: MemberId) -> Result<u64, NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_failure)?;
        let count: i64 = notifications::table
            .filter(notifications::recipient.eq(*recipient.as_uuid()))
            .filter(notifications::is_read.eq(false))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(classify)?;
        Ok(total(count))
    }

    async fn mark_read(&self, id: NotificationId) -> Result<(), NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_failure)?;
        diesel::update(notifications::table.find(*id.as_uuid()))
            .set(notifications::is_read.eq(true))
            .execute(&mut conn)
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn mark_all_read(&self, recipient: MemberId) -> Result<u64, NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_failure)?;
        let changed = diesel::update(
            notifications::table
                .filter(notifications::recipient.eq(*recipient.as_uuid()))
                .filter(notifications::is_read.eq(false)),
        )
        .set(notifications::is_read.eq(true))
        .execute(&mut conn)
        .await
        .map_err(classify)?;
        Ok(changed as u64)
    }

    async fn delete(&self, id: NotificationId) -> Result<(), NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_failure)?;
        diesel::delete(notifications::table.find(*id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(classify)?;
        Ok(())
    }
}
