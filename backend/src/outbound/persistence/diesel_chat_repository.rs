//! PostgreSQL-backed `ChatRepository`.

use async_trait::async_trait;
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ChatRepository, ChatRepositoryError};
use crate::domain::{
    Chat, ChatId, ChatMessage, MemberId, Page, PageRequest, ParticipantPair, RequestId,
};

use super::error_mapping::{Failure, classify, decode_failure, impl_from_failure, pool_failure};
use super::models::{ChatRow, MessageRow};
use super::paging::{total, window};
use super::pool::DbPool;
use super::schema::{chat_messages, chats};

impl_from_failure!(ChatRepositoryError, duplicate);

/// Diesel implementation of the chat repository port.
#[derive(Clone)]
pub struct DieselChatRepository {
    pool: DbPool,
}

impl DieselChatRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn decode(row: ChatRow) -> Result<Chat, Failure> {
    Chat::try_from(row).map_err(decode_failure)
}

#[async_trait]
impl ChatRepository for DieselChatRepository {
    async fn find_for_pair(
        &self,
        request_id: RequestId,
        participants: ParticipantPair,
    ) -> Result<Option<Chat>, ChatRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_failure)?;
        let row = chats::table
            .filter(chats::request_id.eq(*request_id.as_uuid()))
            .filter(chats::participant_low.eq(*participants.low().as_uuid()))
            .filter(chats::participant_high.eq(*participants.high().as_uuid()))
            .select(ChatRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(classify)?;
        Ok(row.map(decode).transpose()?)
    }

    async fn insert(&self, chat: &Chat) -> Result<(), ChatRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_failure)?;
        diesel::insert_into(chats::table)
            .values(ChatRow::from(chat))
            .execute(&mut conn)
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn find(&self, id: ChatId) -> Result<Option<Chat>, ChatRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_failure)?;
        let row = chats::table
            .find(*id.as_uuid())
            .select(ChatRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(classify)?;
        Ok(row.map(decode).transpose()?)
    }

    async fn list_for_member(&self, member: MemberId) -> Result<Vec<Chat>, ChatRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_failure)?;
        let member = *member.as_uuid();
        let rows = chats::table
            .filter(
                chats::participant_low
                    .eq(member)
                    .or(chats::participant_high.eq(member)),
            )
            .order((chats::created_at.desc(), chats::id.desc()))
            .select(ChatRow::as_select())
            .load(&mut conn)
            .await
            .map_err(classify)?;
        Ok(rows.into_iter().map(decode).collect::<Result<Vec<_>, _>>()?)
    }

    async fn exists_for_request(&self, request_id: RequestId) -> Result<bool, ChatRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_failure)?;
        let found = diesel::select(exists(
            chats::table.filter(chats::request_id.eq(*request_id.as_uuid())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(classify)?;
        Ok(found)
    }

    async fn insert_message(&self, message: &ChatMessage) -> Result<(), ChatRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_failure)?;
        diesel::insert_into(chat_messages::table)
            .values(MessageRow::from(message))
            .execute(&mut conn)
            .await
            .map_err(classify)?;
        Ok(())
    }

    async fn list_messages(
        &self,
        chat_id: ChatId,
        page: PageRequest,
    ) -> Result<Page<ChatMessage>, ChatRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_failure)?;
        let chat_id = *chat_id.as_uuid();
        let (limit, offset) = window(page);
        let count: i64 = chat_messages::table
            .filter(chat_messages::chat_id.eq(chat_id))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(classify)?;
        let rows: Vec<MessageRow> = chat_messages::table
            .filter(chat_messages::chat_id.eq(chat_id))
            .order((chat_messages::created_at.asc(), chat_messages::id.asc()))
            .limit(limit)
            .offset(offset)
            .select(MessageRow::as_select())
            .load(&mut conn)
            .await
            .map_err(classify)?;
        let items = rows.into_iter().map(ChatMessage::from).collect();
        Ok(Page::from_window(items, page, total(count)))
    }
}
