//! Driving port for chat reads.

use async_trait::async_trait;

use crate::domain::{Chat, ChatId, ChatMessage, Error, Page, PageRequest, Principal};

/// Inbound contract for chat reads; participants only.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatQuery: Send + Sync {
    async fn list_mine(&self, caller: Principal) -> Result<Vec<Chat>, Error>;

    async fn get(&self, caller: Principal, chat_id: ChatId) -> Result<Chat, Error>;

    async fn list_messages(
        &self,
        caller: Principal,
        chat_id: ChatId,
        page: PageRequest,
    ) -> Result<Page<ChatMessage>, Error>;
}
