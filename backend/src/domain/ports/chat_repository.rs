//! Port for chats and chat messages.

use async_trait::async_trait;

use crate::domain::{
    Chat, ChatId, ChatMessage, MemberId, Page, PageRequest, ParticipantPair, RequestId,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by chat repository adapters.
    pub enum ChatRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "chat repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "chat repository query failed: {message}",
        /// The (request, participants) key already has a chat.
        Duplicate { message: String } =>
            "chat already exists: {message}",
    }
}

/// Port for chat storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatRepository: Send + Sync {
    /// Look up the chat for a request and participant pair.
    async fn find_for_pair(
        &self,
        request_id: RequestId,
        participants: ParticipantPair,
    ) -> Result<Option<Chat>, ChatRepositoryError>;

    /// Persist a chat; a taken key yields `Duplicate`.
    async fn insert(&self, chat: &Chat) -> Result<(), ChatRepositoryError>;

    /// Fetch a chat by id.
    async fn find(&self, id: ChatId) -> Result<Option<Chat>, ChatRepositoryError>;

    /// Chats `member` takes part in, newest first.
    async fn list_for_member(&self, member: MemberId) -> Result<Vec<Chat>, ChatRepositoryError>;

    /// Whether any chat references the request.
    async fn exists_for_request(&self, request_id: RequestId) -> Result<bool, ChatRepositoryError>;

    /// Append a message.
    async fn insert_message(&self, message: &ChatMessage) -> Result<(), ChatRepositoryError>;

    /// Messages of a chat, oldest first.
    async fn list_messages(
        &self,
        chat_id: ChatId,
        page: PageRequest,
    ) -> Result<Page<ChatMessage>, ChatRepositoryError>;
}
