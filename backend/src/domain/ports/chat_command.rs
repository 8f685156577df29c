//! Driving port for chat provisioning and messaging.

use async_trait::async_trait;

use crate::domain::{Chat, ChatId, ChatMessage, Error, MemberId, Principal, RequestId};

/// Inbound contract for chats.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatCommand: Send + Sync {
    /// Return the chat for the request and pair, creating it when absent.
    ///
    /// Participant order does not matter. Concurrent callers converge on
    /// one chat.
    async fn find_or_create(
        &self,
        request_id: RequestId,
        a: MemberId,
        b: MemberId,
    ) -> Result<Chat, Error>;

    /// Append a message from a participant.
    async fn post_message(
        &self,
        caller: Principal,
        chat_id: ChatId,
        content: String,
    ) -> Result<ChatMessage, Error>;
}
