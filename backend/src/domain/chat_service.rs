//! Chat provisioner and participant-only chat access.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, info};

use super::ports::{ChatCommand, ChatQuery, ChatRepository, ChatRepositoryError, Notifier};
use super::service_support::{map_chat_error, map_text_rule};
use super::{
    Audience, Chat, ChatId, ChatMessage, Error, MemberId, NotificationKind, Page, PageRequest,
    ParticipantPair, Principal, RequestId, SideEffect, fire_and_forget,
};

/// Chat service implementing the chat driving ports.
#[derive(Clone)]
pub struct ChatService<C> {
    chats: Arc<C>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
}

impl<C> ChatService<C> {
    /// Create a chat provisioner over the chat repository.
    pub fn new(chats: Arc<C>, notifier: Arc<dyn Notifier>, clock: Arc<dyn Clock>) -> Self {
        Self {
            chats,
            notifier,
            clock,
        }
    }
}

impl<C> ChatService<C>
where
    C: ChatRepository,
{
    async fn participant_chat(&self, caller: Principal, chat_id: ChatId) -> Result<Chat, Error> {
        let chat = self
            .chats
            .find(chat_id)
            .await
            .map_err(map_chat_error)?
            .ok_or_else(|| Error::not_found(format!("chat {chat_id} not found")))?;
        if !chat.participants.contains(caller.member_id) {
            return Err(Error::forbidden("only chat participants may access this chat"));
        }
        Ok(chat)
    }
}

#[async_trait]
impl<C> ChatCommand for ChatService<C>
where
    C: ChatRepository,
{
    async fn find_or_create(
        &self,
        request_id: RequestId,
        a: MemberId,
        b: MemberId,
    ) -> Result<Chat, Error> {
        let participants = ParticipantPair::new(a, b)
            .map_err(|_| Error::conflict("a chat needs two distinct participants"))?;

        if let Some(existing) = self
            .chats
            .find_for_pair(request_id, participants)
            .await
            .map_err(map_chat_error)?
        {
            debug!(chat_id = %existing.id, "reusing existing chat");
            return Ok(existing);
        }

        let chat = Chat::new(request_id, participants, self.clock.utc());
        match self.chats.insert(&chat).await {
            Ok(()) => {
                info!(chat_id = %chat.id, request_id = %request_id, "chat provisioned");
                Ok(chat)
            }
            Err(ChatRepositoryError::Duplicate { .. }) => {
                // Lost the insert race; the winner's row is authoritative.
                self.chats
                    .find_for_pair(request_id, participants)
                    .await
                    .map_err(map_chat_error)?
                    .ok_or_else(|| Error::internal("chat vanished after duplicate insert"))
            }
            Err(other) => Err(map_chat_error(other)),
        }
    }

    async fn post_message(
        &self,
        caller: Principal,
        chat_id: ChatId,
        content: String,
    ) -> Result<ChatMessage, Error> {
        let chat = self.participant_chat(caller, chat_id).await?;
        let message = ChatMessage::compose(chat.id, caller.member_id, &content, self.clock.utc())
            .map_err(map_text_rule)?;
        self.chats
            .insert_message(&message)
            .await
            .map_err(map_chat_error)?;

        if let Some(recipient) = chat.participants.other(caller.member_id) {
            fire_and_forget(
                SideEffect::NotifyMember,
                self.notifier.send(
                    Audience::Member(recipient),
                    NotificationKind::NewMessage {
                        chat_id: chat.id,
                        message_id: message.id,
                        sender_id: caller.member_id,
                    },
                ),
            )
            .await;
        }
        Ok(message)
    }
}

#[async_trait]
impl<C> ChatQuery for ChatService<C>
where
    C: ChatRepository,
{
    async fn list_mine(&self, caller: Principal) -> Result<Vec<Chat>, Error> {
        self.chats
            .list_for_member(caller.member_id)
            .await
            .map_err(map_chat_error)
    }

    async fn get(&self, caller: Principal, chat_id: ChatId) -> Result<Chat, Error> {
        self.participant_chat(caller, chat_id).await
    }

    async fn list_messages(
        &self,
        caller: Principal,
        chat_id: ChatId,
        page: PageRequest,
    ) -> Result<Page<ChatMessage>, Error> {
        let chat = self.participant_chat(caller, chat_id).await?;
        self.chats
            .list_messages(chat.id, page)
            .await
            .map_err(map_chat_error)
    }
}

#[cfg(test)]
#[path = "chat_service_tests.rs"]
mod tests;
