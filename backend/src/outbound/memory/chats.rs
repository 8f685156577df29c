//! Chat and message storage keyed by (request, participant pair).

use async_trait::async_trait;

use super::{MemoryStore, newest_first};
use crate::domain::ports::{ChatRepository, ChatRepositoryError};
use crate::domain::{
    Chat, ChatId, ChatMessage, MemberId, Page, PageRequest, ParticipantPair, RequestId,
};

fn poisoned(err: super::StorePoisoned) -> ChatRepositoryError {
    ChatRepositoryError::query(err.to_string())
}

#[async_trait]
impl ChatRepository for MemoryStore {
    async fn find_for_pair(
        &self,
        request_id: RequestId,
        participants: ParticipantPair,
    ) -> Result<Option<Chat>, ChatRepositoryError> {
        let state = self.lock().map_err(poisoned)?;
        Ok(state
            .chats
            .values()
            .find(|chat| chat.request_id == request_id && chat.participants == participants)
            .cloned())
    }

    async fn insert(&self, chat: &Chat) -> Result<(), ChatRepositoryError> {
        let mut state = self.lock().map_err(poisoned)?;
        let taken = state.chats.values().any(|existing| {
            existing.request_id == chat.request_id && existing.participants == chat.participants
        });
        if taken {
            return Err(ChatRepositoryError::duplicate(format!(
                "chat for request {} already exists",
                chat.request_id
            )));
        }
        state.chats.insert(chat.id, chat.clone());
        Ok(())
    }

    async fn find(&self, id: ChatId) -> Result<Option<Chat>, ChatRepositoryError> {
        let state = self.lock().map_err(poisoned)?;
        Ok(state.chats.get(&id).cloned())
    }

    async fn list_for_member(&self, member: MemberId) -> Result<Vec<Chat>, ChatRepositoryError> {
        let state = self.lock().map_err(poisoned)?;
        let mut found: Vec<Chat> = state
            .chats
            .values()
            .filter(|chat| chat.participants.contains(member))
            .cloned()
            .collect();
        newest_first(&mut found, |chat| (chat.created_at, chat.id));
        Ok(found)
    }

    async fn exists_for_request(&self, request_id: RequestId) -> Result<bool, ChatRepositoryError> {
        let state = self.lock().map_err(poisoned)?;
        Ok(state.chats.values().any(|chat| chat.request_id == request_id))
    }

    async fn insert_message(&self, message: &ChatMessage) -> Result<(), ChatRepositoryError> {
        let mut state = self.lock().map_err(poisoned)?;
        if !state.chats.contains_key(&message.chat_id) {
            return Err(ChatRepositoryError::query(format!(
                "chat {} does not exist",
                message.chat_id
            )));
        }
        state.messages.push(message.clone());
        Ok(())
    }

    async fn list_messages(
        &self,
        chat_id: ChatId,
        page: PageRequest,
    ) -> Result<Page<ChatMessage>, ChatRepositoryError> {
        let state = self.lock().map_err(poisoned)?;
        let found: Vec<ChatMessage> = state
            .messages
            .iter()
            .filter(|message| message.chat_id == chat_id)
            .cloned()
            .collect();
        Ok(Page::from_ordered(found, page))
    }
}
