//! Two-party chats provisioned when a helper is matched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::text::{TextRuleError, bounded_text};
use super::{ChatId, MemberId, MessageId, RequestId};

const MESSAGE_MAX: usize = 1000;

/// Raised when both participants are the same member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("a chat needs two distinct participants")]
pub struct SameParticipant;

/// Order-independent pair of distinct chat participants.
///
/// The pair is stored in canonical order so `(a, b)` and `(b, a)` compare
/// and persist identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantPair {
    low: MemberId,
    high: MemberId,
}

impl ParticipantPair {
    /// Build the canonical pair for two distinct members.
    pub fn new(a: MemberId, b: MemberId) -> Result<Self, SameParticipant> {
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Ok(Self { low: a, high: b }),
            std::cmp::Ordering::Greater => Ok(Self { low: b, high: a }),
            std::cmp::Ordering::Equal => Err(SameParticipant),
        }
    }

    /// Participant with the smaller identifier.
    pub fn low(&self) -> MemberId {
        self.low
    }

    /// Participant with the larger identifier.
    pub fn high(&self) -> MemberId {
        self.high
    }

    /// Whether `member` takes part in the chat.
    pub fn contains(&self, member: MemberId) -> bool {
        self.low == member || self.high == member
    }

    /// The counterpart of `member`, if `member` is a participant.
    pub fn other(&self, member: MemberId) -> Option<MemberId> {
        if member == self.low {
            Some(self.high)
        } else if member == self.high {
            Some(self.low)
        } else {
            None
        }
    }
}

/// A conversation between the owner of a request and their helper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    pub id: ChatId,
    pub request_id: RequestId,
    pub participants: ParticipantPair,
    pub created_at: DateTime<Utc>,
}

impl Chat {
    /// Create a chat for `request_id`.
    pub fn new(request_id: RequestId, participants: ParticipantPair, now: DateTime<Utc>) -> Self {
        Self {
            id: ChatId::random(),
            request_id,
            participants,
            created_at: now,
        }
    }
}

/// A message posted to a chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: MessageId,
    pub chat_id: ChatId,
    pub sender: MemberId,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    /// Validate and build a message.
    pub fn compose(
        chat_id: ChatId,
        sender: MemberId,
        content: &str,
        now: DateTime<Utc>,
    ) -> Result<Self, TextRuleError> {
        Ok(Self {
            id: MessageId::random(),
            chat_id,
            sender,
            content: bounded_text("content", content, 1, MESSAGE_MAX)?,
            created_at: now,
        })
    }
}
