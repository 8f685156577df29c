//! In-memory store implementing every repository port.
//!
//! All collections live behind one mutex, so each port call observes and
//! mutates a consistent snapshot. The conditional-write guards mirror the
//! PostgreSQL adapter: uniqueness keys, compare-and-swap transitions, and
//! the one-accepted-response-per-request rule.
//!
//! Used by tests and by the server when no database URL is configured.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::domain::{
    Chat, ChatId, ChatMessage, HelpRequest, HelpResponse, Member, MemberId, Notification,
    NotificationId, Report, ReportId, RequestId, ResponseId, WarningEntry,
};

mod chats;
mod members;
mod notifications;
mod reports;
mod requests;
mod responses;

#[derive(Debug, Default)]
struct State {
    members: HashMap<MemberId, Member>,
    warnings: Vec<WarningEntry>,
    requests: HashMap<RequestId, HelpRequest>,
    responses: HashMap<ResponseId, HelpResponse>,
    chats: HashMap<ChatId, Chat>,
    messages: Vec<ChatMessage>,
    reports: HashMap<ReportId, Report>,
    notifications: HashMap<NotificationId, Notification>,
}

/// Raised when a previous holder of the lock panicked.
#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("in-memory store lock poisoned")]
pub struct StorePoisoned;

/// Process-local store shared by all repository ports.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, StorePoisoned> {
        self.state.lock().map_err(|_| StorePoisoned)
    }
}

/// Sort newest first, breaking ties by id so pages are stable.
fn newest_first<T, K: Ord, I: Ord>(items: &mut [T], key: impl Fn(&T) -> (K, I)) {
    items.sort_by(|a, b| key(b).cmp(&key(a)));
}

#[cfg(test)]
mod tests;
