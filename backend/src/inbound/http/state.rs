//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    ChatCommand, ChatQuery, MemberDirectory, ModerationCommand, ModerationQuery,
    NotificationInbox, RequestCommand, RequestQuery, ResponseCommand, ResponseQuery,
};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub members: Arc<dyn MemberDirectory>,
    pub requests: Arc<dyn RequestCommand>,
    pub requests_query: Arc<dyn RequestQuery>,
    pub responses: Arc<dyn ResponseCommand>,
    pub responses_query: Arc<dyn ResponseQuery>,
    pub chats: Arc<dyn ChatCommand>,
    pub chats_query: Arc<dyn ChatQuery>,
    pub moderation: Arc<dyn ModerationCommand>,
    pub moderation_query: Arc<dyn ModerationQuery>,
    pub inbox: Arc<dyn NotificationInbox>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub members: Arc<dyn MemberDirectory>,
    pub requests: Arc<dyn RequestCommand>,
    pub requests_query: Arc<dyn RequestQuery>,
    pub responses: Arc<dyn ResponseCommand>,
    pub responses_query: Arc<dyn ResponseQuery>,
    pub chats: Arc<dyn ChatCommand>,
    pub chats_query: Arc<dyn ChatQuery>,
    pub moderation: Arc<dyn ModerationCommand>,
    pub moderation_query: Arc<dyn ModerationQuery>,
    pub inbox: Arc<dyn NotificationInbox>,
}

impl HttpState {
    /// Construct state from the port bundle.
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            members,
            requests,
            requests_query,
            responses,
            responses_query,
            chats,
            chats_query,
            moderation,
            moderation_query,
            inbox,
        } = ports;
        Self {
            members,
            requests,
            requests_query,
            responses,
            responses_query,
            chats,
            chats_query,
            moderation,
            moderation_query,
            inbox,
        }
    }
}
