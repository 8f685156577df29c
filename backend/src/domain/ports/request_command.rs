//! Driving port for request lifecycle transitions.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::{Chat, Error, HelpRequest, Principal, RequestDraft, RequestEdit, RequestId};

/// Outcome of a helper accepting a request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestAccepted {
    pub request: HelpRequest,
    pub chat: Chat,
}

/// Inbound contract for the request state machine.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RequestCommand: Send + Sync {
    /// Open a new request owned by the caller.
    async fn create(&self, caller: Principal, draft: RequestDraft) -> Result<HelpRequest, Error>;

    /// Change allowlisted fields; owner only.
    async fn update(
        &self,
        caller: Principal,
        id: RequestId,
        edit: RequestEdit,
    ) -> Result<HelpRequest, Error>;

    /// Claim an open request as its helper and provision the chat.
    async fn accept(&self, caller: Principal, id: RequestId) -> Result<RequestAccepted, Error>;

    /// Cancel unless fulfilled; owner only.
    async fn cancel(&self, caller: Principal, id: RequestId) -> Result<HelpRequest, Error>;

    /// Mark an in-progress request fulfilled; owner only.
    async fn fulfill(&self, caller: Principal, id: RequestId) -> Result<HelpRequest, Error>;

    /// Purge an open, unengaged request inside the deletion window.
    async fn delete(&self, caller: Principal, id: RequestId) -> Result<(), Error>;
}
