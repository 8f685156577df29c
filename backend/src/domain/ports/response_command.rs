//! Driving port for the response matching engine.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::{
    Chat, Error, HelpRequest, HelpResponse, Principal, RequestId, ResponseDraft, ResponseId,
};

/// Outcome of an owner accepting a response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseAccepted {
    pub response: HelpResponse,
    pub request: HelpRequest,
    pub chat: Chat,
}

/// Inbound contract for offering, accepting, and rejecting help.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResponseCommand: Send + Sync {
    /// Offer help on an open request.
    async fn submit(
        &self,
        caller: Principal,
        request_id: RequestId,
        draft: ResponseDraft,
    ) -> Result<HelpResponse, Error>;

    /// Accept one response; the request owner only, once per request.
    async fn accept(&self, caller: Principal, id: ResponseId) -> Result<ResponseAccepted, Error>;

    /// Reject one response; idempotent for rejected responses.
    async fn reject(&self, caller: Principal, id: ResponseId) -> Result<HelpResponse, Error>;
}
