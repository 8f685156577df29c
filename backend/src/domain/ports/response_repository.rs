//! Port for response persistence.
//!
//! Storage enforces one response per (request, responder) and at most one
//! accepted response per request. Violations surface as `Duplicate`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{HelpResponse, MemberId, Page, PageRequest, RequestId, ResponseId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by response repository adapters.
    pub enum ResponseRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "response repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "response repository query failed: {message}",
        /// A uniqueness guard rejected the write.
        Duplicate { message: String } =>
            "response already exists: {message}",
    }
}

/// Port for response storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResponseRepository: Send + Sync {
    /// Persist a new response.
    async fn insert(&self, response: &HelpResponse) -> Result<(), ResponseRepositoryError>;

    /// Fetch a response by id.
    async fn find(&self, id: ResponseId) -> Result<Option<HelpResponse>, ResponseRepositoryError>;

    /// Fetch the response `responder` made to `request_id`, if any.
    async fn find_for_responder(
        &self,
        request_id: RequestId,
        responder: MemberId,
    ) -> Result<Option<HelpResponse>, ResponseRepositoryError>;

    /// All responses to a request, oldest first.
    async fn list_for_request(
        &self,
        request_id: RequestId,
    ) -> Result<Vec<HelpResponse>, ResponseRepositoryError>;

    /// Responses made by `responder`, newest first.
    async fn list_by_responder(
        &self,
        responder: MemberId,
        page: PageRequest,
    ) -> Result<Page<HelpResponse>, ResponseRepositoryError>;

    /// Mark accepted when pending or already accepted.
    ///
    /// Returns `None` when the response is missing or rejected, and
    /// `Duplicate` when a sibling is already accepted.
    async fn mark_accepted(
        &self,
        id: ResponseId,
        now: DateTime<Utc>,
    ) -> Result<Option<HelpResponse>, ResponseRepositoryError>;

    /// Mark rejected unless accepted. Returns `None` when the guard fails.
    async fn mark_rejected(
        &self,
        id: ResponseId,
        now: DateTime<Utc>,
    ) -> Result<Option<HelpResponse>, ResponseRepositoryError>;

    /// Move an accepted response back to rejected after a lost claim.
    async fn revoke_acceptance(
        &self,
        id: ResponseId,
        now: DateTime<Utc>,
    ) -> Result<(), ResponseRepositoryError>;

    /// Reject every pending response to `request_id` except `keep`.
    ///
    /// Returns the responses that changed state.
    async fn reject_pending_siblings(
        &self,
        request_id: RequestId,
        keep: Option<ResponseId>,
        now: DateTime<Utc>,
    ) -> Result<Vec<HelpResponse>, ResponseRepositoryError>;
}
