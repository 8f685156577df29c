//! Port for help request persistence.
//!
//! Every state transition is a conditional write: the adapter applies it
//! only when the stored row still satisfies the transition's guard and
//! returns `None` otherwise. Callers re-read to explain a refusal.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    Category, HelpRequest, MemberId, Page, PageRequest, RequestDetails, RequestId, RequestStatus,
    Urgency,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by request repository adapters.
    pub enum RequestRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "request repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "request repository query failed: {message}",
    }
}

/// Listing filter; `status` is matched against the effective status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestFilter {
    pub status: RequestStatus,
    pub category: Option<Category>,
    pub urgency: Option<Urgency>,
}

impl Default for RequestFilter {
    fn default() -> Self {
        Self {
            status: RequestStatus::Open,
            category: None,
            urgency: None,
        }
    }
}

/// Port for request storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RequestRepository: Send + Sync {
    /// Persist a new request.
    async fn insert(&self, request: &HelpRequest) -> Result<(), RequestRepositoryError>;

    /// Fetch a request by id.
    async fn find(&self, id: RequestId) -> Result<Option<HelpRequest>, RequestRepositoryError>;

    /// List requests matching `filter` as observed at `now`, newest first.
    async fn list(
        &self,
        filter: RequestFilter,
        now: DateTime<Utc>,
        page: PageRequest,
    ) -> Result<Page<HelpRequest>, RequestRepositoryError>;

    /// List requests owned by `owner`, newest first.
    async fn list_by_owner(
        &self,
        owner: MemberId,
        page: PageRequest,
    ) -> Result<Page<HelpRequest>, RequestRepositoryError>;

    /// Replace editable fields unless the request is fulfilled or cancelled.
    async fn update_details(
        &self,
        id: RequestId,
        details: &RequestDetails,
        now: DateTime<Utc>,
    ) -> Result<Option<HelpRequest>, RequestRepositoryError>;

    /// Set the helper and move to in-progress, only while open, unclaimed,
    /// and unexpired.
    async fn claim_helper(
        &self,
        id: RequestId,
        helper: MemberId,
        now: DateTime<Utc>,
    ) -> Result<Option<HelpRequest>, RequestRepositoryError>;

    /// Move to cancelled unless fulfilled, clearing any accepted helper.
    async fn cancel(
        &self,
        id: RequestId,
        now: DateTime<Utc>,
    ) -> Result<Option<HelpRequest>, RequestRepositoryError>;

    /// Move from in-progress to fulfilled, stamping `fulfilled_at`.
    async fn fulfill(
        &self,
        id: RequestId,
        now: DateTime<Utc>,
    ) -> Result<Option<HelpRequest>, RequestRepositoryError>;

    /// Remove the request while open, created at or after `cutoff`, and
    /// without any chat. Returns whether a row was removed.
    async fn delete_unengaged(
        &self,
        id: RequestId,
        cutoff: DateTime<Utc>,
    ) -> Result<bool, RequestRepositoryError>;
}
