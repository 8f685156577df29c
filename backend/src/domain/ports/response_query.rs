//! Driving port for response reads.

use async_trait::async_trait;

use crate::domain::{Error, HelpResponse, Page, PageRequest, Principal, RequestId};

/// Inbound contract for response reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResponseQuery: Send + Sync {
    /// Responses to a request: all of them for the owner, otherwise only
    /// the caller's own.
    async fn list_for_request(
        &self,
        caller: Principal,
        request_id: RequestId,
    ) -> Result<Vec<HelpResponse>, Error>;

    /// Responses the caller made.
    async fn list_mine(
        &self,
        caller: Principal,
        page: PageRequest,
    ) -> Result<Page<HelpResponse>, Error>;
}
