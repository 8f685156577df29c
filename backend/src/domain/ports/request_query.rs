//! Driving port for request reads.
//!
//! Every request returned here carries its effective status as observed
//! at read time.

use async_trait::async_trait;

use crate::domain::{Error, HelpRequest, Page, PageRequest, Principal, RequestId};

use super::RequestFilter;

/// Inbound contract for request reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RequestQuery: Send + Sync {
    /// Fetch one request.
    async fn get(&self, id: RequestId) -> Result<HelpRequest, Error>;

    /// Browse requests.
    async fn list(&self, filter: RequestFilter, page: PageRequest)
    -> Result<Page<HelpRequest>, Error>;

    /// Requests owned by the caller.
    async fn list_mine(&self, caller: Principal, page: PageRequest)
    -> Result<Page<HelpRequest>, Error>;
}
