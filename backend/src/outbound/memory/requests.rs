//! Request storage with compare-and-swap transitions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{MemoryStore, newest_first};
use crate::domain::ports::{RequestFilter, RequestRepository, RequestRepositoryError};
use crate::domain::{
    HelpRequest, MemberId, Page, PageRequest, RequestDetails, RequestId, RequestStatus,
};

fn poisoned(err: super::StorePoisoned) -> RequestRepositoryError {
    RequestRepositoryError::query(err.to_string())
}

fn matches(filter: &RequestFilter, request: &HelpRequest, now: DateTime<Utc>) -> bool {
    request.effective_status(now) == filter.status
        && filter.category.is_none_or(|c| request.details.category == c)
        && filter.urgency.is_none_or(|u| request.details.urgency == u)
}

#[async_trait]
impl RequestRepository for MemoryStore {
    async fn insert(&self, request: &HelpRequest) -> Result<(), RequestRepositoryError> {
        let mut state = self.lock().map_err(poisoned)?;
        if state.requests.contains_key(&request.id) {
            return Err(RequestRepositoryError::query(format!(
                "request {} already stored",
                request.id
            )));
        }
        state.requests.insert(request.id, request.clone());
        Ok(())
    }

    async fn find(&self, id: RequestId) -> Result<Option<HelpRequest>, RequestRepositoryError> {
        let state = self.lock().map_err(poisoned)?;
        Ok(state.requests.get(&id).cloned())
    }

    async fn list(
        &self,
        filter: RequestFilter,
        now: DateTime<Utc>,
        page: PageRequest,
    ) -> Result<Page<HelpRequest>, RequestRepositoryError> {
        let state = self.lock().map_err(poisoned)?;
        let mut found: Vec<HelpRequest> = state
            .requests
            .values()
            .filter(|request| matches(&filter, request, now))
            .cloned()
            .collect();
        newest_first(&mut found, |request| (request.created_at, request.id));
        Ok(Page::from_ordered(found, page))
    }

    async fn list_by_owner(
        &self,
        owner: MemberId,
        page: PageRequest,
    ) -> Result<Page<HelpRequest>, RequestRepositoryError> {
        let state = self.lock().map_err(poisoned)?;
        let mut found: Vec<HelpRequest> = state
            .requests
            .values()
            .filter(|request| request.requested_by == owner)
            .cloned()
            .collect();
        newest_first(&mut found, |request| (request.created_at, request.id));
        Ok(Page::from_ordered(found, page))
    }

    async fn update_details(
        &self,
        id: RequestId,
        details: &RequestDetails,
        now: DateTime<Utc>,
    ) -> Result<Option<HelpRequest>, RequestRepositoryError> {
        let mut state = self.lock().map_err(poisoned)?;
        Ok(state
            .requests
            .get_mut(&id)
            .filter(|request| {
                !matches!(
                    request.status,
                    RequestStatus::Fulfilled | RequestStatus::Cancelled
                )
            })
            .map(|request| {
                request.details = details.clone();
                request.updated_at = now;
                request.clone()
            }))
    }

    async fn claim_helper(
        &self,
        id: RequestId,
        helper: MemberId,
        now: DateTime<Utc>,
    ) -> Result<Option<HelpRequest>, RequestRepositoryError> {
        let mut state = self.lock().map_err(poisoned)?;
        Ok(state
            .requests
            .get_mut(&id)
            .filter(|request| {
                request.status == RequestStatus::Open
                    && request.accepted_helper.is_none()
                    && request.expires_at > now
            })
            .map(|request| {
                request.status = RequestStatus::InProgress;
                request.accepted_helper = Some(helper);
                request.updated_at = now;
                request.clone()
            }))
    }

    async fn cancel(
        &self,
        id: RequestId,
        now: DateTime<Utc>,
    ) -> Result<Option<HelpRequest>, RequestRepositoryError> {
        let mut state = self.lock().map_err(poisoned)?;
        Ok(state
            .requests
            .get_mut(&id)
            .filter(|request| request.status != RequestStatus::Fulfilled)
            .map(|request| {
                request.status = RequestStatus::Cancelled;
                request.accepted_helper = None;
                request.updated_at = now;
                request.clone()
            }))
    }

    async fn fulfill(
        &self,
        id: RequestId,
        now: DateTime<Utc>,
    ) -> Result<Option<HelpRequest>, RequestRepositoryError> {
        let mut state = self.lock().map_err(poisoned)?;
        Ok(state
            .requests
            .get_mut(&id)
            .filter(|request| request.status == RequestStatus::InProgress)
            .map(|request| {
                request.status = RequestStatus::Fulfilled;
                request.fulfilled_at = Some(now);
                request.updated_at = now;
                request.clone()
            }))
    }

    async fn delete_unengaged(
        &self,
        id: RequestId,
        cutoff: DateTime<Utc>,
    ) -> Result<bool, RequestRepositoryError> {
        let mut state = self.lock().map_err(poisoned)?;
        let engaged = state.chats.values().any(|chat| chat.request_id == id);
        let deletable = state.requests.get(&id).is_some_and(|request| {
            request.status == RequestStatus::Open && request.created_at >= cutoff && !engaged
        });
        if deletable {
            state.requests.remove(&id);
            state.responses.retain(|_, response| response.request_id != id);
        }
        Ok(deletable)
    }
}
