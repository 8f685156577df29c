//! Response storage enforcing the (request, responder) key and a single
//! accepted response per request.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{MemoryStore, newest_first};
use crate::domain::ports::{ResponseRepository, ResponseRepositoryError};
use crate::domain::{
    HelpResponse, MemberId, Page, PageRequest, RequestId, ResponseId, ResponseStatus,
};

fn poisoned(err: super::StorePoisoned) -> ResponseRepositoryError {
    ResponseRepositoryError::query(err.to_string())
}

#[async_trait]
impl ResponseRepository for MemoryStore {
    async fn insert(&self, response: &HelpResponse) -> Result<(), ResponseRepositoryError> {
        let mut state = self.lock().map_err(poisoned)?;
        let taken = state.responses.values().any(|existing| {
            existing.request_id == response.request_id && existing.responder == response.responder
        });
        if taken {
            return Err(ResponseRepositoryError::duplicate(format!(
                "responder {} already answered request {}",
                response.responder, response.request_id
            )));
        }
        state.responses.insert(response.id, response.clone());
        Ok(())
    }

    async fn find(&self, id: ResponseId) -> Result<Option<HelpResponse>, ResponseRepositoryError> {
        let state = self.lock().map_err(poisoned)?;
        Ok(state.responses.get(&id).cloned())
    }

    async fn find_for_responder(
        &self,
        request_id: RequestId,
        responder: MemberId,
    ) -> Result<Option<HelpResponse>, ResponseRepositoryError> {
        let state = self.lock().map_err(poisoned)?;
        Ok(state
            .responses
            .values()
            .find(|response| response.request_id == request_id && response.responder == responder)
            .cloned())
    }

    async fn list_for_request(
        &self,
        request_id: RequestId,
    ) -> Result<Vec<HelpResponse>, ResponseRepositoryError> {
        let state = self.lock().map_err(poisoned)?;
        let mut found: Vec<HelpResponse> = state
            .responses
            .values()
            .filter(|response| response.request_id == request_id)
            .cloned()
            .collect();
        found.sort_by_key(|response| (response.created_at, response.id));
        Ok(found)
    }

    async fn list_by_responder(
        &self,
        responder: MemberId,
        page: PageRequest,
    ) -> Result<Page<HelpResponse>, ResponseRepositoryError> {
        let state = self.lock().map_err(poisoned)?;
        let mut found: Vec<HelpResponse> = state
            .responses
            .values()
            .filter(|response| response.responder == responder)
            .cloned()
            .collect();
        newest_first(&mut found, |response| (response.created_at, response.id));
        Ok(Page::from_ordered(found, page))
    }

    async fn mark_accepted(
        &self,
        id: ResponseId,
        now: DateTime<Utc>,
    ) -> Result<Option<HelpResponse>, ResponseRepositoryError> {
        let mut state = self.lock().map_err(poisoned)?;
        let Some(request_id) = state.responses.get(&id).map(|response| response.request_id) else {
            return Ok(None);
        };
        let sibling_accepted = state.responses.values().any(|response| {
            response.request_id == request_id
                && response.id != id
                && response.status == ResponseStatus::Accepted
        });
        if sibling_accepted {
            return Err(ResponseRepositoryError::duplicate(format!(
                "request {request_id} already has an accepted response"
            )));
        }
        Ok(state
            .responses
            .get_mut(&id)
            .filter(|response| response.status != ResponseStatus::Rejected)
            .map(|response| {
                if response.status != ResponseStatus::Accepted {
                    response.status = ResponseStatus::Accepted;
                    response.updated_at = now;
                }
                response.clone()
            }))
    }

    async fn mark_rejected(
        &self,
        id: ResponseId,
        now: DateTime<Utc>,
    ) -> Result<Option<HelpResponse>, ResponseRepositoryError> {
        let mut state = self.lock().map_err(poisoned)?;
        Ok(state
            .responses
            .get_mut(&id)
            .filter(|response| response.status != ResponseStatus::Accepted)
            .map(|response| {
                if response.status != ResponseStatus::Rejected {
                    response.status = ResponseStatus::Rejected;
                    response.updated_at = now;
                }
                response.clone()
            }))
    }

    async fn revoke_acceptance(
        &self,
        id: ResponseId,
        now: DateTime<Utc>,
    ) -> Result<(), ResponseRepositoryError> {
        let mut state = self.lock().map_err(poisoned)?;
        if let Some(response) = state
            .responses
            .get_mut(&id)
            .filter(|response| response.status == ResponseStatus::Accepted)
        {
            response.status = ResponseStatus::Rejected;
            response.updated_at = now;
        }
        Ok(())
    }

    async fn reject_pending_siblings(
        &self,
        request_id: RequestId,
        keep: Option<ResponseId>,
        now: DateTime<Utc>,
    ) -> Result<Vec<HelpResponse>, ResponseRepositoryError> {
        let mut state = self.lock().map_err(poisoned)?;
        let mut changed: Vec<HelpResponse> = state
            .responses
            .values_mut()
            .filter(|response| {
                response.request_id == request_id
                    && Some(response.id) != keep
                    && response.status == ResponseStatus::Pending
            })
            .map(|response| {
                response.status = ResponseStatus::Rejected;
                response.updated_at = now;
                response.clone()
            })
            .collect();
        changed.sort_by_key(|response| (response.created_at, response.id));
        Ok(changed)
    }
}
