//! Response matching engine.
//!
//! Accepting a response follows a fixed write order so a crash at any point
//! leaves a state that a retried `accept` can finish:
//!
//! 1. mark the response accepted (storage allows one per request);
//! 2. claim the request for the responder;
//! 3. reject the remaining pending responses;
//! 4. find or create the chat;
//! 5. notify, best effort.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use super::ports::{
    ChatCommand, Notifier, RequestRepository, ResponseAccepted, ResponseCommand, ResponseQuery,
    ResponseRepository, ResponseRepositoryError,
};
use super::service_support::{map_request_error, map_response_error};
use super::{
    Audience, Error, HelpRequest, HelpResponse, NotificationKind, Page, PageRequest, Principal,
    RequestId, RequestStatus, ResponseDraft, ResponseId, ResponseStatus, SideEffect,
    fire_and_forget,
};

/// Response service implementing the matching command port.
#[derive(Clone)]
pub struct ResponseService<R, S> {
    requests: Arc<R>,
    responses: Arc<S>,
    chats: Arc<dyn ChatCommand>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
}

impl<R, S> ResponseService<R, S> {
    /// Create the matching engine over the request and response repositories.
    pub fn new(
        requests: Arc<R>,
        responses: Arc<S>,
        chats: Arc<dyn ChatCommand>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            requests,
            responses,
            chats,
            notifier,
            clock,
        }
    }
}

impl<R, S> ResponseService<R, S>
where
    R: RequestRepository,
    S: ResponseRepository,
{
    async fn load_request(&self, id: RequestId) -> Result<HelpRequest, Error> {
        self.requests
            .find(id)
            .await
            .map_err(map_request_error)?
            .ok_or_else(|| Error::not_found(format!("request {id} not found")))
    }

    /// Load a response and its parent request, requiring the caller to own
    /// the request.
    async fn load_for_owner(
        &self,
        caller: Principal,
        id: ResponseId,
    ) -> Result<(HelpResponse, HelpRequest), Error> {
        let response = self
            .responses
            .find(id)
            .await
            .map_err(map_response_error)?
            .ok_or_else(|| Error::not_found(format!("response {id} not found")))?;
        let request = self.load_request(response.request_id).await?;
        if !request.is_owned_by(caller.member_id) {
            return Err(Error::forbidden(
                "only the request owner may decide on responses",
            ));
        }
        Ok((response, request))
    }

    async fn notify(&self, audience: Audience, kind: NotificationKind) {
        fire_and_forget(SideEffect::NotifyMember, self.notifier.send(audience, kind)).await;
    }
}

#[async_trait]
impl<R, S> ResponseCommand for ResponseService<R, S>
where
    R: RequestRepository,
    S: ResponseRepository,
{
    async fn submit(
        &self,
        caller: Principal,
        request_id: RequestId,
        draft: ResponseDraft,
    ) -> Result<HelpResponse, Error> {
        let request = self.load_request(request_id).await?;
        if request.is_owned_by(caller.member_id) {
            return Err(Error::conflict("you cannot respond to your own request"));
        }
        let now = self.clock.utc();
        let status = request.effective_status(now);
        if status != RequestStatus::Open {
            return Err(Error::conflict(format!(
                "request is {status} and no longer accepts responses"
            )));
        }
        if self
            .responses
            .find_for_responder(request_id, caller.member_id)
            .await
            .map_err(map_response_error)?
            .is_some()
        {
            return Err(Error::conflict(
                "you have already responded to this request",
            ));
        }

        let response = HelpResponse::pending(request_id, caller.member_id, draft, now);
        self.responses
            .insert(&response)
            .await
            .map_err(map_response_error)?;
        info!(response_id = %response.id, request_id = %request_id, "response submitted");

        self.notify(
            Audience::Member(request.requested_by),
            NotificationKind::NewResponse {
                request_id,
                response_id: response.id,
                responder_id: caller.member_id,
            },
        )
        .await;
        Ok(response)
    }

    async fn accept(&self, caller: Principal, id: ResponseId) -> Result<ResponseAccepted, Error> {
        let (response, request) = self.load_for_owner(caller, id).await?;
        if request.accepted_helper.is_some() {
            return Err(Error::conflict("a helper has already been accepted"));
        }
        if response.status == ResponseStatus::Rejected {
            return Err(Error::conflict("a rejected response cannot be accepted"));
        }
        let now = self.clock.utc();
        let status = request.effective_status(now);
        if status != RequestStatus::Open {
            return Err(Error::conflict(format!("request is {status}, not open")));
        }

        let accepted = match self.responses.mark_accepted(id, now).await {
            Ok(Some(accepted)) => accepted,
            Ok(None) => return Err(Error::conflict("response was rejected meanwhile")),
            Err(ResponseRepositoryError::Duplicate { .. }) => {
                return Err(Error::conflict("another response was already accepted"));
            }
            Err(other) => return Err(map_response_error(other)),
        };

        let claimed = match self
            .requests
            .claim_helper(request.id, accepted.responder, now)
            .await
            .map_err(map_request_error)?
        {
            Some(claimed) => claimed,
            None => {
                warn!(response_id = %id, request_id = %request.id, "claim lost; revoking acceptance");
                self.responses
                    .revoke_acceptance(id, now)
                    .await
                    .map_err(map_response_error)?;
                return Err(Error::conflict("request was claimed by another helper"));
            }
        };
        info!(response_id = %id, request_id = %request.id, "response accepted");

        let rejected = self
            .responses
            .reject_pending_siblings(request.id, Some(id), now)
            .await
            .map_err(map_response_error)?;

        let chat = self
            .chats
            .find_or_create(request.id, request.requested_by, accepted.responder)
            .await?;

        self.notify(
            Audience::Member(accepted.responder),
            NotificationKind::ResponseAccepted {
                request_id: request.id,
                response_id: id,
                chat_id: chat.id,
            },
        )
        .await;
        for sibling in rejected {
            self.notify(
                Audience::Member(sibling.responder),
                NotificationKind::ResponseRejected {
                    request_id: request.id,
                    response_id: sibling.id,
                },
            )
            .await;
        }

        Ok(ResponseAccepted {
            response: accepted,
            request: claimed,
            chat,
        })
    }

    async fn reject(&self, caller: Principal, id: ResponseId) -> Result<HelpResponse, Error> {
        let (response, request) = self.load_for_owner(caller, id).await?;
        match response.status {
            ResponseStatus::Accepted => {
                return Err(Error::conflict(
                    "an accepted response cannot be rejected; cancel the request instead",
                ));
            }
            ResponseStatus::Rejected => return Ok(response),
            ResponseStatus::Pending => {}
        }

        let rejected = self
            .responses
            .mark_rejected(id, self.clock.utc())
            .await
            .map_err(map_response_error)?
            .ok_or_else(|| Error::conflict("response was accepted meanwhile"))?;

        self.notify(
            Audience::Member(rejected.responder),
            NotificationKind::ResponseRejected {
                request_id: request.id,
                response_id: id,
            },
        )
        .await;
        Ok(rejected)
    }
}

/// Response reads.
#[derive(Clone)]
pub struct ResponseQueryService<R, S> {
    requests: Arc<R>,
    responses: Arc<S>,
}

impl<R, S> ResponseQueryService<R, S> {
    /// Create a query service with the given repositories.
    pub fn new(requests: Arc<R>, responses: Arc<S>) -> Self {
        Self {
            requests,
            responses,
        }
    }
}

#[async_trait]
impl<R, S> ResponseQuery for ResponseQueryService<R, S>
where
    R: RequestRepository,
    S: ResponseRepository,
{
    async fn list_for_request(
        &self,
        caller: Principal,
        request_id: RequestId,
    ) -> Result<Vec<HelpResponse>, Error> {
        let request = self
            .requests
            .find(request_id)
            .await
            .map_err(map_request_error)?
            .ok_or_else(|| Error::not_found(format!("request {request_id} not found")))?;
        if request.is_owned_by(caller.member_id) {
            return self
                .responses
                .list_for_request(request_id)
                .await
                .map_err(map_response_error);
        }
        let own = self
            .responses
            .find_for_responder(request_id, caller.member_id)
            .await
            .map_err(map_response_error)?;
        Ok(own.into_iter().collect())
    }

    async fn list_mine(
        &self,
        caller: Principal,
        page: PageRequest,
    ) -> Result<Page<HelpResponse>, Error> {
        self.responses
            .list_by_responder(caller.member_id, page)
            .await
            .map_err(map_response_error)
    }
}

#[cfg(test)]
#[path = "response_service_tests.rs"]
mod tests;
