//! Request lifecycle manager.
//!
//! Owns the request state machine:
//! `open -> in-progress -> fulfilled`, `open | in-progress -> cancelled`,
//! `open -> (removed)` inside the deletion window, and passive expiry.
//! Every transition is a conditional write in the repository; a refused
//! write is re-read so the caller learns why.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use tracing::{info, warn};

use super::ports::{
    ChatCommand, MemberRepository, Notifier, RequestAccepted, RequestCommand, RequestFilter,
    RequestQuery, RequestRepository, ResponseRepository,
};
use super::service_support::{
    map_member_error, map_request_error, map_request_validation, map_response_error,
};
use super::{
    Audience, DELETION_WINDOW_MINUTES, Error, ExpiryHours, HelpRequest, HelpResponse, MemberId,
    NotificationKind, Page, PageRequest, Principal, RequestDraft, RequestEdit, RequestId,
    RequestStatus, ResponseStatus, SideEffect, fire_and_forget,
};

/// Request service implementing the lifecycle command port.
#[derive(Clone)]
pub struct RequestService<R, S, M> {
    requests: Arc<R>,
    responses: Arc<S>,
    members: Arc<M>,
    chats: Arc<dyn ChatCommand>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    default_expiry: ExpiryHours,
}

impl<R, S, M> RequestService<R, S, M> {
    /// Build the service over its repositories and collaborators.
    ///
    /// Requests default to [`ExpiryHours::default`] when a draft names no
    /// lifetime.
    pub fn new(
        requests: Arc<R>,
        responses: Arc<S>,
        members: Arc<M>,
        chats: Arc<dyn ChatCommand>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            requests,
            responses,
            members,
            chats,
            notifier,
            clock,
            default_expiry: ExpiryHours::default(),
        }
    }

    /// Override the lifetime used when a draft names none.
    pub fn with_default_expiry(mut self, expiry: ExpiryHours) -> Self {
        self.default_expiry = expiry;
        self
    }
}

fn not_open(request: &HelpRequest, now: chrono::DateTime<chrono::Utc>) -> Error {
    match request.effective_status(now) {
        RequestStatus::Expired => Error::conflict("request has expired"),
        status => Error::conflict(format!("request is {status}, not open")),
    }
}

impl<R, S, M> RequestService<R, S, M>
where
    R: RequestRepository,
    S: ResponseRepository,
    M: MemberRepository,
{
    async fn load(&self, id: RequestId) -> Result<HelpRequest, Error> {
        self.requests
            .find(id)
            .await
            .map_err(map_request_error)?
            .ok_or_else(|| Error::not_found(format!("request {id} not found")))
    }

    async fn load_owned(&self, caller: Principal, id: RequestId) -> Result<HelpRequest, Error> {
        let request = self.load(id).await?;
        if !request.is_owned_by(caller.member_id) {
            return Err(Error::forbidden("only the request owner may do this"));
        }
        Ok(request)
    }

    /// Align responses with a helper who claimed the request directly.
    ///
    /// The claim has already committed, so failures here are logged and the
    /// affected responses are left as they are. An acceptance left behind by
    /// an owner who lost the race is revoked before the helper's own
    /// response is marked.
    async fn settle_responses(
        &self,
        id: RequestId,
        helper: MemberId,
        now: DateTime<Utc>,
    ) -> Vec<HelpResponse> {
        let responses = match self.responses.list_for_request(id).await {
            Ok(responses) => responses,
            Err(error) => {
                warn!(request_id = %id, error = %error, "could not load responses after claim");
                return Vec::new();
            }
        };

        let mut rejected = Vec::new();
        let mut own = None;
        for response in responses {
            if response.responder == helper {
                own = Some(response.id);
            } else if response.status == ResponseStatus::Accepted {
                match self.responses.revoke_acceptance(response.id, now).await {
                    Ok(()) => {
                        warn!(response_id = %response.id, request_id = %id, "revoked stale acceptance");
                        rejected.push(response);
                    }
                    Err(error) => {
                        warn!(response_id = %response.id, error = %error, "could not revoke stale acceptance");
                    }
                }
            }
        }

        if let Some(own_id) = own {
            if let Err(error) = self.responses.mark_accepted(own_id, now).await {
                warn!(response_id = %own_id, error = %error, "could not mark helper's response accepted");
            }
        }

        match self.responses.reject_pending_siblings(id, own, now).await {
            Ok(siblings) => rejected.extend(siblings),
            Err(error) => {
                warn!(request_id = %id, error = %error, "could not reject sibling responses");
            }
        }
        rejected
    }

    async fn notify(&self, audience: Audience, kind: NotificationKind) {
        fire_and_forget(SideEffect::NotifyMember, self.notifier.send(audience, kind)).await;
    }

    async fn notify_rejected(&self, rejected: Vec<HelpResponse>) {
        for response in rejected {
            self.notify(
                Audience::Member(response.responder),
                NotificationKind::ResponseRejected {
                    request_id: response.request_id,
                    response_id: response.id,
                },
            )
            .await;
        }
    }
}

#[async_trait]
impl<R, S, M> RequestCommand for RequestService<R, S, M>
where
    R: RequestRepository,
    S: ResponseRepository,
    M: MemberRepository,
{
    async fn create(&self, caller: Principal, draft: RequestDraft) -> Result<HelpRequest, Error> {
        let expiry = draft
            .expiry(self.default_expiry)
            .map_err(map_request_validation)?;
        let details = draft.validate().map_err(map_request_validation)?;
        let request = HelpRequest::open(caller.member_id, details, expiry, self.clock.utc());
        self.requests
            .insert(&request)
            .await
            .map_err(map_request_error)?;
        info!(request_id = %request.id, owner = %caller.member_id, "request opened");
        Ok(request)
    }

    async fn update(
        &self,
        caller: Principal,
        id: RequestId,
        edit: RequestEdit,
    ) -> Result<HelpRequest, Error> {
        let request = self.load_owned(caller, id).await?;
        if matches!(
            request.status,
            RequestStatus::Fulfilled | RequestStatus::Cancelled
        ) {
            return Err(Error::conflict(format!(
                "a {} request cannot be edited",
                request.status
            )));
        }
        if edit.is_empty() {
            return Err(Error::invalid_request("no editable fields supplied"));
        }
        let details = edit
            .apply(&request.details)
            .map_err(map_request_validation)?;
        let now = self.clock.utc();
        let updated = self
            .requests
            .update_details(id, &details, now)
            .await
            .map_err(map_request_error)?
            .ok_or_else(|| Error::conflict("request was closed while editing"))?;
        Ok(updated.observed_at(now))
    }

    async fn accept(&self, caller: Principal, id: RequestId) -> Result<RequestAccepted, Error> {
        let request = self.load(id).await?;
        if request.is_owned_by(caller.member_id) {
            return Err(Error::forbidden("you cannot accept your own request"));
        }
        let now = self.clock.utc();
        if request.effective_status(now) != RequestStatus::Open {
            return Err(not_open(&request, now));
        }

        let existing = self
            .responses
            .list_for_request(id)
            .await
            .map_err(map_response_error)?;
        if existing.iter().any(|response| {
            response.status == ResponseStatus::Accepted && response.responder != caller.member_id
        }) {
            return Err(Error::conflict("the owner has already accepted another response"));
        }

        let claimed = self
            .requests
            .claim_helper(id, caller.member_id, now)
            .await
            .map_err(map_request_error)?
            .ok_or_else(|| Error::conflict("request has already been accepted"))?;
        info!(request_id = %id, helper = %caller.member_id, "request accepted by helper");

        let rejected = self.settle_responses(id, caller.member_id, now).await;

        let chat = self
            .chats
            .find_or_create(id, claimed.requested_by, caller.member_id)
            .await?;

        self.notify(
            Audience::Member(claimed.requested_by),
            NotificationKind::RequestAccepted {
                request_id: id,
                helper_id: caller.member_id,
                chat_id: chat.id,
            },
        )
        .await;
        self.notify_rejected(rejected).await;

        Ok(RequestAccepted {
            request: claimed,
            chat,
        })
    }

    async fn cancel(&self, caller: Principal, id: RequestId) -> Result<HelpRequest, Error> {
        let request = self.load_owned(caller, id).await?;
        let now = self.clock.utc();
        match request.status {
            RequestStatus::Fulfilled => {
                return Err(Error::conflict("a fulfilled request cannot be cancelled"));
            }
            RequestStatus::Cancelled => return Ok(request.observed_at(now)),
            _ => {}
        }

        let cancelled = self
            .requests
            .cancel(id, now)
            .await
            .map_err(map_request_error)?
            .ok_or_else(|| Error::conflict("request was fulfilled before it could be cancelled"))?;
        info!(request_id = %id, "request cancelled");

        if let Some(helper) = request.accepted_helper {
            self.notify(
                Audience::Member(helper),
                NotificationKind::RequestCancelled { request_id: id },
            )
            .await;
        }
        Ok(cancelled)
    }

    async fn fulfill(&self, caller: Principal, id: RequestId) -> Result<HelpRequest, Error> {
        let request = self.load_owned(caller, id).await?;
        if request.status != RequestStatus::InProgress {
            return Err(Error::conflict(format!(
                "only an in-progress request can be fulfilled; this one is {}",
                request.status
            )));
        }

        let now = self.clock.utc();
        let fulfilled = self
            .requests
            .fulfill(id, now)
            .await
            .map_err(map_request_error)?
            .ok_or_else(|| Error::conflict("request left in-progress before fulfilment"))?;
        info!(request_id = %id, "request fulfilled");

        if let Some(helper) = fulfilled.accepted_helper {
            fire_and_forget(
                SideEffect::IncrementHelpCount,
                async { self.members.increment_help_count(helper).await.map_err(map_member_error) },
            )
            .await;
            self.notify(
                Audience::Member(helper),
                NotificationKind::RequestFulfilled { request_id: id },
            )
            .await;
        }
        Ok(fulfilled)
    }

    async fn delete(&self, caller: Principal, id: RequestId) -> Result<(), Error> {
        let request = self.load_owned(caller, id).await?;
        let now = self.clock.utc();
        if request.status != RequestStatus::Open {
            return Err(Error::conflict(format!(
                "only an open request can be deleted; this one is {}",
                request.status
            )));
        }
        if now > request.deletion_deadline() {
            return Err(Error::conflict(format!(
                "requests can only be deleted within {DELETION_WINDOW_MINUTES} minutes of creation"
            )));
        }

        let cutoff = now - TimeDelta::minutes(DELETION_WINDOW_MINUTES);
        let removed = self
            .requests
            .delete_unengaged(id, cutoff)
            .await
            .map_err(map_request_error)?;
        if !removed {
            return Err(Error::conflict(
                "request can no longer be deleted because a chat has started",
            ));
        }
        info!(request_id = %id, "request deleted");
        Ok(())
    }
}

/// Request reads with lazy expiry applied.
#[derive(Clone)]
pub struct RequestQueryService<R> {
    requests: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> RequestQueryService<R> {
    /// Create a query service; `clock` decides which requests read as expired.
    pub fn new(requests: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { requests, clock }
    }
}

#[async_trait]
impl<R> RequestQuery for RequestQueryService<R>
where
    R: RequestRepository,
{
    async fn get(&self, id: RequestId) -> Result<HelpRequest, Error> {
        let request = self
            .requests
            .find(id)
            .await
            .map_err(map_request_error)?
            .ok_or_else(|| Error::not_found(format!("request {id} not found")))?;
        Ok(request.observed_at(self.clock.utc()))
    }

    async fn list(
        &self,
        filter: RequestFilter,
        page: PageRequest,
    ) -> Result<Page<HelpRequest>, Error> {
        let now = self.clock.utc();
        let found = self
            .requests
            .list(filter, now, page)
            .await
            .map_err(map_request_error)?;
        Ok(found.map(|request| request.observed_at(now)))
    }

    async fn list_mine(
        &self,
        caller: Principal,
        page: PageRequest,
    ) -> Result<Page<HelpRequest>, Error> {
        let now = self.clock.utc();
        let found = self
            .requests
            .list_by_owner(caller.member_id, page)
            .await
            .map_err(map_request_error)?;
        Ok(found.map(|request| request.observed_at(now)))
    }
}

#[cfg(test)]
#[path = "request_service_tests.rs"]
mod tests;
