//! Composition root shared by the server binary and integration tests.
//!
//! Builds every domain service over one set of repository adapters and
//! exposes them to the HTTP layer as [`HttpState`]. The same function wires
//! the in-memory store and the Diesel repositories, so both back ends run
//! identical service graphs.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    ChatRepository, IdentityVerifier, MemberRepository, ModerationMetrics,
    NotificationRepository, Notifier, ReportRepository, ReportValidator, RequestRepository,
    ResponseRepository,
};
use crate::domain::{
    BlockThreshold, ChatService, DEFAULT_AT_RISK_THRESHOLD, ExpiryHours, MemberService,
    ModerationQueryService, ModerationService, NotificationInboxService, NotifierService,
    RequestQueryService, RequestService, ResponseQueryService, ResponseService,
};
use crate::inbound::http::state::{HttpState, HttpStatePorts};

/// Storage adapters, one per repository port.
pub struct Repositories<M, R, S, C, P, N> {
    pub members: Arc<M>,
    pub requests: Arc<R>,
    pub responses: Arc<S>,
    pub chats: Arc<C>,
    pub reports: Arc<P>,
    pub notifications: Arc<N>,
}

impl<T> Repositories<T, T, T, T, T, T> {
    /// Use one adapter for every port.
    pub fn shared(store: Arc<T>) -> Self {
        Self {
            members: store.clone(),
            requests: store.clone(),
            responses: store.clone(),
            chats: store.clone(),
            reports: store.clone(),
            notifications: store,
        }
    }
}

/// Tunable marketplace rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
    pub block_threshold: BlockThreshold,
    pub at_risk_threshold: u32,
    pub default_expiry: ExpiryHours,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            block_threshold: BlockThreshold::default(),
            at_risk_threshold: DEFAULT_AT_RISK_THRESHOLD,
            default_expiry: ExpiryHours::default(),
        }
    }
}

/// Non-storage collaborators.
#[derive(Clone)]
pub struct Collaborators {
    pub verifier: Arc<dyn IdentityVerifier>,
    pub validator: Arc<dyn ReportValidator>,
    pub metrics: Arc<dyn ModerationMetrics>,
    pub clock: Arc<dyn Clock>,
}

/// Build the HTTP state from repositories, collaborators and policy.
pub fn build_http_state<M, R, S, C, P, N>(
    repositories: Repositories<M, R, S, C, P, N>,
    collaborators: Collaborators,
    policy: Policy,
) -> HttpState
where
    M: MemberRepository + 'static,
    R: RequestRepository + 'static,
    S: ResponseRepository + 'static,
    C: ChatRepository + 'static,
    P: ReportRepository + 'static,
    N: NotificationRepository + 'static,
{
    let Repositories {
        members,
        requests,
        responses,
        chats,
        reports,
        notifications,
    } = repositories;
    let Collaborators {
        verifier,
        validator,
        metrics,
        clock,
    } = collaborators;

    let notifier: Arc<dyn Notifier> = Arc::new(NotifierService::new(
        members.clone(),
        notifications.clone(),
        clock.clone(),
    ));
    let chat_service = Arc::new(ChatService::new(chats, notifier.clone(), clock.clone()));
    let request_service = Arc::new(
        RequestService::new(
            requests.clone(),
            responses.clone(),
            members.clone(),
            chat_service.clone(),
            notifier.clone(),
            clock.clone(),
        )
        .with_default_expiry(policy.default_expiry),
    );
    let response_service = Arc::new(ResponseService::new(
        requests.clone(),
        responses.clone(),
        chat_service.clone(),
        notifier.clone(),
        clock.clone(),
    ));
    let moderation = Arc::new(
        ModerationService::new(
            members.clone(),
            reports.clone(),
            validator,
            notifier,
            metrics,
            clock.clone(),
        )
        .with_threshold(policy.block_threshold),
    );
    let moderation_query = Arc::new(
        ModerationQueryService::new(members.clone(), reports)
            .with_at_risk_threshold(policy.at_risk_threshold),
    );

    HttpState::new(HttpStatePorts {
        members: Arc::new(MemberService::new(members, verifier, clock.clone())),
        requests: request_service,
        requests_query: Arc::new(RequestQueryService::new(requests.clone(), clock)),
        responses: response_service,
        responses_query: Arc::new(ResponseQueryService::new(requests, responses)),
        chats: chat_service.clone(),
        chats_query: chat_service,
        moderation,
        moderation_query,
        inbox: Arc::new(NotificationInboxService::new(notifications)),
    })
}

