//! Tests for the request lifecycle manager.

use std::sync::Arc;

use mockall::predicate::eq;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{
    MemberRepositoryError, MockChatCommand, MockMemberRepository, MockNotifier,
    MockRequestRepository, MockResponseRepository, ResponseRepositoryError,
};
use crate::domain::{
    Chat, ErrorCode, MemberId, ParticipantPair, ResponseDraft, ResponseStatus, Role,
};
use crate::test_support::{MutableClock, fixture_now, principal};

struct Harness {
    requests: MockRequestRepository,
    responses: MockResponseRepository,
    members: MockMemberRepository,
    chats: MockChatCommand,
    notifier: MockNotifier,
    clock: Arc<MutableClock>,
}

impl Harness {
    fn new() -> Self {
        Self {
            requests: MockRequestRepository::new(),
            responses: MockResponseRepository::new(),
            members: MockMemberRepository::new(),
            chats: MockChatCommand::new(),
            notifier: MockNotifier::new(),
            clock: Arc::new(MutableClock::new(fixture_now())),
        }
    }

    fn quiet_notifier(mut self) -> Self {
        self.notifier.expect_send().returning(|_, _| Ok(1));
        self
    }

    fn build(
        self,
    ) -> RequestService<MockRequestRepository, MockResponseRepository, MockMemberRepository> {
        RequestService::new(
            Arc::new(self.requests),
            Arc::new(self.responses),
            Arc::new(self.members),
            Arc::new(self.chats),
            Arc::new(self.notifier),
            self.clock,
        )
    }
}

#[fixture]
fn owner() -> Principal {
    principal(Role::User)
}

fn open_request(owner: Principal) -> HelpRequest {
    let details = RequestDraft {
        title: "Borrow a lab coat".to_owned(),
        description: "Chemistry practical at 2pm, forgot mine at home.".to_owned(),
        ..RequestDraft::default()
    }
    .validate()
    .expect("valid draft");
    HelpRequest::open(owner.member_id, details, ExpiryHours::default(), fixture_now())
}

fn in_progress(owner: Principal, helper: MemberId) -> HelpRequest {
    let mut request = open_request(owner);
    request.status = RequestStatus::InProgress;
    request.accepted_helper = Some(helper);
    request
}

#[rstest]
#[tokio::test]
async fn create_applies_default_expiry(owner: Principal) {
    let mut harness = Harness::new();
    harness.requests.expect_insert().times(1).return_once(|_| Ok(()));
    let service = harness
        .build()
        .with_default_expiry(ExpiryHours::new(12).expect("valid"));

    let request = service
        .create(
            owner,
            RequestDraft {
                title: "Need notes for lecture 4".to_owned(),
                description: "Missed the lecture due to a clinic visit.".to_owned(),
                ..RequestDraft::default()
            },
        )
        .await
        .expect("created");
    assert_eq!(request.status, RequestStatus::Open);
    assert_eq!(request.requested_by, owner.member_id);
    assert_eq!(request.expires_at, fixture_now() + TimeDelta::hours(12));
    assert!(request.accepted_helper.is_none());
}

#[rstest]
#[tokio::test]
async fn create_rejects_out_of_range_expiry(owner: Principal) {
    let mut harness = Harness::new();
    harness.requests.expect_insert().times(0);

    let err = harness
        .build()
        .create(
            owner,
            RequestDraft {
                title: "Need notes for lecture 4".to_owned(),
                description: "Missed the lecture due to a clinic visit.".to_owned(),
                expiry_hours: Some(500),
                ..RequestDraft::default()
            },
        )
        .await
        .expect_err("expiry too long");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(
        err.details().and_then(|d| d["field"].as_str()),
        Some("expiryHours")
    );
}

#[rstest]
#[tokio::test]
async fn owner_cannot_accept_own_request(owner: Principal) {
    let request = open_request(owner);
    let id = request.id;
    let mut harness = Harness::new();
    harness
        .requests
        .expect_find()
        .return_once(move |_| Ok(Some(request)));
    harness.requests.expect_claim_helper().times(0);

    let err = harness.build().accept(owner, id).await.expect_err("self accept");
    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn expired_request_cannot_be_accepted(owner: Principal) {
    let request = open_request(owner);
    let id = request.id;
    let mut harness = Harness::new();
    harness
        .requests
        .expect_find()
        .return_once(move |_| Ok(Some(request)));
    harness.requests.expect_claim_helper().times(0);
    harness.clock.advance_hours(25);

    let err = harness
        .build()
        .accept(principal(Role::User), id)
        .await
        .expect_err("expired");
    assert_eq!(err.code(), ErrorCode::Conflict);
    assert_eq!(err.message(), "request has expired");
}

#[rstest]
#[tokio::test]
async fn losing_the_claim_is_a_conflict_without_side_effects(owner: Principal) {
    let request = open_request(owner);
    let id = request.id;
    let mut harness = Harness::new();
    harness
        .requests
        .expect_find()
        .return_once(move |_| Ok(Some(request)));
    harness
        .responses
        .expect_list_for_request()
        .return_once(|_| Ok(Vec::new()));
    harness
        .requests
        .expect_claim_helper()
        .return_once(|_, _, _| Ok(None));
    harness.chats.expect_find_or_create().times(0);
    harness.notifier.expect_send().times(0);

    let err = harness
        .build()
        .accept(principal(Role::User), id)
        .await
        .expect_err("second accept");
    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn helper_accept_provisions_chat_and_rejects_others(owner: Principal) {
    let helper = principal(Role::User);
    let request = open_request(owner);
    let id = request.id;
    let claimed = in_progress(owner, helper.member_id);
    let chat = Chat::new(
        id,
        ParticipantPair::new(owner.member_id, helper.member_id).expect("distinct"),
        fixture_now(),
    );
    let chat_id = chat.id;
    let sibling = HelpResponse::pending(
        id,
        MemberId::random(),
        ResponseDraft::new("I have a spare coat", None).expect("valid"),
        fixture_now(),
    );
    let mut rejected_sibling = sibling.clone();
    rejected_sibling.status = ResponseStatus::Rejected;

    let mut harness = Harness::new();
    harness
        .requests
        .expect_find()
        .return_once(move |_| Ok(Some(request)));
    harness
        .requests
        .expect_claim_helper()
        .with(eq(id), eq(helper.member_id), eq(fixture_now()))
        .times(1)
        .return_once(move |_, _, _| Ok(Some(claimed)));
    let listed = vec![sibling.clone()];
    harness
        .responses
        .expect_list_for_request()
        .with(eq(id))
        .times(2)
        .returning(move |_| Ok(listed.clone()));
    harness.responses.expect_mark_accepted().times(0);
    harness
        .responses
        .expect_reject_pending_siblings()
        .with(eq(id), eq(None), eq(fixture_now()))
        .times(1)
        .return_once(move |_, _, _| Ok(vec![rejected_sibling]));
    harness
        .chats
        .expect_find_or_create()
        .with(eq(id), eq(owner.member_id), eq(helper.member_id))
        .times(1)
        .return_once(move |_, _, _| Ok(chat));
    harness
        .notifier
        .expect_send()
        .withf(move |audience, kind| {
            *audience == Audience::Member(owner.member_id)
                && kind.type_name() == "request_accepted"
        })
        .times(1)
        .returning(|_, _| Ok(1));
    harness
        .notifier
        .expect_send()
        .withf(move |audience, kind| {
            *audience == Audience::Member(sibling.responder)
                && kind.type_name() == "response_rejected"
        })
        .times(1)
        .returning(|_, _| Ok(1));

    let accepted = harness.build().accept(helper, id).await.expect("accepted");
    assert_eq!(accepted.request.status, RequestStatus::InProgress);
    assert_eq!(accepted.request.accepted_helper, Some(helper.member_id));
    assert_eq!(accepted.chat.id, chat_id);
}

fn response_from(request: &HelpRequest, responder: MemberId, status: ResponseStatus) -> HelpResponse {
    let mut response = HelpResponse::pending(
        request.id,
        responder,
        ResponseDraft::new("I can bring one to the lab", None).expect("valid"),
        fixture_now(),
    );
    response.status = status;
    response
}

fn chat_between(request: RequestId, owner: Principal, helper: Principal) -> Chat {
    Chat::new(
        request,
        ParticipantPair::new(owner.member_id, helper.member_id).expect("distinct"),
        fixture_now(),
    )
}

#[rstest]
#[tokio::test]
async fn helper_accept_defers_to_an_unfinished_owner_accept(owner: Principal) {
    let helper = principal(Role::User);
    let request = open_request(owner);
    let id = request.id;
    let chosen = response_from(&request, MemberId::random(), ResponseStatus::Accepted);
    let own = response_from(&request, helper.member_id, ResponseStatus::Pending);

    let mut harness = Harness::new();
    harness
        .requests
        .expect_find()
        .return_once(move |_| Ok(Some(request)));
    harness
        .responses
        .expect_list_for_request()
        .return_once(move |_| Ok(vec![chosen, own]));
    harness.requests.expect_claim_helper().times(0);
    harness.chats.expect_find_or_create().times(0);
    harness.notifier.expect_send().times(0);

    let err = harness.build().accept(helper, id).await.expect_err("owner accept pending");
    assert_eq!(err.code(), ErrorCode::Conflict);
    assert_eq!(err.message(), "the owner has already accepted another response");
}

#[rstest]
#[tokio::test]
async fn helper_claim_revokes_an_acceptance_that_lost_the_race(owner: Principal) {
    let helper = principal(Role::User);
    let request = open_request(owner);
    let id = request.id;
    let claimed = in_progress(owner, helper.member_id);
    let chat = chat_between(id, owner, helper);
    let before = vec![
        response_from(&request, MemberId::random(), ResponseStatus::Pending),
        response_from(&request, helper.member_id, ResponseStatus::Pending),
    ];
    let stale_id = before[0].id;
    let stale_responder = before[0].responder;
    let own_id = before[1].id;
    let mut after = before.clone();
    after[0].status = ResponseStatus::Accepted;
    let mut own_accepted = after[1].clone();
    own_accepted.status = ResponseStatus::Accepted;

    let mut harness = Harness::new();
    harness
        .requests
        .expect_find()
        .return_once(move |_| Ok(Some(request)));
    let mut listings = vec![before, after].into_iter();
    harness
        .responses
        .expect_list_for_request()
        .times(2)
        .returning(move |_| Ok(listings.next().unwrap_or_default()));
    harness
        .requests
        .expect_claim_helper()
        .return_once(move |_, _, _| Ok(Some(claimed)));
    harness
        .responses
        .expect_revoke_acceptance()
        .with(eq(stale_id), eq(fixture_now()))
        .times(1)
        .return_once(|_, _| Ok(()));
    harness
        .responses
        .expect_mark_accepted()
        .with(eq(own_id), eq(fixture_now()))
        .times(1)
        .return_once(move |_, _| Ok(Some(own_accepted)));
    harness
        .responses
        .expect_reject_pending_siblings()
        .with(eq(id), eq(Some(own_id)), eq(fixture_now()))
        .times(1)
        .return_once(|_, _, _| Ok(Vec::new()));
    harness
        .chats
        .expect_find_or_create()
        .times(1)
        .return_once(move |_, _, _| Ok(chat));
    harness
        .notifier
        .expect_send()
        .withf(move |audience, kind| {
            *audience == Audience::Member(stale_responder)
                && kind.type_name() == "response_rejected"
        })
        .times(1)
        .returning(|_, _| Ok(1));
    harness
        .notifier
        .expect_send()
        .withf(move |audience, kind| {
            *audience == Audience::Member(owner.member_id)
                && kind.type_name() == "request_accepted"
        })
        .times(1)
        .returning(|_, _| Ok(1));

    let accepted = harness.build().accept(helper, id).await.expect("accepted");
    assert_eq!(accepted.request.accepted_helper, Some(helper.member_id));
}

#[rstest]
#[tokio::test]
async fn helper_claim_stands_when_response_bookkeeping_fails(owner: Principal) {
    let helper = principal(Role::User);
    let request = open_request(owner);
    let id = request.id;
    let claimed = in_progress(owner, helper.member_id);
    let chat = chat_between(id, owner, helper);
    let own = response_from(&request, helper.member_id, ResponseStatus::Pending);

    let mut harness = Harness::new().quiet_notifier();
    harness
        .requests
        .expect_find()
        .return_once(move |_| Ok(Some(request)));
    harness
        .responses
        .expect_list_for_request()
        .times(2)
        .returning(move |_| Ok(vec![own.clone()]));
    harness
        .requests
        .expect_claim_helper()
        .return_once(move |_, _, _| Ok(Some(claimed)));
    harness
        .responses
        .expect_mark_accepted()
        .return_once(|_, _| Err(ResponseRepositoryError::connection("pool exhausted")));
    harness
        .responses
        .expect_reject_pending_siblings()
        .return_once(|_, _, _| Err(ResponseRepositoryError::connection("pool exhausted")));
    harness
        .chats
        .expect_find_or_create()
        .times(1)
        .return_once(move |_, _, _| Ok(chat));

    let accepted = harness.build().accept(helper, id).await.expect("claim stands");
    assert_eq!(accepted.request.status, RequestStatus::InProgress);
}

#[rstest]
#[case(RequestStatus::Fulfilled)]
#[case(RequestStatus::Cancelled)]
#[tokio::test]
async fn closed_requests_cannot_be_edited(owner: Principal, #[case] status: RequestStatus) {
    let mut request = open_request(owner);
    request.status = status;
    let id = request.id;
    let mut harness = Harness::new();
    harness
        .requests
        .expect_find()
        .return_once(move |_| Ok(Some(request)));
    harness.requests.expect_update_details().times(0);

    let edit = RequestEdit {
        title: Some("Borrow a lab coat, size M".to_owned()),
        ..RequestEdit::default()
    };
    let err = harness
        .build()
        .update(owner, id, edit)
        .await
        .expect_err("closed");
    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn only_the_owner_may_edit(owner: Principal) {
    let request = open_request(owner);
    let id = request.id;
    let mut harness = Harness::new();
    harness
        .requests
        .expect_find()
        .return_once(move |_| Ok(Some(request)));

    let err = harness
        .build()
        .update(principal(Role::Admin), id, RequestEdit::default())
        .await
        .expect_err("stranger");
    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn cancelling_in_progress_notifies_helper(owner: Principal) {
    let helper = MemberId::random();
    let request = in_progress(owner, helper);
    let id = request.id;
    let mut cancelled = request.clone();
    cancelled.status = RequestStatus::Cancelled;
    cancelled.accepted_helper = None;

    let mut harness = Harness::new();
    harness
        .requests
        .expect_find()
        .return_once(move |_| Ok(Some(request)));
    harness
        .requests
        .expect_cancel()
        .times(1)
        .return_once(move |_, _| Ok(Some(cancelled)));
    harness
        .notifier
        .expect_send()
        .withf(move |audience, kind| {
            *audience == Audience::Member(helper) && kind.type_name() == "request_cancelled"
        })
        .times(1)
        .returning(|_, _| Ok(1));

    let result = harness.build().cancel(owner, id).await.expect("cancelled");
    assert_eq!(result.status, RequestStatus::Cancelled);
    assert!(result.accepted_helper.is_none());
}

#[rstest]
#[tokio::test]
async fn cancelling_fulfilled_is_a_conflict(owner: Principal) {
    let mut request = in_progress(owner, MemberId::random());
    request.status = RequestStatus::Fulfilled;
    let id = request.id;
    let mut harness = Harness::new();
    harness
        .requests
        .expect_find()
        .return_once(move |_| Ok(Some(request)));
    harness.requests.expect_cancel().times(0);

    let err = harness.build().cancel(owner, id).await.expect_err("fulfilled");
    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn cancelling_twice_is_idempotent(owner: Principal) {
    let mut request = open_request(owner);
    request.status = RequestStatus::Cancelled;
    let id = request.id;
    let mut harness = Harness::new();
    harness
        .requests
        .expect_find()
        .return_once(move |_| Ok(Some(request)));
    harness.requests.expect_cancel().times(0);

    let result = harness.build().cancel(owner, id).await.expect("no-op");
    assert_eq!(result.status, RequestStatus::Cancelled);
}

#[rstest]
#[tokio::test]
async fn fulfilment_survives_help_count_failure(owner: Principal) {
    let helper = MemberId::random();
    let request = in_progress(owner, helper);
    let id = request.id;
    let mut fulfilled = request.clone();
    fulfilled.status = RequestStatus::Fulfilled;
    fulfilled.fulfilled_at = Some(fixture_now());

    let mut harness = Harness::new().quiet_notifier();
    harness
        .requests
        .expect_find()
        .return_once(move |_| Ok(Some(request)));
    harness
        .requests
        .expect_fulfill()
        .return_once(move |_, _| Ok(Some(fulfilled)));
    harness
        .members
        .expect_increment_help_count()
        .with(eq(helper))
        .times(1)
        .return_once(|_| Err(MemberRepositoryError::connection("replica lag")));

    let result = harness.build().fulfill(owner, id).await.expect("fulfilled");
    assert_eq!(result.status, RequestStatus::Fulfilled);
    assert_eq!(result.fulfilled_at, Some(fixture_now()));
}

#[rstest]
#[case(RequestStatus::Open)]
#[case(RequestStatus::Cancelled)]
#[tokio::test]
async fn fulfil_requires_in_progress(owner: Principal, #[case] status: RequestStatus) {
    let mut request = open_request(owner);
    request.status = status;
    let id = request.id;
    let mut harness = Harness::new();
    harness
        .requests
        .expect_find()
        .return_once(move |_| Ok(Some(request)));
    harness.requests.expect_fulfill().times(0);

    let err = harness.build().fulfill(owner, id).await.expect_err("not in progress");
    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[rstest]
#[case(4, true)]
#[case(5, true)]
#[case(6, false)]
#[tokio::test]
async fn deletion_window_is_five_minutes(
    owner: Principal,
    #[case] minutes: i64,
    #[case] allowed: bool,
) {
    let request = open_request(owner);
    let id = request.id;
    let mut harness = Harness::new();
    harness
        .requests
        .expect_find()
        .return_once(move |_| Ok(Some(request)));
    harness
        .requests
        .expect_delete_unengaged()
        .times(usize::from(allowed))
        .returning(|_, _| Ok(true));
    harness.clock.advance_minutes(minutes);

    let result = harness.build().delete(owner, id).await;
    match (allowed, result) {
        (true, Ok(())) => {}
        (false, Err(err)) => assert_eq!(err.code(), ErrorCode::Conflict),
        (true, Err(err)) => panic!("expected deletion, got {err:?}"),
        (false, Ok(())) => panic!("expected conflict after {minutes} minutes"),
    }
}

#[rstest]
#[tokio::test]
async fn deletion_refused_once_a_chat_exists(owner: Principal) {
    let request = open_request(owner);
    let id = request.id;
    let mut harness = Harness::new();
    harness
        .requests
        .expect_find()
        .return_once(move |_| Ok(Some(request)));
    harness
        .requests
        .expect_delete_unengaged()
        .return_once(|_, _| Ok(false));

    let err = harness.build().delete(owner, id).await.expect_err("chat exists");
    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn query_reports_expired_status(owner: Principal) {
    let request = open_request(owner);
    let id = request.id;
    let mut requests = MockRequestRepository::new();
    requests
        .expect_find()
        .return_once(move |_| Ok(Some(request)));
    let clock = Arc::new(MutableClock::new(fixture_now()));
    clock.advance_hours(24);

    let fetched = RequestQueryService::new(Arc::new(requests), clock)
        .get(id)
        .await
        .expect("found");
    assert_eq!(fetched.status, RequestStatus::Expired);
}
