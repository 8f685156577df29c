//! Tests for the response matching engine.

use std::sync::Arc;

use mockall::Sequence;
use mockall::predicate::eq;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{
    MockChatCommand, MockNotifier, MockRequestRepository, MockResponseRepository,
};
use crate::domain::{
    Chat, ErrorCode, ExpiryHours, MemberId, ParticipantPair, RequestDraft, Role,
};
use crate::test_support::{MutableClock, fixture_now, principal};

struct Harness {
    requests: MockRequestRepository,
    responses: MockResponseRepository,
    chats: MockChatCommand,
    notifier: MockNotifier,
}

impl Harness {
    fn new() -> Self {
        Self {
            requests: MockRequestRepository::new(),
            responses: MockResponseRepository::new(),
            chats: MockChatCommand::new(),
            notifier: MockNotifier::new(),
        }
    }

    fn quiet_notifier(mut self) -> Self {
        self.notifier.expect_send().returning(|_, _| Ok(1));
        self
    }

    fn build(self) -> ResponseService<MockRequestRepository, MockResponseRepository> {
        ResponseService::new(
            Arc::new(self.requests),
            Arc::new(self.responses),
            Arc::new(self.chats),
            Arc::new(self.notifier),
            Arc::new(MutableClock::new(fixture_now())),
        )
    }
}

#[fixture]
fn owner() -> Principal {
    principal(Role::User)
}

fn open_request(owner: Principal) -> HelpRequest {
    let details = RequestDraft {
        title: "Carry boxes to hostel B".to_owned(),
        description: "Moving rooms, three boxes, ten minutes of work.".to_owned(),
        ..RequestDraft::default()
    }
    .validate()
    .expect("valid draft");
    HelpRequest::open(owner.member_id, details, ExpiryHours::default(), fixture_now())
}

fn pending(request: &HelpRequest, responder: MemberId) -> HelpResponse {
    HelpResponse::pending(
        request.id,
        responder,
        ResponseDraft::new("I can help after 5pm", None).expect("valid draft"),
        fixture_now(),
    )
}

fn with_status(mut response: HelpResponse, status: ResponseStatus) -> HelpResponse {
    response.status = status;
    response
}

fn draft() -> ResponseDraft {
    ResponseDraft::new("Happy to help with this", None).expect("valid draft")
}

#[rstest]
#[tokio::test]
async fn submit_notifies_owner(owner: Principal) {
    let responder = principal(Role::User);
    let request = open_request(owner);
    let request_id = request.id;
    let mut harness = Harness::new();
    harness
        .requests
        .expect_find()
        .return_once(move |_| Ok(Some(request)));
    harness
        .responses
        .expect_find_for_responder()
        .return_once(|_, _| Ok(None));
    harness.responses.expect_insert().times(1).return_once(|_| Ok(()));
    harness
        .notifier
        .expect_send()
        .withf(move |audience, kind| {
            *audience == Audience::Member(owner.member_id) && kind.type_name() == "new_response"
        })
        .times(1)
        .return_once(|_, _| Ok(1));

    let response = harness
        .build()
        .submit(responder, request_id, draft())
        .await
        .expect("submitted");
    assert_eq!(response.status, ResponseStatus::Pending);
    assert_eq!(response.responder, responder.member_id);
}

#[rstest]
#[tokio::test]
async fn owner_cannot_respond_to_own_request(owner: Principal) {
    let request = open_request(owner);
    let request_id = request.id;
    let mut harness = Harness::new();
    harness
        .requests
        .expect_find()
        .return_once(move |_| Ok(Some(request)));
    harness.responses.expect_insert().times(0);

    let err = harness
        .build()
        .submit(owner, request_id, draft())
        .await
        .expect_err("own request");
    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn second_response_from_same_member_conflicts(owner: Principal) {
    let responder = principal(Role::User);
    let request = open_request(owner);
    let request_id = request.id;
    let existing = pending(&request, responder.member_id);
    let mut harness = Harness::new();
    harness
        .requests
        .expect_find()
        .return_once(move |_| Ok(Some(request)));
    harness
        .responses
        .expect_find_for_responder()
        .return_once(move |_, _| Ok(Some(existing)));
    harness.responses.expect_insert().times(0);

    let err = harness
        .build()
        .submit(responder, request_id, draft())
        .await
        .expect_err("duplicate");
    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn racing_duplicate_insert_becomes_conflict(owner: Principal) {
    let request = open_request(owner);
    let request_id = request.id;
    let mut harness = Harness::new();
    harness
        .requests
        .expect_find()
        .return_once(move |_| Ok(Some(request)));
    harness
        .responses
        .expect_find_for_responder()
        .return_once(|_, _| Ok(None));
    harness
        .responses
        .expect_insert()
        .return_once(|_| Err(ResponseRepositoryError::duplicate("responses_request_responder_key")));
    harness.notifier.expect_send().times(0);

    let err = harness
        .build()
        .submit(principal(Role::User), request_id, draft())
        .await
        .expect_err("race loser");
    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn accept_marks_response_before_claiming_request(owner: Principal) {
    let request = open_request(owner);
    let request_id = request.id;
    let responder = MemberId::random();
    let response = pending(&request, responder);
    let response_id = response.id;
    let accepted = with_status(response.clone(), ResponseStatus::Accepted);
    let loser = with_status(pending(&request, MemberId::random()), ResponseStatus::Rejected);
    let mut claimed = request.clone();
    claimed.status = RequestStatus::InProgress;
    claimed.accepted_helper = Some(responder);
    let chat = Chat::new(
        request_id,
        ParticipantPair::new(owner.member_id, responder).expect("distinct"),
        fixture_now(),
    );

    let mut seq = Sequence::new();
    let mut harness = Harness::new().quiet_notifier();
    harness
        .responses
        .expect_find()
        .return_once(move |_| Ok(Some(response)));
    harness
        .requests
        .expect_find()
        .return_once(move |_| Ok(Some(request)));
    harness
        .responses
        .expect_mark_accepted()
        .with(eq(response_id), eq(fixture_now()))
        .times(1)
        .in_sequence(&mut seq)
        .return_once(move |_, _| Ok(Some(accepted)));
    harness
        .requests
        .expect_claim_helper()
        .with(eq(request_id), eq(responder), eq(fixture_now()))
        .times(1)
        .in_sequence(&mut seq)
        .return_once(move |_, _, _| Ok(Some(claimed)));
    harness
        .responses
        .expect_reject_pending_siblings()
        .with(eq(request_id), eq(Some(response_id)), eq(fixture_now()))
        .times(1)
        .in_sequence(&mut seq)
        .return_once(move |_, _, _| Ok(vec![loser]));
    harness
        .chats
        .expect_find_or_create()
        .with(eq(request_id), eq(owner.member_id), eq(responder))
        .times(1)
        .in_sequence(&mut seq)
        .return_once(move |_, _, _| Ok(chat));

    let outcome = harness
        .build()
        .accept(owner, response_id)
        .await
        .expect("accepted");
    assert_eq!(outcome.response.status, ResponseStatus::Accepted);
    assert_eq!(outcome.request.accepted_helper, Some(responder));
    assert_eq!(outcome.request.status, RequestStatus::InProgress);
}

#[rstest]
#[tokio::test]
async fn accept_after_helper_already_set_conflicts(owner: Principal) {
    let mut request = open_request(owner);
    let response = pending(&request, MemberId::random());
    let response_id = response.id;
    request.status = RequestStatus::InProgress;
    request.accepted_helper = Some(MemberId::random());
    let mut harness = Harness::new();
    harness
        .responses
        .expect_find()
        .return_once(move |_| Ok(Some(response)));
    harness
        .requests
        .expect_find()
        .return_once(move |_| Ok(Some(request)));
    harness.responses.expect_mark_accepted().times(0);

    let err = harness
        .build()
        .accept(owner, response_id)
        .await
        .expect_err("second accept");
    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn sibling_already_accepted_conflicts(owner: Principal) {
    let request = open_request(owner);
    let response = pending(&request, MemberId::random());
    let response_id = response.id;
    let mut harness = Harness::new();
    harness
        .responses
        .expect_find()
        .return_once(move |_| Ok(Some(response)));
    harness
        .requests
        .expect_find()
        .return_once(move |_| Ok(Some(request)));
    harness
        .responses
        .expect_mark_accepted()
        .return_once(|_, _| Err(ResponseRepositoryError::duplicate("one_accepted_per_request")));
    harness.requests.expect_claim_helper().times(0);

    let err = harness
        .build()
        .accept(owner, response_id)
        .await
        .expect_err("concurrent accept lost");
    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn lost_claim_revokes_acceptance(owner: Principal) {
    let request = open_request(owner);
    let response = pending(&request, MemberId::random());
    let response_id = response.id;
    let accepted = with_status(response.clone(), ResponseStatus::Accepted);
    let mut harness = Harness::new();
    harness
        .responses
        .expect_find()
        .return_once(move |_| Ok(Some(response)));
    harness
        .requests
        .expect_find()
        .return_once(move |_| Ok(Some(request)));
    harness
        .responses
        .expect_mark_accepted()
        .return_once(move |_, _| Ok(Some(accepted)));
    harness
        .requests
        .expect_claim_helper()
        .return_once(|_, _, _| Ok(None));
    harness
        .responses
        .expect_revoke_acceptance()
        .with(eq(response_id), eq(fixture_now()))
        .times(1)
        .return_once(|_, _| Ok(()));
    harness.chats.expect_find_or_create().times(0);

    let err = harness
        .build()
        .accept(owner, response_id)
        .await
        .expect_err("helper path won");
    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn only_owner_decides(owner: Principal) {
    let request = open_request(owner);
    let response = pending(&request, MemberId::random());
    let response_id = response.id;
    let mut harness = Harness::new();
    harness
        .responses
        .expect_find()
        .return_once(move |_| Ok(Some(response)));
    harness
        .requests
        .expect_find()
        .return_once(move |_| Ok(Some(request)));

    let err = harness
        .build()
        .reject(principal(Role::User), response_id)
        .await
        .expect_err("stranger");
    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[rstest]
#[case(ResponseStatus::Accepted, Some(ErrorCode::Conflict))]
#[case(ResponseStatus::Rejected, None)]
#[tokio::test]
async fn reject_guards_by_status(
    owner: Principal,
    #[case] status: ResponseStatus,
    #[case] expected: Option<ErrorCode>,
) {
    let request = open_request(owner);
    let response = with_status(pending(&request, MemberId::random()), status);
    let response_id = response.id;
    let mut harness = Harness::new();
    harness
        .responses
        .expect_find()
        .return_once(move |_| Ok(Some(response)));
    harness
        .requests
        .expect_find()
        .return_once(move |_| Ok(Some(request)));
    harness.responses.expect_mark_rejected().times(0);
    harness.notifier.expect_send().times(0);

    let result = harness.build().reject(owner, response_id).await;
    match expected {
        Some(code) => assert_eq!(result.expect_err("guarded").code(), code),
        None => assert_eq!(result.expect("idempotent").status, ResponseStatus::Rejected),
    }
}

#[rstest]
#[tokio::test]
async fn non_owner_sees_only_own_response(owner: Principal) {
    let caller = principal(Role::User);
    let request = open_request(owner);
    let request_id = request.id;
    let own = pending(&request, caller.member_id);
    let mut requests = MockRequestRepository::new();
    requests
        .expect_find()
        .return_once(move |_| Ok(Some(request)));
    let mut responses = MockResponseRepository::new();
    responses.expect_list_for_request().times(0);
    responses
        .expect_find_for_responder()
        .with(eq(request_id), eq(caller.member_id))
        .return_once(move |_, _| Ok(Some(own)));

    let listed = ResponseQueryService::new(Arc::new(requests), Arc::new(responses))
        .list_for_request(caller, request_id)
        .await
        .expect("listed");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].responder, caller.member_id);
}
