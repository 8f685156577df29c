//! Guard and end-to-end tests for the in-memory store.

use std::sync::Arc;

use rstest::rstest;

use super::MemoryStore;
use crate::domain::ports::{
    ChatRepository, ChatRepositoryError, HeuristicReportValidator, MemberRepository,
    ModerationCommand, NoOpModerationMetrics, NotificationRepository, Notifier,
    ReportRepository, ReportRepositoryError, RequestCommand, RequestFilter, RequestQuery,
    RequestRepository, ResponseCommand, ResponseRepository, ResponseRepositoryError,
};
use crate::domain::{
    Audience, BlockThreshold, Chat, ChatService, ErrorCode, ExpiryHours, HelpRequest,
    HelpResponse, Member, ModerationService, NotificationKind, NotifierService, PageRequest,
    ParticipantPair, Principal, Report, ReportClaim, ReportReason, RequestDraft,
    RequestQueryService, RequestService, RequestStatus, ResetOptions, ResponseDraft,
    ResponseService, ResponseStatus, Role, TrustStatus, VerifiedIdentity,
};
use crate::test_support::{MutableClock, fixture_now, member_for, principal};

fn draft() -> RequestDraft {
    RequestDraft {
        title: "Need a calculator".to_owned(),
        description: "Exam in an hour and my batteries died.".to_owned(),
        ..RequestDraft::default()
    }
}

fn open_request(owner: Principal) -> HelpRequest {
    let details = draft().validate().expect("valid draft");
    HelpRequest::open(owner.member_id, details, ExpiryHours::default(), fixture_now())
}

fn pending(request: &HelpRequest, responder: Principal) -> HelpResponse {
    let body = ResponseDraft::new("I have a spare one", None).expect("valid response");
    HelpResponse::pending(request.id, responder.member_id, body, fixture_now())
}

async fn seeded(store: &MemoryStore, caller: Principal) -> Member {
    let member = member_for(caller, TrustStatus::default());
    let identity = VerifiedIdentity {
        member_id: member.id,
        display_name: member.display_name.clone(),
        role: member.role,
        is_active: true,
    };
    store
        .upsert_identity(&identity, fixture_now())
        .await
        .expect("upsert")
}

struct Marketplace {
    store: Arc<MemoryStore>,
    clock: Arc<MutableClock>,
    requests: RequestService<MemoryStore, MemoryStore, MemoryStore>,
    responses: ResponseService<MemoryStore, MemoryStore>,
    queries: RequestQueryService<MemoryStore>,
}

fn marketplace() -> Marketplace {
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(MutableClock::new(fixture_now()));
    let notifier: Arc<dyn Notifier> = Arc::new(NotifierService::new(
        store.clone(),
        store.clone(),
        clock.clone(),
    ));
    let chats = Arc::new(ChatService::new(store.clone(), notifier.clone(), clock.clone()));
    Marketplace {
        requests: RequestService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            chats.clone(),
            notifier.clone(),
            clock.clone(),
        ),
        responses: ResponseService::new(
            store.clone(),
            store.clone(),
            chats,
            notifier,
            clock.clone(),
        ),
        queries: RequestQueryService::new(store.clone(), clock.clone()),
        store,
        clock,
    }
}

#[tokio::test]
async fn concurrent_claims_admit_one_helper() {
    let store = Arc::new(MemoryStore::new());
    let request = open_request(principal(Role::User));
    store.insert_request(&request).await;

    let first = principal(Role::User).member_id;
    let second = principal(Role::User).member_id;
    let (a, b) = tokio::join!(
        RequestRepository::claim_helper(store.as_ref(), request.id, first, fixture_now()),
        RequestRepository::claim_helper(store.as_ref(), request.id, second, fixture_now()),
    );
    let winners = [a.expect("claim"), b.expect("claim")]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>();

    assert_eq!(winners.len(), 1);
    assert_eq!(winners[0].status, RequestStatus::InProgress);
}

#[tokio::test]
async fn claim_refuses_expired_request() {
    let store = MemoryStore::new();
    let request = open_request(principal(Role::User));
    store.insert_request(&request).await;

    let late = request.expires_at;
    let claimed = store
        .claim_helper(request.id, principal(Role::User).member_id, late)
        .await
        .expect("claim");

    assert!(claimed.is_none());
}

#[tokio::test]
async fn cancel_clears_accepted_helper() {
    let store = MemoryStore::new();
    let request = open_request(principal(Role::User));
    store.insert_request(&request).await;
    store
        .claim_helper(request.id, principal(Role::User).member_id, fixture_now())
        .await
        .expect("claim");

    let cancelled = RequestRepository::cancel(&store, request.id, fixture_now())
        .await
        .expect("cancel")
        .expect("was in progress");

    assert_eq!(cancelled.status, RequestStatus::Cancelled);
    assert!(cancelled.accepted_helper.is_none());
}

#[tokio::test]
async fn second_response_from_same_member_is_duplicate() {
    let store = MemoryStore::new();
    let request = open_request(principal(Role::User));
    let helper = principal(Role::User);
    ResponseRepository::insert(&store, &pending(&request, helper))
        .await
        .expect("first insert");

    let err = ResponseRepository::insert(&store, &pending(&request, helper))
        .await
        .expect_err("second insert");

    assert!(matches!(
        err,
        ResponseRepositoryError::Duplicate { .. }
    ));
}

#[tokio::test]
async fn only_one_response_per_request_is_accepted() {
    let store = MemoryStore::new();
    let request = open_request(principal(Role::User));
    let first = pending(&request, principal(Role::User));
    let second = pending(&request, principal(Role::User));
    ResponseRepository::insert(&store, &first).await.expect("insert");
    ResponseRepository::insert(&store, &second).await.expect("insert");

    store
        .mark_accepted(first.id, fixture_now())
        .await
        .expect("accept")
        .expect("pending");
    let err = store
        .mark_accepted(second.id, fixture_now())
        .await
        .expect_err("sibling accepted");
    let again = store
        .mark_accepted(first.id, fixture_now())
        .await
        .expect("retry")
        .expect("still accepted");

    assert!(matches!(
        err,
        ResponseRepositoryError::Duplicate { .. }
    ));
    assert_eq!(again.status, ResponseStatus::Accepted);
}

#[tokio::test]
async fn chat_pair_is_unique_per_request() {
    let store = MemoryStore::new();
    let request = open_request(principal(Role::User));
    let pair = ParticipantPair::new(request.requested_by, principal(Role::User).member_id)
        .expect("distinct");
    ChatRepository::insert(&store, &Chat::new(request.id, pair, fixture_now()))
        .await
        .expect("insert");

    let err = ChatRepository::insert(&store, &Chat::new(request.id, pair, fixture_now()))
        .await
        .expect_err("duplicate");

    assert!(matches!(
        err,
        ChatRepositoryError::Duplicate { .. }
    ));
    assert!(store.exists_for_request(request.id).await.expect("exists"));
}

#[tokio::test]
async fn full_helper_flow_through_services() {
    let market = marketplace();
    let owner = principal(Role::User);
    let helper = principal(Role::User);
    let rival = principal(Role::User);
    for caller in [owner, helper, rival] {
        seeded(&market.store, caller).await;
    }

    let request = market.requests.create(owner, draft()).await.expect("create");
    market
        .responses
        .submit(helper, request.id, ResponseDraft::new("On my way", None).expect("valid"))
        .await
        .expect("helper response");
    let losing = market
        .responses
        .submit(rival, request.id, ResponseDraft::new("I can help too", None).expect("valid"))
        .await
        .expect("rival response");

    let accepted = market.requests.accept(helper, request.id).await.expect("accept");
    assert_eq!(accepted.request.accepted_helper, Some(helper.member_id));
    assert!(accepted.chat.participants.contains(owner.member_id));

    let rejected = ResponseRepository::find(market.store.as_ref(), losing.id)
        .await
        .expect("find")
        .expect("stored");
    assert_eq!(rejected.status, ResponseStatus::Rejected);

    let fulfilled = market.requests.fulfill(owner, request.id).await.expect("fulfill");
    assert_eq!(fulfilled.status, RequestStatus::Fulfilled);
    let member = MemberRepository::find(market.store.as_ref(), helper.member_id)
        .await
        .expect("find")
        .expect("stored");
    assert_eq!(member.help_count, 1);

    let unread = market
        .store
        .count_unread(rival.member_id)
        .await
        .expect("count");
    assert_eq!(unread, 1);
}

#[rstest]
#[case(4, true)]
#[case(6, false)]
#[tokio::test]
async fn deletion_respects_window(#[case] minutes: i64, #[case] allowed: bool) {
    let market = marketplace();
    let owner = principal(Role::User);
    seeded(&market.store, owner).await;
    let request = market.requests.create(owner, draft()).await.expect("create");

    market.clock.advance_minutes(minutes);
    let outcome = market.requests.delete(owner, request.id).await;

    assert_eq!(outcome.is_ok(), allowed);
    if !allowed {
        let err = outcome.expect_err("outside window");
        assert_eq!(err.code(), ErrorCode::Conflict);
    }
}

#[tokio::test]
async fn deletion_refused_once_chat_exists() {
    let store = MemoryStore::new();
    let owner = principal(Role::User);
    let request = open_request(owner);
    store.insert_request(&request).await;
    let pair = ParticipantPair::new(owner.member_id, principal(Role::User).member_id)
        .expect("distinct");
    ChatRepository::insert(&store, &Chat::new(request.id, pair, fixture_now()))
        .await
        .expect("chat");

    let cutoff = fixture_now() - chrono::TimeDelta::minutes(5);
    let deleted = store
        .delete_unengaged(request.id, cutoff)
        .await
        .expect("delete");

    assert!(!deleted);
}

#[tokio::test]
async fn expired_requests_drop_out_of_open_listing() {
    let market = marketplace();
    let owner = principal(Role::User);
    seeded(&market.store, owner).await;
    market.requests.create(owner, draft()).await.expect("create");

    market.clock.advance_hours(25);
    let open = market
        .queries
        .list(RequestFilter::default(), PageRequest::default())
        .await
        .expect("list");
    let expired = market
        .queries
        .list(
            RequestFilter {
                status: RequestStatus::Expired,
                ..RequestFilter::default()
            },
            PageRequest::default(),
        )
        .await
        .expect("list");

    assert!(open.items.is_empty());
    assert_eq!(expired.items.len(), 1);
    assert_eq!(expired.items[0].status, RequestStatus::Expired);
}

#[tokio::test]
async fn eleventh_report_blocks_and_reset_clears_history() {
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(MutableClock::new(fixture_now()));
    let notifier = Arc::new(NotifierService::new(store.clone(), store.clone(), clock.clone()));
    let moderation = ModerationService::new(
        store.clone(),
        store.clone(),
        Arc::new(HeuristicReportValidator),
        notifier,
        Arc::new(NoOpModerationMetrics),
        clock,
    )
    .with_threshold(BlockThreshold::default());
    let admin = principal(Role::Admin);
    let target = principal(Role::User);
    seeded(&store, admin).await;
    seeded(&store, target).await;

    let claim = ReportClaim::new(ReportReason::Spam, "Posts the same advert everywhere")
        .expect("valid claim");
    for _ in 0..11 {
        let reporter = principal(Role::User);
        seeded(&store, reporter).await;
        moderation
            .create_report(reporter, target.member_id, claim.clone())
            .await
            .expect("report");
    }

    let blocked = MemberRepository::find(store.as_ref(), target.member_id)
        .await
        .expect("find")
        .expect("stored");
    assert!(blocked.trust.is_blocked);
    assert_eq!(blocked.trust.warning_count, 11);
    assert_eq!(store.warning_history(target.member_id).await.expect("history").len(), 11);

    let reset = moderation
        .reset_warnings(admin, target.member_id, ResetOptions::default())
        .await
        .expect("reset");
    assert!(!reset.trust.is_blocked);
    assert!(store.warning_history(target.member_id).await.expect("history").is_empty());
    let page = ReportRepository::list(store.as_ref(), None, PageRequest::default())
        .await
        .expect("reports");
    assert_eq!(page.total, 11);
}

#[tokio::test]
async fn filing_with_warning_is_all_or_nothing() {
    let store = MemoryStore::new();
    let reporter = principal(Role::User);
    let target = principal(Role::User);
    let claim = ReportClaim::new(ReportReason::Harassment, "Keeps sending insults after a block")
        .expect("valid claim");

    let orphan = Report::file(
        reporter.member_id,
        target.member_id,
        claim.clone(),
        true,
        fixture_now(),
    );
    let missing = store
        .file_with_warning(&orphan, BlockThreshold::default(), fixture_now())
        .await
        .expect("store available");
    assert!(missing.is_none());
    assert!(ReportRepository::find(&store, orphan.id).await.expect("find").is_none());

    seeded(&store, target).await;
    let first = Report::file(
        reporter.member_id,
        target.member_id,
        claim.clone(),
        true,
        fixture_now(),
    );
    let recorded = store
        .file_with_warning(&first, BlockThreshold::default(), fixture_now())
        .await
        .expect("store available")
        .expect("member exists");
    assert_eq!(recorded.member.trust.warning_count, 1);

    let repeat = Report::file(
        reporter.member_id,
        target.member_id,
        claim,
        true,
        fixture_now(),
    );
    let err = store
        .file_with_warning(&repeat, BlockThreshold::default(), fixture_now())
        .await
        .expect_err("same triple");
    assert!(matches!(err, ReportRepositoryError::Duplicate { .. }));
    let member = MemberRepository::find(&store, target.member_id)
        .await
        .expect("find")
        .expect("stored");
    assert_eq!(member.trust.warning_count, 1);
    assert_eq!(store.warning_history(target.member_id).await.expect("history").len(), 1);
}

#[tokio::test]
async fn role_audience_reaches_only_active_admins() {
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(MutableClock::new(fixture_now()));
    let admin = principal(Role::Admin);
    seeded(&store, admin).await;
    seeded(&store, principal(Role::User)).await;
    let notifier = NotifierService::new(store.clone(), store.clone(), clock);

    let sent = notifier
        .send(
            Audience::Role(Role::Admin),
            NotificationKind::AccountUnblocked,
        )
        .await
        .expect("send");

    assert_eq!(sent, 1);
    assert_eq!(store.count_unread(admin.member_id).await.expect("count"), 1);
}

impl MemoryStore {
    async fn insert_request(&self, request: &HelpRequest) {
        RequestRepository::insert(self, request)
            .await
            .expect("insert request");
    }
}
