//! Tests for request validation and derived state.

use super::*;
use chrono::TimeZone;
use rstest::{fixture, rstest};

#[fixture]
fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

#[fixture]
fn draft() -> RequestDraft {
    RequestDraft {
        title: "  Need a calculator  ".to_owned(),
        description: "Exam tomorrow and my calculator broke.".to_owned(),
        ..RequestDraft::default()
    }
}

#[rstest]
fn draft_defaults_enumerations(draft: RequestDraft) {
    let details = draft.validate().expect("valid draft");
    assert_eq!(details.title, "Need a calculator");
    assert_eq!(details.category, Category::General);
    assert_eq!(details.urgency, Urgency::Normal);
    assert_eq!(details.contact, ContactPreference::Chat);
    assert!(details.location_hint.is_none());
}

#[rstest]
fn draft_rejects_short_description(mut draft: RequestDraft) {
    draft.description = "help".to_owned();
    let err = draft.validate().expect_err("too short");
    assert_eq!(err.field(), "description");
}

#[rstest]
fn draft_rejects_non_http_image(mut draft: RequestDraft) {
    draft.image_url = Some("file:///etc/passwd".to_owned());
    let err = draft.validate().expect_err("bad url");
    assert_eq!(err.field(), "imageUrl");
}

#[rstest]
#[case(0, false)]
#[case(1, true)]
#[case(MAX_EXPIRY_HOURS, true)]
#[case(MAX_EXPIRY_HOURS + 1, false)]
fn expiry_hours_are_bounded(#[case] hours: u32, #[case] ok: bool) {
    assert_eq!(ExpiryHours::new(hours).is_ok(), ok);
}

#[rstest]
fn draft_expiry_falls_back_to_default(mut draft: RequestDraft) {
    let default = ExpiryHours::new(48).expect("valid default");
    assert_eq!(draft.expiry(default), Ok(default));

    draft.expiry_hours = Some(2);
    assert_eq!(draft.expiry(default).map(ExpiryHours::get), Ok(2));

    draft.expiry_hours = Some(0);
    let err = draft.expiry(default).expect_err("zero hours");
    assert_eq!(err.field(), "expiryHours");
}

#[rstest]
fn open_request_expires_lazily(draft: RequestDraft, now: DateTime<Utc>) {
    let request = HelpRequest::open(
        MemberId::random(),
        draft.validate().expect("valid"),
        ExpiryHours::default(),
        now,
    );
    assert_eq!(request.expires_at, now + TimeDelta::hours(24));
    assert_eq!(request.effective_status(now), RequestStatus::Open);
    assert_eq!(
        request.effective_status(request.expires_at),
        RequestStatus::Expired
    );
}

#[rstest]
fn terminal_statuses_do_not_expire(draft: RequestDraft, now: DateTime<Utc>) {
    let mut request = HelpRequest::open(
        MemberId::random(),
        draft.validate().expect("valid"),
        ExpiryHours::new(1).expect("valid"),
        now,
    );
    request.status = RequestStatus::Cancelled;
    let later = now + TimeDelta::days(3);
    assert_eq!(request.effective_status(later), RequestStatus::Cancelled);
}

#[rstest]
fn edit_touches_only_allowlisted_fields(draft: RequestDraft) {
    let details = draft.validate().expect("valid");
    let edit = RequestEdit {
        urgency: Some(Urgency::Critical),
        location_hint: Some("Library, 2nd floor".to_owned()),
        ..RequestEdit::default()
    };
    let next = edit.apply(&details).expect("valid edit");
    assert_eq!(next.urgency, Urgency::Critical);
    assert_eq!(next.location_hint.as_deref(), Some("Library, 2nd floor"));
    assert_eq!(next.title, details.title);
    assert_eq!(next.contact, details.contact);
}

#[rstest]
fn empty_location_hint_clears_it(draft: RequestDraft) {
    let mut details = draft.validate().expect("valid");
    details.location_hint = Some("Gate 3".to_owned());
    let edit = RequestEdit {
        location_hint: Some("  ".to_owned()),
        ..RequestEdit::default()
    };
    assert!(edit.apply(&details).expect("valid").location_hint.is_none());
}

#[rstest]
#[case("in-progress", RequestStatus::InProgress)]
#[case("OPEN", RequestStatus::Open)]
#[case("expired", RequestStatus::Expired)]
fn parses_status_names(#[case] raw: &str, #[case] expected: RequestStatus) {
    assert_eq!(raw.parse::<RequestStatus>().expect("known"), expected);
}

#[rstest]
fn parses_category_names() {
    assert_eq!("Hostel".parse::<Category>().expect("known"), Category::Hostel);
    assert!("gardening".parse::<Category>().is_err());
}
