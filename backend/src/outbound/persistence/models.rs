//! Internal Diesel row structs and their conversions to domain types.
//!
//! Rows never leave the persistence layer. Decoding is fallible because
//! enumerated columns are stored as text and could drift from the domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    Chat, ChatId, ChatMessage, HelpRequest, HelpResponse, Member, MemberId, MessageId,
    Notification, NotificationId, ParticipantPair, Report, ReportId, RequestDetails, RequestId,
    ResponseId, TrustStatus, WarningEntry,
};

use super::schema::{
    chat_messages, chats, help_requests, help_responses, member_warnings, members,
    notifications, reports,
};

/// A stored row could not be mapped back onto the domain.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("decode {table} row: {message}")]
pub(crate) struct RowDecodeError {
    table: &'static str,
    message: String,
}

impl RowDecodeError {
    fn new(table: &'static str, message: impl std::fmt::Display) -> Self {
        Self {
            table,
            message: message.to_string(),
        }
    }
}

fn parse<T>(table: &'static str, raw: &str) -> Result<T, RowDecodeError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse().map_err(|err| RowDecodeError::new(table, err))
}

fn counter(table: &'static str, raw: i32) -> Result<u32, RowDecodeError> {
    u32::try_from(raw).map_err(|err| RowDecodeError::new(table, err))
}

/// Clamp a domain counter into a signed column.
pub(crate) fn to_column(count: u32) -> i32 {
    i32::try_from(count).unwrap_or(i32::MAX)
}

// ---------------------------------------------------------------------------
// Members
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = members)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MemberRow {
    pub id: Uuid,
    pub display_name: String,
    pub role: String,
    pub is_active: bool,
    pub help_count: i32,
    pub warning_count: i32,
    pub is_blocked: bool,
    pub blocked_at: Option<DateTime<Utc>>,
    pub block_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<MemberRow> for Member {
    type Error = RowDecodeError;

    fn try_from(row: MemberRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: MemberId::from_uuid(row.id),
            display_name: row.display_name,
            role: parse("members", &row.role)?,
            is_active: row.is_active,
            help_count: counter("members", row.help_count)?,
            trust: TrustStatus {
                warning_count: counter("members", row.warning_count)?,
                is_blocked: row.is_blocked,
                blocked_at: row.blocked_at,
                block_reason: row.block_reason,
            },
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = members)]
pub(crate) struct NewMemberRow<'a> {
    pub id: Uuid,
    pub display_name: &'a str,
    pub role: &'a str,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Identity fields refreshed on every sign-in.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = members)]
pub(crate) struct MemberIdentityUpdate<'a> {
    pub display_name: &'a str,
    pub role: &'a str,
    pub is_active: bool,
}

/// Trust columns written back after a warning or reset.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = members)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct TrustUpdate<'a> {
    pub warning_count: i32,
    pub is_blocked: bool,
    pub blocked_at: Option<DateTime<Utc>>,
    pub block_reason: Option<&'a str>,
}

impl<'a> From<&'a TrustStatus> for TrustUpdate<'a> {
    fn from(trust: &'a TrustStatus) -> Self {
        Self {
            warning_count: to_column(trust.warning_count),
            is_blocked: trust.is_blocked,
            blocked_at: trust.blocked_at,
            block_reason: trust.block_reason.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = member_warnings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct WarningRow {
    pub member_id: Uuid,
    pub report_id: Uuid,
    pub recorded_at: DateTime<Utc>,
}

impl From<WarningRow> for WarningEntry {
    fn from(row: WarningRow) -> Self {
        Self {
            member_id: MemberId::from_uuid(row.member_id),
            report_id: ReportId::from_uuid(row.report_id),
            recorded_at: row.recorded_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = member_warnings)]
pub(crate) struct NewWarningRow {
    pub member_id: Uuid,
    pub report_id: Uuid,
    pub recorded_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = help_requests)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RequestRow {
    pub id: Uuid,
    pub requested_by: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub urgency: String,
    pub contact_preference: String,
    pub location_hint: Option<String>,
    pub image_url: Option<String>,
    pub status: String,
    pub accepted_helper: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub fulfilled_at: Option<DateTime<Utc>>,
}

impl TryFrom<RequestRow> for HelpRequest {
    type Error = RowDecodeError;

    fn try_from(row: RequestRow) -> Result<Self, Self::Error> {
        const TABLE: &str = "help_requests";
        Ok(Self {
            id: RequestId::from_uuid(row.id),
            requested_by: MemberId::from_uuid(row.requested_by),
            details: RequestDetails {
                title: row.title,
                description: row.description,
                category: parse(TABLE, &row.category)?,
                urgency: parse(TABLE, &row.urgency)?,
                contact: parse(TABLE, &row.contact_preference)?,
                location_hint: row.location_hint,
                image_url: row.image_url,
            },
            status: parse(TABLE, &row.status)?,
            accepted_helper: row.accepted_helper.map(MemberId::from_uuid),
            created_at: row.created_at,
            updated_at: row.updated_at,
            expires_at: row.expires_at,
            fulfilled_at: row.fulfilled_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = help_requests)]
pub(crate) struct NewRequestRow<'a> {
    pub id: Uuid,
    pub requested_by: Uuid,
    pub title: &'a str,
    pub description: &'a str,
    pub category: &'a str,
    pub urgency: &'a str,
    pub contact_preference: &'a str,
    pub location_hint: Option<&'a str>,
    pub image_url: Option<&'a str>,
    pub status: &'a str,
    pub accepted_helper: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub fulfilled_at: Option<DateTime<Utc>>,
}

impl<'a> From<&'a HelpRequest> for NewRequestRow<'a> {
    fn from(request: &'a HelpRequest) -> Self {
        let details = &request.details;
        Self {
            id: *request.id.as_uuid(),
            requested_by: *request.requested_by.as_uuid(),
            title: &details.title,
            description: &details.description,
            category: details.category.as_str(),
            urgency: details.urgency.as_str(),
            contact_preference: details.contact.as_str(),
            location_hint: details.location_hint.as_deref(),
            image_url: details.image_url.as_deref(),
            status: request.status.as_str(),
            accepted_helper: request.accepted_helper.map(|id| *id.as_uuid()),
            created_at: request.created_at,
            updated_at: request.updated_at,
            expires_at: request.expires_at,
            fulfilled_at: request.fulfilled_at,
        }
    }
}

/// Owner-editable columns.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = help_requests)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct RequestDetailsUpdate<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub category: &'a str,
    pub urgency: &'a str,
    pub contact_preference: &'a str,
    pub location_hint: Option<&'a str>,
    pub image_url: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> RequestDetailsUpdate<'a> {
    pub fn new(details: &'a RequestDetails, now: DateTime<Utc>) -> Self {
        Self {
            title: &details.title,
            description: &details.description,
            category: details.category.as_str(),
            urgency: details.urgency.as_str(),
            contact_preference: details.contact.as_str(),
            location_hint: details.location_hint.as_deref(),
            image_url: details.image_url.as_deref(),
            updated_at: now,
        }
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = help_responses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ResponseRow {
    pub id: Uuid,
    pub request_id: Uuid,
    pub responder: Uuid,
    pub message: String,
    pub image_url: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ResponseRow> for HelpResponse {
    type Error = RowDecodeError;

    fn try_from(row: ResponseRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ResponseId::from_uuid(row.id),
            request_id: RequestId::from_uuid(row.request_id),
            responder: MemberId::from_uuid(row.responder),
            message: row.message,
            image_url: row.image_url,
            status: parse("help_responses", &row.status)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = help_responses)]
pub(crate) struct NewResponseRow<'a> {
    pub id: Uuid,
    pub request_id: Uuid,
    pub responder: Uuid,
    pub message: &'a str,
    pub image_url: Option<&'a str>,
    pub status: &'a str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a HelpResponse> for NewResponseRow<'a> {
    fn from(response: &'a HelpResponse) -> Self {
        Self {
            id: *response.id.as_uuid(),
            request_id: *response.request_id.as_uuid(),
            responder: *response.responder.as_uuid(),
            message: &response.message,
            image_url: response.image_url.as_deref(),
            status: response.status.as_str(),
            created_at: response.created_at,
            updated_at: response.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Chats
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = chats)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ChatRow {
    pub id: Uuid,
    pub request_id: Uuid,
    pub participant_low: Uuid,
    pub participant_high: Uuid,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ChatRow> for Chat {
    type Error = RowDecodeError;

    fn try_from(row: ChatRow) -> Result<Self, Self::Error> {
        let participants = ParticipantPair::new(
            MemberId::from_uuid(row.participant_low),
            MemberId::from_uuid(row.participant_high),
        )
        .map_err(|err| RowDecodeError::new("chats", err))?;
        Ok(Self {
            id: ChatId::from_uuid(row.id),
            request_id: RequestId::from_uuid(row.request_id),
            participants,
            created_at: row.created_at,
        })
    }
}

impl From<&Chat> for ChatRow {
    fn from(chat: &Chat) -> Self {
        Self {
            id: *chat.id.as_uuid(),
            request_id: *chat.request_id.as_uuid(),
            participant_low: *chat.participants.low().as_uuid(),
            participant_high: *chat.participants.high().as_uuid(),
            created_at: chat.created_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = chat_messages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MessageRow {
    pub id: Uuid,
    pub chat_id: Uuid,
    pub sender: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<MessageRow> for ChatMessage {
    fn from(row: MessageRow) -> Self {
        Self {
            id: MessageId::from_uuid(row.id),
            chat_id: ChatId::from_uuid(row.chat_id),
            sender: MemberId::from_uuid(row.sender),
            content: row.content,
            created_at: row.created_at,
        }
    }
}

impl From<&ChatMessage> for MessageRow {
    fn from(message: &ChatMessage) -> Self {
        Self {
            id: *message.id.as_uuid(),
            chat_id: *message.chat_id.as_uuid(),
            sender: *message.sender.as_uuid(),
            content: message.content.clone(),
            created_at: message.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = reports)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ReportRow {
    pub id: Uuid,
    pub reported_id: Uuid,
    pub reporter_id: Uuid,
    pub reason: String,
    pub description: String,
    pub severity: String,
    pub status: String,
    pub is_validated: bool,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub review_notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ReportRow> for Report {
    type Error = RowDecodeError;

    fn try_from(row: ReportRow) -> Result<Self, Self::Error> {
        const TABLE: &str = "reports";
        Ok(Self {
            id: ReportId::from_uuid(row.id),
            reported_id: MemberId::from_uuid(row.reported_id),
            reporter_id: MemberId::from_uuid(row.reporter_id),
            reason: parse(TABLE, &row.reason)?,
            description: row.description,
            severity: parse(TABLE, &row.severity)?,
            status: parse(TABLE, &row.status)?,
            is_validated: row.is_validated,
            reviewed_by: row.reviewed_by.map(MemberId::from_uuid),
            reviewed_at: row.reviewed_at,
            review_notes: row.review_notes,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = reports)]
pub(crate) struct NewReportRow<'a> {
    pub id: Uuid,
    pub reported_id: Uuid,
    pub reporter_id: Uuid,
    pub reason: &'a str,
    pub description: &'a str,
    pub severity: &'a str,
    pub status: &'a str,
    pub is_validated: bool,
    pub created_at: DateTime<Utc>,
}

impl<'a> From<&'a Report> for NewReportRow<'a> {
    fn from(report: &'a Report) -> Self {
        Self {
            id: *report.id.as_uuid(),
            reported_id: *report.reported_id.as_uuid(),
            reporter_id: *report.reporter_id.as_uuid(),
            reason: report.reason.as_str(),
            description: &report.description,
            severity: report.severity.as_str(),
            status: report.status.as_str(),
            is_validated: report.is_validated,
            created_at: report.created_at,
        }
    }
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = reports)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct ReportReviewUpdate<'a> {
    pub status: &'a str,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub review_notes: Option<&'a str>,
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = notifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct NotificationRow {
    pub id: Uuid,
    pub recipient: Uuid,
    pub notification_type: String,
    pub payload: serde_json::Value,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<NotificationRow> for Notification {
    type Error = RowDecodeError;

    fn try_from(row: NotificationRow) -> Result<Self, Self::Error> {
        let kind = serde_json::from_value(row.payload)
            .map_err(|err| RowDecodeError::new("notifications", err))?;
        Ok(Self {
            id: NotificationId::from_uuid(row.id),
            recipient: MemberId::from_uuid(row.recipient),
            kind,
            title: row.title,
            message: row.message,
            is_read: row.is_read,
            created_at: row.created_at,
        })
    }
}

impl TryFrom<&Notification> for NotificationRow {
    type Error = RowDecodeError;

    fn try_from(notification: &Notification) -> Result<Self, Self::Error> {
        let payload = serde_json::to_value(&notification.kind)
            .map_err(|err| RowDecodeError::new("notifications", err))?;
        Ok(Self {
            id: *notification.id.as_uuid(),
            recipient: *notification.recipient.as_uuid(),
            notification_type: notification.kind.type_name().to_owned(),
            payload,
            title: notification.title.clone(),
            message: notification.message.clone(),
            is_read: notification.is_read,
            created_at: notification.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::domain::{NotificationKind, RequestStatus};
    use crate::test_support::fixture_now;

    fn request_row(status: &str) -> RequestRow {
        let now = fixture_now();
        RequestRow {
            id: Uuid::new_v4(),
            requested_by: Uuid::new_v4(),
            title: "Lift to the station".to_owned(),
            description: "Heavy suitcase and a train at six.".to_owned(),
            category: "general".to_owned(),
            urgency: "urgent".to_owned(),
            contact_preference: "call".to_owned(),
            location_hint: None,
            image_url: None,
            status: status.to_owned(),
            accepted_helper: None,
            created_at: now,
            updated_at: now,
            expires_at: now,
            fulfilled_at: None,
        }
    }

    #[rstest]
    #[case("open", RequestStatus::Open)]
    #[case("in-progress", RequestStatus::InProgress)]
    fn request_status_decodes_from_text(#[case] raw: &str, #[case] expected: RequestStatus) {
        let request = HelpRequest::try_from(request_row(raw)).expect("decode");
        assert_eq!(request.status, expected);
    }

    #[rstest]
    fn unknown_category_is_a_decode_error() {
        let mut row = request_row("open");
        row.category = "gardening".to_owned();

        let err = HelpRequest::try_from(row).expect_err("unknown category");

        assert!(err.to_string().contains("help_requests"));
    }

    #[rstest]
    fn negative_counter_is_rejected() {
        let row = MemberRow {
            id: Uuid::new_v4(),
            display_name: "Sam".to_owned(),
            role: "user".to_owned(),
            is_active: true,
            help_count: -1,
            warning_count: 0,
            is_blocked: false,
            blocked_at: None,
            block_reason: None,
            created_at: fixture_now(),
        };

        assert!(Member::try_from(row).is_err());
    }

    #[rstest]
    fn chat_row_with_equal_participants_is_rejected() {
        let member = Uuid::new_v4();
        let row = ChatRow {
            id: Uuid::new_v4(),
            request_id: Uuid::new_v4(),
            participant_low: member,
            participant_high: member,
            created_at: fixture_now(),
        };

        assert!(Chat::try_from(row).is_err());
    }

    #[rstest]
    fn notification_row_keeps_type_column_in_step_with_payload() {
        let kind = NotificationKind::RequestCancelled {
            request_id: RequestId::random(),
        };
        let notification = Notification::new(MemberId::random(), kind, fixture_now());

        let row = NotificationRow::try_from(&notification).expect("encode");

        assert_eq!(row.notification_type, "request_cancelled");
        assert_eq!(Notification::try_from(row).expect("decode"), notification);
    }
}
