//! Notifications: pull-based, per-member event records.
//!
//! Each [`NotificationKind`] variant carries exactly the fields its event
//! needs and derives its own title and message.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::report::{ReportReason, Severity};
use super::{ChatId, MemberId, MessageId, NotificationId, ReportId, RequestId, ResponseId, Role};

/// Event payload, tagged by notification type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum NotificationKind {
    NewResponse {
        request_id: RequestId,
        response_id: ResponseId,
        responder_id: MemberId,
    },
    ResponseAccepted {
        request_id: RequestId,
        response_id: ResponseId,
        chat_id: ChatId,
    },
    ResponseRejected {
        request_id: RequestId,
        response_id: ResponseId,
    },
    RequestAccepted {
        request_id: RequestId,
        helper_id: MemberId,
        chat_id: ChatId,
    },
    RequestCancelled {
        request_id: RequestId,
    },
    RequestFulfilled {
        request_id: RequestId,
    },
    NewMessage {
        chat_id: ChatId,
        message_id: MessageId,
        sender_id: MemberId,
    },
    ReportFiled {
        report_id: ReportId,
        reported_id: MemberId,
        reason: ReportReason,
        severity: Severity,
        is_validated: bool,
    },
    WarningIssued {
        report_id: ReportId,
        warning_count: u32,
        threshold: u32,
    },
    AccountBlocked {
        report_id: ReportId,
        warning_count: u32,
    },
    AccountUnblocked,
}

impl NotificationKind {
    /// Stable type tag, matching the serialised `type` field.
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::NewResponse { .. } => "new_response",
            Self::ResponseAccepted { .. } => "response_accepted",
            Self::ResponseRejected { .. } => "response_rejected",
            Self::RequestAccepted { .. } => "request_accepted",
            Self::RequestCancelled { .. } => "request_cancelled",
            Self::RequestFulfilled { .. } => "request_fulfilled",
            Self::NewMessage { .. } => "new_message",
            Self::ReportFiled { .. } => "report_filed",
            Self::WarningIssued { .. } => "warning_issued",
            Self::AccountBlocked { .. } => "account_blocked",
            Self::AccountUnblocked => "account_unblocked",
        }
    }

    /// Short headline shown in the inbox.
    pub const fn title(&self) -> &'static str {
        match self {
            Self::NewResponse { .. } => "New Response",
            Self::ResponseAccepted { .. } => "Response Accepted",
            Self::ResponseRejected { .. } => "Response Declined",
            Self::RequestAccepted { .. } => "Request Accepted",
            Self::RequestCancelled { .. } => "Request Cancelled",
            Self::RequestFulfilled { .. } => "Request Fulfilled",
            Self::NewMessage { .. } => "New Message",
            Self::ReportFiled { .. } => "New Report Submitted",
            Self::WarningIssued { .. } => "Warning Issued",
            Self::AccountBlocked { .. } => "Account Blocked",
            Self::AccountUnblocked => "Account Restored",
        }
    }

    /// Body text shown in the inbox.
    pub fn message(&self) -> String {
        match self {
            Self::NewResponse { .. } => "Someone offered to help with your request.".to_owned(),
            Self::ResponseAccepted { .. } => {
                "Your offer was accepted. A chat with the requester is ready.".to_owned()
            }
            Self::ResponseRejected { .. } => {
                "The requester chose a different offer this time.".to_owned()
            }
            Self::RequestAccepted { .. } => {
                "A helper accepted your request. A chat is ready.".to_owned()
            }
            Self::RequestCancelled { .. } => {
                "A request you were helping with was cancelled.".to_owned()
            }
            Self::RequestFulfilled { .. } => {
                "A request you helped with was marked fulfilled. Thank you!".to_owned()
            }
            Self::NewMessage { .. } => "You have a new chat message.".to_owned(),
            Self::ReportFiled {
                reason,
                severity,
                is_validated,
                ..
            } => {
                let review = if *is_validated {
                    "auto-validated"
                } else {
                    "requires manual review"
                };
                format!(
                    "A {} report ({} severity) was filed and {review}.",
                    reason.as_str(),
                    severity.as_str()
                )
            }
            Self::WarningIssued {
                warning_count,
                threshold,
                ..
            } => format!(
                "You received a warning after a validated report ({warning_count}/{threshold})."
            ),
            Self::AccountBlocked { warning_count, .. } => format!(
                "Your account was blocked after {warning_count} validated reports."
            ),
            Self::AccountUnblocked => {
                "An administrator restored your account. Please follow the community guidelines."
                    .to_owned()
            }
        }
    }

    /// Request this event refers to, if any.
    pub fn request_id(&self) -> Option<RequestId> {
        match self {
            Self::NewResponse { request_id, .. }
            | Self::ResponseAccepted { request_id, .. }
            | Self::ResponseRejected { request_id, .. }
            | Self::RequestAccepted { request_id, .. }
            | Self::RequestCancelled { request_id }
            | Self::RequestFulfilled { request_id } => Some(*request_id),
            _ => None,
        }
    }

    /// Report this event refers to, if any.
    pub fn report_id(&self) -> Option<ReportId> {
        match self {
            Self::ReportFiled { report_id, .. }
            | Self::WarningIssued { report_id, .. }
            | Self::AccountBlocked { report_id, .. } => Some(*report_id),
            _ => None,
        }
    }
}

/// Addressee of a notification send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    /// A single member.
    Member(MemberId),
    /// Every member currently holding the role.
    Role(Role),
}

/// A notification addressed to one member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: NotificationId,
    pub recipient: MemberId,
    #[serde(flatten)]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Build an unread notification, rendering its title and message.
    pub fn new(recipient: MemberId, kind: NotificationKind, now: DateTime<Utc>) -> Self {
        Self {
            id: NotificationId::random(),
            recipient,
            title: kind.title().to_owned(),
            message: kind.message(),
            kind,
            is_read: false,
            created_at: now,
        }
    }
}
