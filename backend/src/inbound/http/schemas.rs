//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. This
//! module provides the schema definitions required for OpenAPI documentation
//! using utoipa's external schema registration.
//!
//! The schema wrappers mirror the JSON shape of their domain counterparts
//! (camelCase keys, flattened detail and trust fields) but live in the
//! inbound adapter layer where framework concerns belong.

#![expect(
    dead_code,
    reason = "Schema wrappers are only read by utoipa during OpenAPI generation"
)]

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    #[schema(rename = "unauthorized")]
    Unauthorized,
    #[schema(rename = "forbidden")]
    Forbidden,
    #[schema(rename = "not_found")]
    NotFound,
    #[schema(rename = "conflict")]
    Conflict,
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    #[schema(rename = "internal_error")]
    InternalError,
}

/// Error envelope returned by every failing endpoint.
#[derive(ToSchema)]
#[schema(as = crate::domain::Error)]
#[schema(rename_all = "camelCase")]
pub struct ErrorSchema {
    /// Always `error`.
    #[schema(example = "error")]
    status: String,
    /// Always null.
    data: Option<serde_json::Value>,
    /// Stable machine-readable error code.
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "request is in-progress, not open")]
    message: String,
    /// Correlation identifier, also sent as the `trace-id` header.
    #[schema(example = "6f1c1bde-0a5e-4f0c-9a7e-3a2b0f3c9d11")]
    trace_id: Option<String>,
    /// Supplementary details, for example `{isBlocked, warningCount}`.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::Member`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Member)]
#[schema(rename_all = "camelCase")]
pub struct MemberSchema {
    #[schema(format = "uuid")]
    id: String,
    display_name: String,
    #[schema(example = "user")]
    role: String,
    is_active: bool,
    help_count: u32,
    warning_count: u32,
    is_blocked: bool,
    #[schema(format = "date-time")]
    blocked_at: Option<String>,
    block_reason: Option<String>,
    #[schema(format = "date-time")]
    created_at: String,
}

/// OpenAPI schema for [`crate::domain::HelpRequest`].
#[derive(ToSchema)]
#[schema(as = crate::domain::HelpRequest)]
#[schema(rename_all = "camelCase")]
pub struct HelpRequestSchema {
    #[schema(format = "uuid")]
    id: String,
    #[schema(format = "uuid")]
    requested_by: String,
    title: String,
    description: String,
    #[schema(example = "academic")]
    category: String,
    #[schema(example = "urgent")]
    urgency: String,
    #[schema(example = "chat")]
    contact: String,
    location_hint: Option<String>,
    #[schema(format = "uri")]
    image_url: Option<String>,
    /// `open`, `in-progress`, `fulfilled`, `cancelled` or `expired`.
    #[schema(example = "open")]
    status: String,
    #[schema(format = "uuid")]
    accepted_helper: Option<String>,
    #[schema(format = "date-time")]
    created_at: String,
    #[schema(format = "date-time")]
    updated_at: String,
    #[schema(format = "date-time")]
    expires_at: String,
    #[schema(format = "date-time")]
    fulfilled_at: Option<String>,
}

/// OpenAPI schema for [`crate::domain::HelpResponse`].
#[derive(ToSchema)]
#[schema(as = crate::domain::HelpResponse)]
#[schema(rename_all = "camelCase")]
pub struct HelpResponseSchema {
    #[schema(format = "uuid")]
    id: String,
    #[schema(format = "uuid")]
    request_id: String,
    #[schema(format = "uuid")]
    responder: String,
    message: String,
    #[schema(format = "uri")]
    image_url: Option<String>,
    /// `pending`, `accepted` or `rejected`.
    status: String,
    #[schema(format = "date-time")]
    created_at: String,
    #[schema(format = "date-time")]
    updated_at: String,
}

/// Participants of a chat in canonical order.
#[derive(ToSchema)]
#[schema(as = crate::domain::ParticipantPair)]
#[schema(rename_all = "camelCase")]
pub struct ParticipantPairSchema {
    #[schema(format = "uuid")]
    low: String,
    #[schema(format = "uuid")]
    high: String,
}

/// OpenAPI schema for [`crate::domain::Chat`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Chat)]
#[schema(rename_all = "camelCase")]
pub struct ChatSchema {
    #[schema(format = "uuid")]
    id: String,
    #[schema(format = "uuid")]
    request_id: String,
    participants: ParticipantPairSchema,
    #[schema(format = "date-time")]
    created_at: String,
}

/// OpenAPI schema for [`crate::domain::ChatMessage`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ChatMessage)]
#[schema(rename_all = "camelCase")]
pub struct ChatMessageSchema {
    #[schema(format = "uuid")]
    id: String,
    #[schema(format = "uuid")]
    chat_id: String,
    #[schema(format = "uuid")]
    sender: String,
    content: String,
    #[schema(format = "date-time")]
    created_at: String,
}

/// OpenAPI schema for [`crate::domain::Report`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Report)]
#[schema(rename_all = "camelCase")]
pub struct ReportSchema {
    #[schema(format = "uuid")]
    id: String,
    #[schema(format = "uuid")]
    reported_id: String,
    #[schema(format = "uuid")]
    reporter_id: String,
    #[schema(example = "harassment")]
    reason: String,
    description: String,
    #[schema(example = "medium")]
    severity: String,
    #[schema(example = "pending")]
    status: String,
    is_validated: bool,
    #[schema(format = "uuid")]
    reviewed_by: Option<String>,
    #[schema(format = "date-time")]
    reviewed_at: Option<String>,
    review_notes: Option<String>,
    #[schema(format = "date-time")]
    created_at: String,
}

/// OpenAPI schema for [`crate::domain::Notification`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Notification)]
#[schema(rename_all = "camelCase")]
pub struct NotificationSchema {
    #[schema(format = "uuid")]
    id: String,
    #[schema(format = "uuid")]
    recipient: String,
    /// Notification kind, for example `new_response`.
    #[schema(rename = "type")]
    kind: String,
    /// Kind-specific fields.
    data: serde_json::Value,
    title: String,
    message: String,
    is_read: bool,
    #[schema(format = "date-time")]
    created_at: String,
}

/// OpenAPI schema for [`crate::domain::WarningEntry`].
#[derive(ToSchema)]
#[schema(as = crate::domain::WarningEntry)]
#[schema(rename_all = "camelCase")]
pub struct WarningEntrySchema {
    #[schema(format = "uuid")]
    member_id: String,
    #[schema(format = "uuid")]
    report_id: String,
    #[schema(format = "date-time")]
    recorded_at: String,
}

/// OpenAPI schema for [`crate::domain::Page`].
#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct PageSchema<T> {
    items: Vec<T>,
    /// One-based page number.
    page: u32,
    limit: u32,
    /// Total number of matches across all pages.
    total: u64,
}

/// Inbox page with the caller's unread count.
#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct InboxPageSchema {
    items: Vec<NotificationSchema>,
    page: u32,
    limit: u32,
    total: u64,
    unread_count: u64,
}

/// Request claimed by a helper, with the provisioned chat.
#[derive(ToSchema)]
pub struct RequestAcceptedSchema {
    request: HelpRequestSchema,
    chat: ChatSchema,
}

/// Response accepted by the owner, with the request and chat it touched.
#[derive(ToSchema)]
pub struct ResponseAcceptedSchema {
    response: HelpResponseSchema,
    request: HelpRequestSchema,
    chat: ChatSchema,
}

/// OpenAPI schema for [`crate::domain::BlockStatus`].
#[derive(ToSchema)]
#[schema(as = crate::domain::BlockStatus)]
#[schema(rename_all = "camelCase")]
pub struct BlockStatusSchema {
    is_blocked: bool,
    warning_count: u32,
}
