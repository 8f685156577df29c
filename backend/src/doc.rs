//! OpenAPI document for the marketplace REST API.
//!
//! Registers every `/api/v1` handler and the health probes, plus the schema
//! wrappers from [`crate::inbound::http::schemas`]. Swagger UI serves it in
//! debug builds and `openapi-dump` prints it for tooling.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::inbound::http::admin::{ResetWarningsBody, ReviewReportBody};
use crate::inbound::http::chats::PostMessageBody;
use crate::inbound::http::notifications::MarkedRead;
use crate::inbound::http::reports::CreateReportBody;
use crate::inbound::http::requests::{CreateRequestBody, UpdateRequestBody};
use crate::inbound::http::responses::SubmitResponseBody;
use crate::inbound::http::schemas::{
    BlockStatusSchema, ChatMessageSchema, ChatSchema, ErrorCodeSchema, ErrorSchema,
    HelpRequestSchema, HelpResponseSchema, InboxPageSchema, MemberSchema, NotificationSchema,
    ParticipantPairSchema, ReportSchema, RequestAcceptedSchema, ResponseAcceptedSchema,
    WarningEntrySchema,
};
use crate::inbound::http::sessions::SessionRequest;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/session.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Buddy backend API",
        description = "Peer-help marketplace: help requests, responses, chats, reports, moderation and notifications."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::sessions::create_session,
        crate::inbound::http::sessions::delete_session,
        crate::inbound::http::members::current_member,
        crate::inbound::http::members::current_member_status,
        crate::inbound::http::requests::create_request,
        crate::inbound::http::requests::list_requests,
        crate::inbound::http::requests::list_my_requests,
        crate::inbound::http::requests::get_request,
        crate::inbound::http::requests::update_request,
        crate::inbound::http::requests::delete_request,
        crate::inbound::http::requests::accept_request,
        crate::inbound::http::requests::cancel_request,
        crate::inbound::http::requests::fulfill_request,
        crate::inbound::http::responses::submit_response,
        crate::inbound::http::responses::list_request_responses,
        crate::inbound::http::responses::list_my_responses,
        crate::inbound::http::responses::accept_response,
        crate::inbound::http::responses::reject_response,
        crate::inbound::http::chats::list_chats,
        crate::inbound::http::chats::get_chat,
        crate::inbound::http::chats::list_messages,
        crate::inbound::http::chats::post_message,
        crate::inbound::http::reports::create_report,
        crate::inbound::http::notifications::list_notifications,
        crate::inbound::http::notifications::mark_all_read,
        crate::inbound::http::notifications::mark_read,
        crate::inbound::http::notifications::delete_notification,
        crate::inbound::http::admin::list_reports,
        crate::inbound::http::admin::get_report,
        crate::inbound::http::admin::review_report,
        crate::inbound::http::admin::blocked_members,
        crate::inbound::http::admin::at_risk_members,
        crate::inbound::http::admin::member_reports,
        crate::inbound::http::admin::member_warnings,
        crate::inbound::http::admin::reset_warnings,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        MemberSchema,
        BlockStatusSchema,
        HelpRequestSchema,
        HelpResponseSchema,
        ParticipantPairSchema,
        ChatSchema,
        ChatMessageSchema,
        ReportSchema,
        NotificationSchema,
        WarningEntrySchema,
        InboxPageSchema,
        RequestAcceptedSchema,
        ResponseAcceptedSchema,
        SessionRequest,
        CreateRequestBody,
        UpdateRequestBody,
        SubmitResponseBody,
        PostMessageBody,
        CreateReportBody,
        ReviewReportBody,
        ResetWarningsBody,
        MarkedRead,
    )),
    tags(
        (name = "session", description = "Session establishment from identity tokens"),
        (name = "members", description = "The signed-in member"),
        (name = "requests", description = "Help requests and their lifecycle"),
        (name = "responses", description = "Offers of help on open requests"),
        (name = "chats", description = "Two-party chats opened by acceptance"),
        (name = "reports", description = "Member reports feeding the warning ledger"),
        (name = "notifications", description = "Per-member inbox"),
        (name = "admin", description = "Moderation for administrators"),
        (name = "health", description = "Liveness and readiness probes")
    )
)]
pub struct ApiDoc;
