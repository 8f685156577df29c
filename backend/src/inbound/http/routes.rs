//! Route table for the `/api/v1` scope.
//!
//! Literal segments (`/requests/mine`, `/admin/members/blocked`) are
//! registered ahead of their `{id}` siblings so the matcher reaches them
//! first.

use actix_web::web;

use super::{admin, chats, members, notifications, reports, requests, responses, sessions};

/// Register every API handler on `cfg`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(sessions::create_session)
        .service(sessions::delete_session)
        .service(members::current_member)
        .service(members::current_member_status)
        .service(requests::list_my_requests)
        .service(requests::create_request)
        .service(requests::list_requests)
        .service(requests::get_request)
        .service(requests::update_request)
        .service(requests::delete_request)
        .service(requests::accept_request)
        .service(requests::cancel_request)
        .service(requests::fulfill_request)
        .service(responses::submit_response)
        .service(responses::list_request_responses)
        .service(responses::list_my_responses)
        .service(responses::accept_response)
        .service(responses::reject_response)
        .service(chats::list_chats)
        .service(chats::get_chat)
        .service(chats::list_messages)
        .service(chats::post_message)
        .service(reports::create_report)
        .service(notifications::list_notifications)
        .service(notifications::mark_all_read)
        .service(notifications::mark_read)
        .service(notifications::delete_notification)
        .service(admin::list_reports)
        .service(admin::get_report)
        .service(admin::review_report)
        .service(admin::blocked_members)
        .service(admin::at_risk_members)
        .service(admin::member_reports)
        .service(admin::member_warnings)
        .service(admin::reset_warnings);
}
