//! Member profile handlers.
//!
//! ```text
//! GET /api/v1/members/me
//! GET /api/v1/members/me/status
//! ```

use actix_web::{HttpResponse, get, web};

use crate::inbound::http::ApiResult;
use crate::inbound::http::envelope;
use crate::inbound::http::schemas::{BlockStatusSchema, ErrorSchema, MemberSchema};
use crate::inbound::http::session::Caller;
use crate::inbound::http::state::HttpState;

/// Profile of the signed-in member, including trust fields.
#[utoipa::path(
    get,
    path = "/api/v1/members/me",
    responses(
        (status = 200, description = "Own profile", body = MemberSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Member is inactive", body = ErrorSchema)
    ),
    tags = ["members"],
    operation_id = "currentMember"
)]
#[get("/members/me")]
pub async fn current_member(caller: Caller) -> HttpResponse {
    envelope::ok(caller.into_member(), "Profile fetched")
}

/// Whether the signed-in member is blocked.
#[utoipa::path(
    get,
    path = "/api/v1/members/me/status",
    responses(
        (status = 200, description = "Block status", body = BlockStatusSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["members"],
    operation_id = "currentMemberStatus"
)]
#[get("/members/me/status")]
pub async fn current_member_status(
    state: web::Data<HttpState>,
    caller: Caller,
) -> ApiResult<HttpResponse> {
    let status = state
        .moderation_query
        .block_status(caller.member().id)
        .await?;
    Ok(envelope::ok(status, "Status fetched"))
}
