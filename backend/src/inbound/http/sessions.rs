//! Session establishment handlers.
//!
//! ```text
//! POST /api/v1/session {"identityToken":"..."}
//! DELETE /api/v1/session
//! ```

use actix_web::{HttpResponse, delete, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::inbound::http::ApiResult;
use crate::inbound::http::envelope;
use crate::inbound::http::schemas::{ErrorSchema, MemberSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, missing_field_error};

/// Body of `POST /api/v1/session`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionRequest {
    /// Credential issued by the identity provider.
    #[serde(default)]
    pub identity_token: String,
}

/// Verify an identity token and start a cookie session.
///
/// The member record is created or refreshed from the verified identity;
/// inactive members are refused.
#[utoipa::path(
    post,
    path = "/api/v1/session",
    request_body = SessionRequest,
    responses(
        (status = 200, description = "Session established", body = MemberSchema,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Identity token rejected", body = ErrorSchema),
        (status = 403, description = "Member is inactive", body = ErrorSchema),
        (status = 503, description = "Identity verifier unavailable", body = ErrorSchema)
    ),
    tags = ["session"],
    operation_id = "createSession",
    security([])
)]
#[post("/session")]
pub async fn create_session(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<SessionRequest>,
) -> ApiResult<HttpResponse> {
    let token = payload.into_inner().identity_token;
    let token = token.trim();
    if token.is_empty() {
        return Err(missing_field_error(FieldName::new("identityToken")));
    }
    let member = state.members.establish(token).await?;
    session.persist_member(member.id)?;
    Ok(envelope::ok(member, "Session established"))
}

/// End the current session.
#[utoipa::path(
    delete,
    path = "/api/v1/session",
    responses((status = 200, description = "Session ended")),
    tags = ["session"],
    operation_id = "deleteSession",
    security([])
)]
#[delete("/session")]
pub async fn delete_session(session: SessionContext) -> HttpResponse {
    session.purge();
    envelope::done("Session ended")
}
