//! Member report handler.
//!
//! ```text
//! POST /api/v1/reports {"reportedId":"...","reason":"spam","description":"..."}
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{MemberId, ReportClaim, ReportReason};
use crate::inbound::http::ApiResult;
use crate::inbound::http::envelope;
use crate::inbound::http::schemas::{ErrorSchema, ReportSchema};
use crate::inbound::http::session::Caller;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id, require_variant, text_rule_error};

/// Body of `POST /api/v1/reports`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReportBody {
    #[serde(default)]
    #[schema(format = "uuid")]
    pub reported_id: String,
    #[schema(example = "harassment")]
    pub reason: Option<String>,
    /// 1 to 500 characters after trimming.
    #[serde(default)]
    pub description: String,
}

/// Report another member.
///
/// The report is classified on receipt. A validated report adds a warning
/// to the reported member and may block them.
#[utoipa::path(
    post,
    path = "/api/v1/reports",
    request_body = CreateReportBody,
    responses(
        (status = 201, description = "Report filed", body = ReportSchema),
        (status = 400, description = "Invalid report", body = ErrorSchema),
        (status = 403, description = "Member is blocked", body = ErrorSchema),
        (status = 404, description = "Reported member not found", body = ErrorSchema),
        (status = 409, description = "Self-report or duplicate report", body = ErrorSchema)
    ),
    tags = ["reports"],
    operation_id = "createReport"
)]
#[post("/reports")]
pub async fn create_report(
    state: web::Data<HttpState>,
    caller: Caller,
    payload: web::Json<CreateReportBody>,
) -> ApiResult<HttpResponse> {
    caller.ensure_unblocked(&state).await?;
    let body = payload.into_inner();
    let reported: MemberId = parse_id(&body.reported_id, FieldName::new("reportedId"))?;
    let reason: ReportReason = require_variant(body.reason.as_deref(), FieldName::new("reason"))?;
    let claim = ReportClaim::new(reason, &body.description).map_err(text_rule_error)?;
    let report = state
        .moderation
        .create_report(caller.principal(), reported, claim)
        .await?;
    Ok(envelope::created(report, "Report filed"))
}
