//! Administrator moderation handlers.
//!
//! Role checks live in the moderation services; these handlers only parse
//! input and shape output.
//!
//! ```text
//! GET   /api/v1/admin/reports?status=&page=&limit=
//! GET   /api/v1/admin/reports/{id}
//! PATCH /api/v1/admin/reports/{id}
//! GET   /api/v1/admin/members/blocked
//! GET   /api/v1/admin/members/at-risk
//! GET   /api/v1/admin/members/{id}/reports
//! GET   /api/v1/admin/members/{id}/warnings
//! POST  /api/v1/admin/members/{id}/reset-warnings
//! ```

use actix_web::{HttpResponse, get, patch, post, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Error, MemberId, ReportId, ReportStatus, ResetOptions};
use crate::inbound::http::ApiResult;
use crate::inbound::http::envelope;
use crate::inbound::http::params::{IdPath, PageQuery};
use crate::inbound::http::schemas::{
    ErrorSchema, MemberSchema, PageSchema, ReportSchema, WarningEntrySchema,
};
use crate::inbound::http::session::Caller;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id, parse_variant, require_variant};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReportListQuery {
    /// Restrict to one review status.
    pub status: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Body of `PATCH /api/v1/admin/reports/{id}`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct ReviewReportBody {
    #[schema(example = "reviewed")]
    pub status: Option<String>,
    /// Up to 1000 characters.
    pub notes: Option<String>,
}

/// Body of `POST /api/v1/admin/members/{id}/reset-warnings`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetWarningsBody {
    #[serde(default = "default_true")]
    pub reset_count: bool,
    #[serde(default = "default_true")]
    pub unblock: bool,
}

impl Default for ResetWarningsBody {
    fn default() -> Self {
        Self {
            reset_count: true,
            unblock: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn report_id(path: IdPath) -> Result<ReportId, Error> {
    parse_id(&path.id, FieldName::new("reportId"))
}

fn member_id(path: IdPath) -> Result<MemberId, Error> {
    parse_id(&path.id, FieldName::new("memberId"))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/reports",
    params(ReportListQuery),
    responses(
        (status = 200, description = "Reports", body = PageSchema<ReportSchema>),
        (status = 400, description = "Invalid filter", body = ErrorSchema),
        (status = 403, description = "Administrators only", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "listReports"
)]
#[get("/admin/reports")]
pub async fn list_reports(
    state: web::Data<HttpState>,
    caller: Caller,
    query: web::Query<ReportListQuery>,
) -> ApiResult<HttpResponse> {
    let query = query.into_inner();
    let status: Option<ReportStatus> =
        parse_variant(query.status.as_deref(), FieldName::new("status"))?;
    let page = PageQuery {
        page: query.page,
        limit: query.limit,
    }
    .request();
    let reports = state
        .moderation_query
        .list_reports(caller.principal(), status, page)
        .await?;
    Ok(envelope::ok(reports, "Reports fetched"))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/reports/{id}",
    params(("id" = String, Path, description = "Report identifier")),
    responses(
        (status = 200, description = "Report", body = ReportSchema),
        (status = 403, description = "Administrators only", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "getReport"
)]
#[get("/admin/reports/{id}")]
pub async fn get_report(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<IdPath>,
) -> ApiResult<HttpResponse> {
    let id = report_id(path.into_inner())?;
    let report = state.moderation_query.get_report(caller.principal(), id).await?;
    Ok(envelope::ok(report, "Report fetched"))
}

/// Record a review outcome. Warnings are not changed by reviews.
#[utoipa::path(
    patch,
    path = "/api/v1/admin/reports/{id}",
    params(("id" = String, Path, description = "Report identifier")),
    request_body = ReviewReportBody,
    responses(
        (status = 200, description = "Report reviewed", body = ReportSchema),
        (status = 400, description = "Invalid review", body = ErrorSchema),
        (status = 403, description = "Administrators only", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "reviewReport"
)]
#[patch("/admin/reports/{id}")]
pub async fn review_report(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<IdPath>,
    payload: web::Json<ReviewReportBody>,
) -> ApiResult<HttpResponse> {
    let id = report_id(path.into_inner())?;
    let body = payload.into_inner();
    let status: ReportStatus = require_variant(body.status.as_deref(), FieldName::new("status"))?;
    let report = state
        .moderation
        .update_report(caller.principal(), id, status, body.notes)
        .await?;
    Ok(envelope::ok(report, "Report reviewed"))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/members/blocked",
    params(PageQuery),
    responses(
        (status = 200, description = "Blocked members", body = PageSchema<MemberSchema>),
        (status = 403, description = "Administrators only", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "listBlockedMembers"
)]
#[get("/admin/members/blocked")]
pub async fn blocked_members(
    state: web::Data<HttpState>,
    caller: Caller,
    query: web::Query<PageQuery>,
) -> ApiResult<HttpResponse> {
    let members = state
        .moderation_query
        .blocked_members(caller.principal(), query.into_inner().request())
        .await?;
    Ok(envelope::ok(members, "Blocked members fetched"))
}

/// Unblocked members whose warning count has reached the at-risk mark.
#[utoipa::path(
    get,
    path = "/api/v1/admin/members/at-risk",
    params(PageQuery),
    responses(
        (status = 200, description = "At-risk members", body = PageSchema<MemberSchema>),
        (status = 403, description = "Administrators only", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "listAtRiskMembers"
)]
#[get("/admin/members/at-risk")]
pub async fn at_risk_members(
    state: web::Data<HttpState>,
    caller: Caller,
    query: web::Query<PageQuery>,
) -> ApiResult<HttpResponse> {
    let members = state
        .moderation_query
        .at_risk_members(caller.principal(), query.into_inner().request())
        .await?;
    Ok(envelope::ok(members, "At-risk members fetched"))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/members/{id}/reports",
    params(("id" = String, Path, description = "Member identifier"), PageQuery),
    responses(
        (status = 200, description = "Reports against the member", body = PageSchema<ReportSchema>),
        (status = 403, description = "Administrators only", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "listReportsAgainstMember"
)]
#[get("/admin/members/{id}/reports")]
pub async fn member_reports(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<IdPath>,
    query: web::Query<PageQuery>,
) -> ApiResult<HttpResponse> {
    let member = member_id(path.into_inner())?;
    let reports = state
        .moderation_query
        .reports_against(caller.principal(), member, query.into_inner().request())
        .await?;
    Ok(envelope::ok(reports, "Reports fetched"))
}

/// Warning ledger for one member, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/admin/members/{id}/warnings",
    params(("id" = String, Path, description = "Member identifier")),
    responses(
        (status = 200, description = "Warning history", body = [WarningEntrySchema]),
        (status = 403, description = "Administrators only", body = ErrorSchema),
        (status = 404, description = "Member not found", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "memberWarningHistory"
)]
#[get("/admin/members/{id}/warnings")]
pub async fn member_warnings(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<IdPath>,
) -> ApiResult<HttpResponse> {
    let member = member_id(path.into_inner())?;
    let history = state
        .moderation_query
        .warning_history(caller.principal(), member)
        .await?;
    Ok(envelope::ok(history, "Warning history fetched"))
}

/// Clear a member's warning count and/or lift their block.
#[utoipa::path(
    post,
    path = "/api/v1/admin/members/{id}/reset-warnings",
    params(("id" = String, Path, description = "Member identifier")),
    request_body = ResetWarningsBody,
    responses(
        (status = 200, description = "Member after reset", body = MemberSchema),
        (status = 403, description = "Administrators only", body = ErrorSchema),
        (status = 404, description = "Member not found", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "resetMemberWarnings"
)]
#[post("/admin/members/{id}/reset-warnings")]
pub async fn reset_warnings(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<IdPath>,
    payload: Option<web::Json<ResetWarningsBody>>,
) -> ApiResult<HttpResponse> {
    let member = member_id(path.into_inner())?;
    let body = payload.map(web::Json::into_inner).unwrap_or_default();
    let options = ResetOptions {
        reset_count: body.reset_count,
        unblock: body.unblock,
    };
    let member = state
        .moderation
        .reset_warnings(caller.principal(), member, options)
        .await?;
    Ok(envelope::ok(member, "Warnings reset"))
}

#[cfg(test)]
#[path = "admin_tests.rs"]
mod tests;
