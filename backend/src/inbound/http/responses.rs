//! Help response handlers.
//!
//! ```text
//! POST /api/v1/requests/{id}/responses
//! GET  /api/v1/requests/{id}/responses
//! GET  /api/v1/responses/mine
//! POST /api/v1/responses/{id}/accept
//! POST /api/v1/responses/{id}/reject
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, RequestId, ResponseDraft, ResponseId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::envelope;
use crate::inbound::http::params::{IdPath, PageQuery};
use crate::inbound::http::schemas::{
    ErrorSchema, HelpResponseSchema, PageSchema, ResponseAcceptedSchema,
};
use crate::inbound::http::session::Caller;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id, text_rule_error};

/// Body of `POST /api/v1/requests/{id}/responses`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponseBody {
    /// 5 to 1000 characters after trimming.
    #[serde(default)]
    pub message: String,
    #[schema(format = "uri")]
    pub image_url: Option<String>,
}

fn response_id(path: IdPath) -> Result<ResponseId, Error> {
    parse_id(&path.id, FieldName::new("responseId"))
}

/// Offer help on an open request.
#[utoipa::path(
    post,
    path = "/api/v1/requests/{id}/responses",
    params(("id" = String, Path, description = "Request identifier")),
    request_body = SubmitResponseBody,
    responses(
        (status = 201, description = "Response submitted", body = HelpResponseSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Member is blocked", body = ErrorSchema),
        (status = 404, description = "Request not found", body = ErrorSchema),
        (status = 409, description = "Own request, request closed, or already answered", body = ErrorSchema)
    ),
    tags = ["responses"],
    operation_id = "submitResponse"
)]
#[post("/requests/{id}/responses")]
pub async fn submit_response(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<IdPath>,
    payload: web::Json<SubmitResponseBody>,
) -> ApiResult<HttpResponse> {
    let request_id: RequestId = parse_id(&path.into_inner().id, FieldName::new("requestId"))?;
    caller.ensure_unblocked(&state).await?;
    let body = payload.into_inner();
    let draft = ResponseDraft::new(&body.message, body.image_url.as_deref())
        .map_err(text_rule_error)?;
    let response = state
        .responses
        .submit(caller.principal(), request_id, draft)
        .await?;
    Ok(envelope::created(response, "Response submitted"))
}

/// Responses to a request. Owners see all of them; other members see only
/// their own.
#[utoipa::path(
    get,
    path = "/api/v1/requests/{id}/responses",
    params(("id" = String, Path, description = "Request identifier")),
    responses(
        (status = 200, description = "Responses", body = [HelpResponseSchema]),
        (status = 404, description = "Request not found", body = ErrorSchema)
    ),
    tags = ["responses"],
    operation_id = "listRequestResponses"
)]
#[get("/requests/{id}/responses")]
pub async fn list_request_responses(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<IdPath>,
) -> ApiResult<HttpResponse> {
    let request_id: RequestId = parse_id(&path.into_inner().id, FieldName::new("requestId"))?;
    let responses = state
        .responses_query
        .list_for_request(caller.principal(), request_id)
        .await?;
    Ok(envelope::ok(responses, "Responses fetched"))
}

/// Responses the caller has made, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/responses/mine",
    params(PageQuery),
    responses(
        (status = 200, description = "Own responses", body = PageSchema<HelpResponseSchema>),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["responses"],
    operation_id = "listMyResponses"
)]
#[get("/responses/mine")]
pub async fn list_my_responses(
    state: web::Data<HttpState>,
    caller: Caller,
    query: web::Query<PageQuery>,
) -> ApiResult<HttpResponse> {
    let responses = state
        .responses_query
        .list_mine(caller.principal(), query.into_inner().request())
        .await?;
    Ok(envelope::ok(responses, "Responses fetched"))
}

/// Accept a response; the request moves to in progress and a chat opens.
#[utoipa::path(
    post,
    path = "/api/v1/responses/{id}/accept",
    params(("id" = String, Path, description = "Response identifier")),
    responses(
        (status = 200, description = "Response accepted", body = ResponseAcceptedSchema),
        (status = 403, description = "Not the request owner", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Another response was already accepted", body = ErrorSchema)
    ),
    tags = ["responses"],
    operation_id = "acceptResponse"
)]
#[post("/responses/{id}/accept")]
pub async fn accept_response(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<IdPath>,
) -> ApiResult<HttpResponse> {
    let id = response_id(path.into_inner())?;
    let accepted = state.responses.accept(caller.principal(), id).await?;
    Ok(envelope::ok(accepted, "Response accepted"))
}

/// Decline a pending response.
#[utoipa::path(
    post,
    path = "/api/v1/responses/{id}/reject",
    params(("id" = String, Path, description = "Response identifier")),
    responses(
        (status = 200, description = "Response rejected", body = HelpResponseSchema),
        (status = 403, description = "Not the request owner", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Response was already accepted", body = ErrorSchema)
    ),
    tags = ["responses"],
    operation_id = "rejectResponse"
)]
#[post("/responses/{id}/reject")]
pub async fn reject_response(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<IdPath>,
) -> ApiResult<HttpResponse> {
    let id = response_id(path.into_inner())?;
    let response = state.responses.reject(caller.principal(), id).await?;
    Ok(envelope::ok(response, "Response rejected"))
}
