//! Help request handlers.
//!
//! ```text
//! POST   /api/v1/requests
//! GET    /api/v1/requests?status=&category=&urgency=&page=&limit=
//! GET    /api/v1/requests/mine
//! GET    /api/v1/requests/{id}
//! PATCH  /api/v1/requests/{id}
//! DELETE /api/v1/requests/{id}
//! POST   /api/v1/requests/{id}/accept
//! POST   /api/v1/requests/{id}/cancel
//! POST   /api/v1/requests/{id}/fulfill
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::RequestFilter;
use crate::domain::{
    Category, ContactPreference, Error, RequestDraft, RequestEdit, RequestId, RequestStatus,
    Urgency,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::envelope;
use crate::inbound::http::params::{IdPath, PageQuery};
use crate::inbound::http::schemas::{
    ErrorSchema, HelpRequestSchema, PageSchema, RequestAcceptedSchema,
};
use crate::inbound::http::session::Caller;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id, parse_variant};

/// Body of `POST /api/v1/requests`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequestBody {
    /// 5 to 200 characters after trimming.
    #[serde(default)]
    pub title: String,
    /// 10 to 1000 characters after trimming.
    #[serde(default)]
    pub description: String,
    #[schema(example = "academic")]
    pub category: Option<String>,
    #[schema(example = "urgent")]
    pub urgency: Option<String>,
    #[schema(example = "chat")]
    pub contact: Option<String>,
    pub location_hint: Option<String>,
    /// Absolute URL produced by the blob store.
    #[schema(format = "uri")]
    pub image_url: Option<String>,
    /// Lifetime in hours, 1 to 168.
    pub expiry_hours: Option<u32>,
}

/// Body of `PATCH /api/v1/requests/{id}`; absent fields stay unchanged.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequestBody {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub urgency: Option<String>,
    /// An empty string clears the hint.
    pub location_hint: Option<String>,
}

/// Listing filter for `GET /api/v1/requests`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RequestListQuery {
    /// Effective status to match (default `open`).
    pub status: Option<String>,
    pub category: Option<String>,
    pub urgency: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

fn parse_draft(body: CreateRequestBody) -> Result<RequestDraft, Error> {
    Ok(RequestDraft {
        category: parse_variant::<Category>(body.category.as_deref(), FieldName::new("category"))?,
        urgency: parse_variant::<Urgency>(body.urgency.as_deref(), FieldName::new("urgency"))?,
        contact: parse_variant::<ContactPreference>(
            body.contact.as_deref(),
            FieldName::new("contact"),
        )?,
        title: body.title,
        description: body.description,
        location_hint: body.location_hint,
        image_url: body.image_url,
        expiry_hours: body.expiry_hours,
    })
}

fn parse_edit(body: UpdateRequestBody) -> Result<RequestEdit, Error> {
    Ok(RequestEdit {
        category: parse_variant::<Category>(body.category.as_deref(), FieldName::new("category"))?,
        urgency: parse_variant::<Urgency>(body.urgency.as_deref(), FieldName::new("urgency"))?,
        title: body.title,
        description: body.description,
        location_hint: body.location_hint,
    })
}

fn parse_filter(query: &RequestListQuery) -> Result<RequestFilter, Error> {
    Ok(RequestFilter {
        status: parse_variant::<RequestStatus>(query.status.as_deref(), FieldName::new("status"))?
            .unwrap_or(RequestStatus::Open),
        category: parse_variant(query.category.as_deref(), FieldName::new("category"))?,
        urgency: parse_variant(query.urgency.as_deref(), FieldName::new("urgency"))?,
    })
}

fn request_id(path: IdPath) -> Result<RequestId, Error> {
    parse_id(&path.id, FieldName::new("requestId"))
}

/// Publish a new help request.
#[utoipa::path(
    post,
    path = "/api/v1/requests",
    request_body = CreateRequestBody,
    responses(
        (status = 201, description = "Request created", body = HelpRequestSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Member is blocked", body = ErrorSchema)
    ),
    tags = ["requests"],
    operation_id = "createRequest"
)]
#[post("/requests")]
pub async fn create_request(
    state: web::Data<HttpState>,
    caller: Caller,
    payload: web::Json<CreateRequestBody>,
) -> ApiResult<HttpResponse> {
    caller.ensure_unblocked(&state).await?;
    let draft = parse_draft(payload.into_inner())?;
    let request = state.requests.create(caller.principal(), draft).await?;
    Ok(envelope::created(request, "Request created"))
}

/// List requests by effective status, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/requests",
    params(RequestListQuery),
    responses(
        (status = 200, description = "Requests", body = PageSchema<HelpRequestSchema>),
        (status = 400, description = "Invalid filter", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["requests"],
    operation_id = "listRequests"
)]
#[get("/requests")]
pub async fn list_requests(
    state: web::Data<HttpState>,
    _caller: Caller,
    query: web::Query<RequestListQuery>,
) -> ApiResult<HttpResponse> {
    let query = query.into_inner();
    let filter = parse_filter(&query)?;
    let page = PageQuery {
        page: query.page,
        limit: query.limit,
    }
    .request();
    let requests = state.requests_query.list(filter, page).await?;
    Ok(envelope::ok(requests, "Requests fetched"))
}

/// Requests owned by the caller, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/requests/mine",
    params(PageQuery),
    responses(
        (status = 200, description = "Own requests", body = PageSchema<HelpRequestSchema>),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["requests"],
    operation_id = "listMyRequests"
)]
#[get("/requests/mine")]
pub async fn list_my_requests(
    state: web::Data<HttpState>,
    caller: Caller,
    query: web::Query<PageQuery>,
) -> ApiResult<HttpResponse> {
    let requests = state
        .requests_query
        .list_mine(caller.principal(), query.into_inner().request())
        .await?;
    Ok(envelope::ok(requests, "Requests fetched"))
}

/// Fetch one request with its effective status.
#[utoipa::path(
    get,
    path = "/api/v1/requests/{id}",
    params(("id" = String, Path, description = "Request identifier")),
    responses(
        (status = 200, description = "Request", body = HelpRequestSchema),
        (status = 400, description = "Invalid identifier", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["requests"],
    operation_id = "getRequest"
)]
#[get("/requests/{id}")]
pub async fn get_request(
    state: web::Data<HttpState>,
    _caller: Caller,
    path: web::Path<IdPath>,
) -> ApiResult<HttpResponse> {
    let id = request_id(path.into_inner())?;
    let request = state.requests_query.get(id).await?;
    Ok(envelope::ok(request, "Request fetched"))
}

/// Edit allowlisted fields of an owned request.
#[utoipa::path(
    patch,
    path = "/api/v1/requests/{id}",
    params(("id" = String, Path, description = "Request identifier")),
    request_body = UpdateRequestBody,
    responses(
        (status = 200, description = "Request updated", body = HelpRequestSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Not the owner", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Request can no longer be edited", body = ErrorSchema)
    ),
    tags = ["requests"],
    operation_id = "updateRequest"
)]
#[patch("/requests/{id}")]
pub async fn update_request(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<IdPath>,
    payload: web::Json<UpdateRequestBody>,
) -> ApiResult<HttpResponse> {
    let id = request_id(path.into_inner())?;
    let edit = parse_edit(payload.into_inner())?;
    let request = state.requests.update(caller.principal(), id, edit).await?;
    Ok(envelope::ok(request, "Request updated"))
}

/// Delete an owned, unengaged request inside the deletion window.
#[utoipa::path(
    delete,
    path = "/api/v1/requests/{id}",
    params(("id" = String, Path, description = "Request identifier")),
    responses(
        (status = 200, description = "Request deleted"),
        (status = 403, description = "Not the owner", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Request can no longer be deleted", body = ErrorSchema)
    ),
    tags = ["requests"],
    operation_id = "deleteRequest"
)]
#[delete("/requests/{id}")]
pub async fn delete_request(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<IdPath>,
) -> ApiResult<HttpResponse> {
    let id = request_id(path.into_inner())?;
    state.requests.delete(caller.principal(), id).await?;
    Ok(envelope::done("Request deleted"))
}

/// Claim an open request as its helper.
#[utoipa::path(
    post,
    path = "/api/v1/requests/{id}/accept",
    params(("id" = String, Path, description = "Request identifier")),
    responses(
        (status = 200, description = "Request accepted; chat provisioned", body = RequestAcceptedSchema),
        (status = 403, description = "Own request or member is blocked", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Request is no longer open", body = ErrorSchema)
    ),
    tags = ["requests"],
    operation_id = "acceptRequest"
)]
#[post("/requests/{id}/accept")]
pub async fn accept_request(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<IdPath>,
) -> ApiResult<HttpResponse> {
    let id = request_id(path.into_inner())?;
    caller.ensure_unblocked(&state).await?;
    let accepted = state.requests.accept(caller.principal(), id).await?;
    Ok(envelope::ok(accepted, "Request accepted"))
}

/// Withdraw an owned request.
#[utoipa::path(
    post,
    path = "/api/v1/requests/{id}/cancel",
    params(("id" = String, Path, description = "Request identifier")),
    responses(
        (status = 200, description = "Request cancelled", body = HelpRequestSchema),
        (status = 403, description = "Not the owner", body = ErrorSchema),
        (status = 409, description = "Request is fulfilled", body = ErrorSchema)
    ),
    tags = ["requests"],
    operation_id = "cancelRequest"
)]
#[post("/requests/{id}/cancel")]
pub async fn cancel_request(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<IdPath>,
) -> ApiResult<HttpResponse> {
    let id = request_id(path.into_inner())?;
    let request = state.requests.cancel(caller.principal(), id).await?;
    Ok(envelope::ok(request, "Request cancelled"))
}

/// Mark an in-progress request as fulfilled.
#[utoipa::path(
    post,
    path = "/api/v1/requests/{id}/fulfill",
    params(("id" = String, Path, description = "Request identifier")),
    responses(
        (status = 200, description = "Request fulfilled", body = HelpRequestSchema),
        (status = 403, description = "Not the owner", body = ErrorSchema),
        (status = 409, description = "Request is not in progress", body = ErrorSchema)
    ),
    tags = ["requests"],
    operation_id = "fulfillRequest"
)]
#[post("/requests/{id}/fulfill")]
pub async fn fulfill_request(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<IdPath>,
) -> ApiResult<HttpResponse> {
    let id = request_id(path.into_inner())?;
    let request = state.requests.fulfill(caller.principal(), id).await?;
    Ok(envelope::ok(request, "Request fulfilled"))
}

#[cfg(test)]
#[path = "requests_tests.rs"]
mod tests;
