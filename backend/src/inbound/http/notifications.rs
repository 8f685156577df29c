//! Notification inbox handlers.
//!
//! ```text
//! GET    /api/v1/notifications?unreadOnly=&page=&limit=
//! POST   /api/v1/notifications/read-all
//! POST   /api/v1/notifications/{id}/read
//! DELETE /api/v1/notifications/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Error, NotificationId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::envelope;
use crate::inbound::http::params::{IdPath, PageQuery};
use crate::inbound::http::schemas::{ErrorSchema, InboxPageSchema};
use crate::inbound::http::session::Caller;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct InboxQuery {
    /// Only return unread notifications.
    #[serde(default)]
    pub unread_only: bool,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Count of notifications flipped by `read-all`.
#[derive(Debug, Serialize, ToSchema)]
pub struct MarkedRead {
    pub updated: u64,
}

fn notification_id(path: IdPath) -> Result<NotificationId, Error> {
    parse_id(&path.id, FieldName::new("notificationId"))
}

/// The caller's notifications, newest first, with the unread total.
#[utoipa::path(
    get,
    path = "/api/v1/notifications",
    params(InboxQuery),
    responses(
        (status = 200, description = "Inbox", body = InboxPageSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["notifications"],
    operation_id = "listNotifications"
)]
#[get("/notifications")]
pub async fn list_notifications(
    state: web::Data<HttpState>,
    caller: Caller,
    query: web::Query<InboxQuery>,
) -> ApiResult<HttpResponse> {
    let query = query.into_inner();
    let page = PageQuery {
        page: query.page,
        limit: query.limit,
    }
    .request();
    let inbox = state
        .inbox
        .list(caller.principal(), query.unread_only, page)
        .await?;
    Ok(envelope::ok(inbox, "Notifications fetched"))
}

#[utoipa::path(
    post,
    path = "/api/v1/notifications/read-all",
    responses(
        (status = 200, description = "All notifications read", body = MarkedRead),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["notifications"],
    operation_id = "markAllNotificationsRead"
)]
#[post("/notifications/read-all")]
pub async fn mark_all_read(
    state: web::Data<HttpState>,
    caller: Caller,
) -> ApiResult<HttpResponse> {
    let updated = state.inbox.mark_all_read(caller.principal()).await?;
    Ok(envelope::ok(MarkedRead { updated }, "Notifications marked read"))
}

#[utoipa::path(
    post,
    path = "/api/v1/notifications/{id}/read",
    params(("id" = String, Path, description = "Notification identifier")),
    responses(
        (status = 200, description = "Notification read"),
        (status = 403, description = "Not the addressee", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["notifications"],
    operation_id = "markNotificationRead"
)]
#[post("/notifications/{id}/read")]
pub async fn mark_read(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<IdPath>,
) -> ApiResult<HttpResponse> {
    let id = notification_id(path.into_inner())?;
    state.inbox.mark_read(caller.principal(), id).await?;
    Ok(envelope::done("Notification marked read"))
}

#[utoipa::path(
    delete,
    path = "/api/v1/notifications/{id}",
    params(("id" = String, Path, description = "Notification identifier")),
    responses(
        (status = 200, description = "Notification deleted"),
        (status = 403, description = "Not the addressee", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["notifications"],
    operation_id = "deleteNotification"
)]
#[delete("/notifications/{id}")]
pub async fn delete_notification(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<IdPath>,
) -> ApiResult<HttpResponse> {
    let id = notification_id(path.into_inner())?;
    state.inbox.delete(caller.principal(), id).await?;
    Ok(envelope::done("Notification deleted"))
}
