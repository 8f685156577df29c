//! Chat handlers. Chats are opened by accept flows, never directly.
//!
//! ```text
//! GET  /api/v1/chats
//! GET  /api/v1/chats/{id}
//! GET  /api/v1/chats/{id}/messages?page=&limit=
//! POST /api/v1/chats/{id}/messages {"content":"..."}
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{ChatId, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::envelope;
use crate::inbound::http::params::{IdPath, PageQuery};
use crate::inbound::http::schemas::{ChatMessageSchema, ChatSchema, ErrorSchema, PageSchema};
use crate::inbound::http::session::Caller;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id};

/// Body of `POST /api/v1/chats/{id}/messages`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct PostMessageBody {
    /// 1 to 1000 characters after trimming.
    #[serde(default)]
    pub content: String,
}

fn chat_id(path: IdPath) -> Result<ChatId, Error> {
    parse_id(&path.id, FieldName::new("chatId"))
}

/// Chats the caller takes part in.
#[utoipa::path(
    get,
    path = "/api/v1/chats",
    responses(
        (status = 200, description = "Chats", body = [ChatSchema]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["chats"],
    operation_id = "listChats"
)]
#[get("/chats")]
pub async fn list_chats(state: web::Data<HttpState>, caller: Caller) -> ApiResult<HttpResponse> {
    let chats = state.chats_query.list_mine(caller.principal()).await?;
    Ok(envelope::ok(chats, "Chats fetched"))
}

#[utoipa::path(
    get,
    path = "/api/v1/chats/{id}",
    params(("id" = String, Path, description = "Chat identifier")),
    responses(
        (status = 200, description = "Chat", body = ChatSchema),
        (status = 403, description = "Not a participant", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["chats"],
    operation_id = "getChat"
)]
#[get("/chats/{id}")]
pub async fn get_chat(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<IdPath>,
) -> ApiResult<HttpResponse> {
    let id = chat_id(path.into_inner())?;
    let chat = state.chats_query.get(caller.principal(), id).await?;
    Ok(envelope::ok(chat, "Chat fetched"))
}

/// Messages in chronological order.
#[utoipa::path(
    get,
    path = "/api/v1/chats/{id}/messages",
    params(("id" = String, Path, description = "Chat identifier"), PageQuery),
    responses(
        (status = 200, description = "Messages", body = PageSchema<ChatMessageSchema>),
        (status = 403, description = "Not a participant", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["chats"],
    operation_id = "listChatMessages"
)]
#[get("/chats/{id}/messages")]
pub async fn list_messages(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<IdPath>,
    query: web::Query<PageQuery>,
) -> ApiResult<HttpResponse> {
    let id = chat_id(path.into_inner())?;
    let messages = state
        .chats_query
        .list_messages(caller.principal(), id, query.into_inner().request())
        .await?;
    Ok(envelope::ok(messages, "Messages fetched"))
}

/// Send a message; the other participant is notified.
#[utoipa::path(
    post,
    path = "/api/v1/chats/{id}/messages",
    params(("id" = String, Path, description = "Chat identifier")),
    request_body = PostMessageBody,
    responses(
        (status = 201, description = "Message sent", body = ChatMessageSchema),
        (status = 400, description = "Invalid message", body = ErrorSchema),
        (status = 403, description = "Not a participant or member is blocked", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["chats"],
    operation_id = "postChatMessage"
)]
#[post("/chats/{id}/messages")]
pub async fn post_message(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<IdPath>,
    payload: web::Json<PostMessageBody>,
) -> ApiResult<HttpResponse> {
    let id = chat_id(path.into_inner())?;
    caller.ensure_unblocked(&state).await?;
    let message = state
        .chats
        .post_message(caller.principal(), id, payload.into_inner().content)
        .await?;
    Ok(envelope::created(message, "Message sent"))
}
