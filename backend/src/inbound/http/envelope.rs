//! Uniform response envelope.
//!
//! Every `/api/v1` response body has the shape `{status, data, message}`.
//! Errors reuse the envelope and add `code`, `traceId` and `details`.

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use serde::Serialize;

use crate::domain::Error;

/// Outcome marker carried in every envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvelopeStatus {
    Success,
    Error,
}

/// Successful response body.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub status: EnvelopeStatus,
    pub data: Option<T>,
    pub message: String,
}

/// Failed response body.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope<'a> {
    pub status: EnvelopeStatus,
    pub data: Option<()>,
    #[serde(flatten)]
    pub error: &'a Error,
}

impl<'a> ErrorEnvelope<'a> {
    pub fn new(error: &'a Error) -> Self {
        Self {
            status: EnvelopeStatus::Error,
            data: None,
            error,
        }
    }
}

fn respond<T: Serialize>(status: StatusCode, data: Option<T>, message: &str) -> HttpResponse {
    HttpResponse::build(status).json(Envelope {
        status: EnvelopeStatus::Success,
        data,
        message: message.to_owned(),
    })
}

/// `200 OK` with a payload.
pub fn ok<T: Serialize>(data: T, message: &str) -> HttpResponse {
    respond(StatusCode::OK, Some(data), message)
}

/// `201 Created` with the new resource.
pub fn created<T: Serialize>(data: T, message: &str) -> HttpResponse {
    respond(StatusCode::CREATED, Some(data), message)
}

/// `200 OK` without a payload.
pub fn done(message: &str) -> HttpResponse {
    respond::<()>(StatusCode::OK, None, message)
}
