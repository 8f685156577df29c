//! Responses: help offers made against a request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::request::string_enum;
use super::text::{TextRuleError, bounded_text, image_url};
use super::{MemberId, RequestId, ResponseId};

const MESSAGE_MIN: usize = 5;
const MESSAGE_MAX: usize = 1000;

string_enum!(
    /// Decision state of a response.
    ResponseStatus {
        Pending => "pending",
        Accepted => "accepted",
        Rejected => "rejected",
    } default Pending
);

/// An offer to help with one request.
///
/// At most one response exists per (request, responder) pair, and at most
/// one response per request ever reaches [`ResponseStatus::Accepted`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HelpResponse {
    pub id: ResponseId,
    pub request_id: RequestId,
    pub responder: MemberId,
    pub message: String,
    pub image_url: Option<String>,
    pub status: ResponseStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated body of a new response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseDraft {
    pub message: String,
    pub image_url: Option<String>,
}

impl ResponseDraft {
    /// Validate caller-supplied fields.
    pub fn new(message: &str, image: Option<&str>) -> Result<Self, TextRuleError> {
        Ok(Self {
            message: bounded_text("message", message, MESSAGE_MIN, MESSAGE_MAX)?,
            image_url: image.map(|raw| image_url("imageUrl", raw)).transpose()?,
        })
    }
}

impl HelpResponse {
    /// Create a pending response.
    pub fn pending(
        request_id: RequestId,
        responder: MemberId,
        draft: ResponseDraft,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ResponseId::random(),
            request_id,
            responder,
            message: draft.message,
            image_url: draft.image_url,
            status: ResponseStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn draft_trims_message() {
        let draft = ResponseDraft::new("  I have one  ", None).expect("valid");
        assert_eq!(draft.message, "I have one");
    }

    #[rstest]
    fn draft_rejects_short_message() {
        let err = ResponseDraft::new("ok", None).expect_err("too short");
        assert_eq!(err.field(), "message");
    }

    #[rstest]
    fn new_responses_are_pending() {
        let draft = ResponseDraft::new("Happy to help", None).expect("valid");
        let response = HelpResponse::pending(RequestId::random(), MemberId::random(), draft, Utc::now());
        assert_eq!(response.status, ResponseStatus::Pending);
    }
}
