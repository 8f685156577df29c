//! Translation of port failures into domain errors, shared by services.

use serde_json::json;

use super::{Error, RequestValidationError, TextRuleError};
use super::ports::{
    ChatRepositoryError, MemberRepositoryError, NotificationRepositoryError,
    ReportRepositoryError, RequestRepositoryError, ResponseRepositoryError,
};

macro_rules! map_storage_error {
    ($fn_name:ident, $error:ident, $label:literal) => {
        pub(crate) fn $fn_name(error: $error) -> Error {
            match error {
                $error::Connection { message } => {
                    Error::service_unavailable(format!("{} unavailable: {message}", $label))
                }
                $error::Query { message } => {
                    Error::internal(format!("{} error: {message}", $label))
                }
            }
        }
    };
}

map_storage_error!(map_member_error, MemberRepositoryError, "member repository");
map_storage_error!(map_request_error, RequestRepositoryError, "request repository");
map_storage_error!(
    map_notification_error,
    NotificationRepositoryError,
    "notification repository"
);

pub(crate) fn map_response_error(error: ResponseRepositoryError) -> Error {
    match error {
        ResponseRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("response repository unavailable: {message}"))
        }
        ResponseRepositoryError::Query { message } => {
            Error::internal(format!("response repository error: {message}"))
        }
        ResponseRepositoryError::Duplicate { .. } => {
            Error::conflict("a response from this member already exists for the request")
        }
    }
}

pub(crate) fn map_chat_error(error: ChatRepositoryError) -> Error {
    match error {
        ChatRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("chat repository unavailable: {message}"))
        }
        ChatRepositoryError::Query { message } | ChatRepositoryError::Duplicate { message } => {
            Error::internal(format!("chat repository error: {message}"))
        }
    }
}

pub(crate) fn map_report_error(error: ReportRepositoryError) -> Error {
    match error {
        ReportRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("report repository unavailable: {message}"))
        }
        ReportRepositoryError::Query { message } => {
            Error::internal(format!("report repository error: {message}"))
        }
        ReportRepositoryError::Duplicate { .. } => {
            Error::conflict("you have already reported this member for this reason")
        }
    }
}

/// Build an `invalid_request` error naming the offending field.
pub(crate) fn invalid_field(field: &str, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "code": "invalid_field",
    }))
}

pub(crate) fn map_text_rule(error: TextRuleError) -> Error {
    invalid_field(error.field(), error.to_string())
}

pub(crate) fn map_request_validation(error: RequestValidationError) -> Error {
    invalid_field(error.field(), error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case(RequestRepositoryError::connection("pool"), ErrorCode::ServiceUnavailable)]
    #[case(RequestRepositoryError::query("syntax"), ErrorCode::InternalError)]
    fn storage_errors_map_by_kind(#[case] error: RequestRepositoryError, #[case] code: ErrorCode) {
        assert_eq!(map_request_error(error).code(), code);
    }

    #[rstest]
    fn duplicates_become_conflicts() {
        assert_eq!(
            map_response_error(ResponseRepositoryError::duplicate("uq")).code(),
            ErrorCode::Conflict
        );
        assert_eq!(
            map_report_error(ReportRepositoryError::duplicate("uq")).code(),
            ErrorCode::Conflict
        );
    }

    #[rstest]
    fn invalid_field_names_the_field() {
        let err = invalid_field("title", "title must be at least 5 characters");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        let details = err.details().expect("details");
        assert_eq!(details["field"], "title");
    }
}
