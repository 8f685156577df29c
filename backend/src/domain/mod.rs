//! Domain primitives, aggregates, ports, and services.
//!
//! Purpose: define the marketplace entities (requests, responses, chats,
//! reports, notifications, members with their trust ledger) together with
//! the engines that move them through their state machines. Nothing here
//! knows about HTTP or SQL; adapters reach the domain through [`ports`].
//!
//! Public surface:
//! - [`Error`] / [`ErrorCode`]: transport-agnostic failure payload.
//! - Entities: [`HelpRequest`], [`HelpResponse`], [`Chat`], [`Report`],
//!   [`Notification`], [`Member`].
//! - Services: [`RequestService`], [`ResponseService`], [`ChatService`],
//!   [`ModerationService`], [`NotifierService`], [`MemberService`] and their
//!   query counterparts.

mod best_effort;
mod chat;
mod chat_service;
pub mod error;
mod ids;
mod member;
mod member_service;
mod moderation_service;
mod notification;
mod notification_service;
mod pagination;
pub mod ports;
mod report;
mod request;
mod request_service;
mod response;
mod response_service;
mod service_support;
mod text;
mod trace_id;
mod trust;

pub use self::best_effort::{SideEffect, SideEffectOutcome, fire_and_forget};
pub use self::chat::{Chat, ChatMessage, ParticipantPair, SameParticipant};
pub use self::chat_service::ChatService;
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::ids::{
    ChatId, InvalidId, MemberId, MessageId, NotificationId, ReportId, RequestId, ResponseId,
};
pub use self::member::{Member, Principal, Role, UnknownRole, VerifiedIdentity};
pub use self::member_service::MemberService;
pub use self::moderation_service::{ModerationQueryService, ModerationService};
pub use self::notification::{Audience, Notification, NotificationKind};
pub use self::notification_service::{NotificationInboxService, NotifierService};
pub use self::pagination::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, Page, PageRequest};
pub use self::report::{Report, ReportClaim, ReportReason, ReportReview, ReportStatus, Severity};
pub use self::request::{
    Category, ContactPreference, DEFAULT_EXPIRY_HOURS, DELETION_WINDOW_MINUTES, ExpiryHours,
    HelpRequest, MAX_EXPIRY_HOURS, RequestDetails, RequestDraft, RequestEdit, RequestStatus,
    RequestValidationError, UnknownVariant, Urgency,
};
pub use self::request_service::{RequestQueryService, RequestService};
pub use self::response::{HelpResponse, ResponseDraft, ResponseStatus};
pub use self::response_service::{ResponseQueryService, ResponseService};
pub use self::text::TextRuleError;
pub use self::trace_id::TraceId;
pub use self::trust::{
    AUTO_BLOCK_REASON, BlockStatus, BlockThreshold, DEFAULT_AT_RISK_THRESHOLD,
    DEFAULT_BLOCK_THRESHOLD, ResetOptions, TrustStatus, WarningEntry, WarningOutcome,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use buddy_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
