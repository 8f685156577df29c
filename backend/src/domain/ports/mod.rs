//! Domain ports for the hexagonal boundary.
//!
//! Driven ports (repositories, the identity verifier, the report
//! validator, metrics) are implemented by outbound adapters. Driving ports
//! (commands, queries, the notifier, the inbox) are implemented by the
//! domain services and consumed by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod chat_command;
mod chat_query;
mod chat_repository;
mod identity_verifier;
mod member_directory;
mod member_repository;
mod moderation_command;
mod moderation_metrics;
mod moderation_query;
mod notification_inbox;
mod notification_repository;
mod notifier;
mod report_repository;
mod report_validator;
mod request_command;
mod request_query;
mod request_repository;
mod response_command;
mod response_query;
mod response_repository;

#[cfg(test)]
pub use chat_command::MockChatCommand;
pub use chat_command::ChatCommand;
#[cfg(test)]
pub use chat_query::MockChatQuery;
pub use chat_query::ChatQuery;
#[cfg(test)]
pub use chat_repository::MockChatRepository;
pub use chat_repository::{ChatRepository, ChatRepositoryError};
#[cfg(test)]
pub use identity_verifier::MockIdentityVerifier;
pub use identity_verifier::{FixtureIdentityVerifier, IdentityVerifier, IdentityVerifierError};
#[cfg(test)]
pub use member_directory::MockMemberDirectory;
pub use member_directory::MemberDirectory;
#[cfg(test)]
pub use member_repository::MockMemberRepository;
pub use member_repository::{
    MemberRepository, MemberRepositoryError, TrustReset, WarningRecorded,
};
#[cfg(test)]
pub use moderation_command::MockModerationCommand;
pub use moderation_command::ModerationCommand;
#[cfg(test)]
pub use moderation_metrics::MockModerationMetrics;
pub use moderation_metrics::{ModerationMetrics, ModerationMetricsError, NoOpModerationMetrics};
#[cfg(test)]
pub use moderation_query::MockModerationQuery;
pub use moderation_query::ModerationQuery;
#[cfg(test)]
pub use notification_inbox::MockNotificationInbox;
pub use notification_inbox::{InboxPage, NotificationInbox};
#[cfg(test)]
pub use notification_repository::MockNotificationRepository;
pub use notification_repository::{NotificationRepository, NotificationRepositoryError};
#[cfg(test)]
pub use notifier::MockNotifier;
pub use notifier::Notifier;
#[cfg(test)]
pub use report_repository::MockReportRepository;
pub use report_repository::{ReportRepository, ReportRepositoryError};
#[cfg(test)]
pub use report_validator::MockReportValidator;
pub use report_validator::{
    HEURISTIC_MIN_DESCRIPTION_CHARS, HeuristicReportValidator, ReportValidator,
    ReportValidatorError,
};
#[cfg(test)]
pub use request_command::MockRequestCommand;
pub use request_command::{RequestAccepted, RequestCommand};
#[cfg(test)]
pub use request_query::MockRequestQuery;
pub use request_query::RequestQuery;
#[cfg(test)]
pub use request_repository::MockRequestRepository;
pub use request_repository::{RequestFilter, RequestRepository, RequestRepositoryError};
#[cfg(test)]
pub use response_command::MockResponseCommand;
pub use response_command::{ResponseAccepted, ResponseCommand};
#[cfg(test)]
pub use response_query::MockResponseQuery;
pub use response_query::ResponseQuery;
#[cfg(test)]
pub use response_repository::MockResponseRepository;
pub use response_repository::{ResponseRepository, ResponseRepositoryError};
