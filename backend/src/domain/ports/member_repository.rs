//! Port for member records and the trust ledger.
//!
//! Warnings are applied through `ReportRepository::file_with_warning` so
//! the report and its ledger entry commit together. Resets here must update
//! the counters and clear the history in one unit.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    Member, MemberId, Page, PageRequest, ResetOptions, Role, VerifiedIdentity, WarningEntry,
    WarningOutcome,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by member repository adapters.
    pub enum MemberRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "member repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "member repository query failed: {message}",
    }
}

/// Member state after a warning was applied.
#[derive(Debug, Clone, PartialEq)]
pub struct WarningRecorded {
    pub member: Member,
    pub outcome: WarningOutcome,
}

/// Member state after an administrative reset.
#[derive(Debug, Clone, PartialEq)]
pub struct TrustReset {
    pub member: Member,
    /// Whether the reset lifted an existing block.
    pub unblocked: bool,
}

/// Port for member storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MemberRepository: Send + Sync {
    /// Fetch a member by id.
    async fn find(&self, id: MemberId) -> Result<Option<Member>, MemberRepositoryError>;

    /// Insert the member or refresh role, activity, and display name.
    ///
    /// Trust fields and the help count are never touched by this call.
    async fn upsert_identity(
        &self,
        identity: &VerifiedIdentity,
        now: DateTime<Utc>,
    ) -> Result<Member, MemberRepositoryError>;

    /// Resolve the current members holding `role`.
    async fn list_ids_by_role(&self, role: Role) -> Result<Vec<MemberId>, MemberRepositoryError>;

    /// Add one to the member's help count.
    async fn increment_help_count(&self, id: MemberId) -> Result<(), MemberRepositoryError>;

    /// Apply an administrative reset; clearing the count also clears history.
    ///
    /// Returns `None` when the member does not exist.
    async fn reset_trust(
        &self,
        id: MemberId,
        options: ResetOptions,
    ) -> Result<Option<TrustReset>, MemberRepositoryError>;

    /// Warning history, newest first.
    async fn warning_history(&self, id: MemberId) -> Result<Vec<WarningEntry>, MemberRepositoryError>;

    /// Blocked members, most recently blocked first.
    async fn list_blocked(&self, page: PageRequest) -> Result<Page<Member>, MemberRepositoryError>;

    /// Unblocked members with at least `threshold` warnings, highest first.
    async fn list_at_risk(
        &self,
        threshold: u32,
        page: PageRequest,
    ) -> Result<Page<Member>, MemberRepositoryError>;
}
