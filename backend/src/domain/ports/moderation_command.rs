//! Driving port for moderation writes.

use async_trait::async_trait;

use crate::domain::{
    Error, Member, MemberId, Principal, Report, ReportClaim, ReportId, ReportStatus, ResetOptions,
};

/// Inbound contract for reports and trust resets.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModerationCommand: Send + Sync {
    /// File a report, classify it, and warn the member when validated.
    async fn create_report(
        &self,
        caller: Principal,
        reported: MemberId,
        claim: ReportClaim,
    ) -> Result<Report, Error>;

    /// Record an administrative review; never touches the trust ledger.
    async fn update_report(
        &self,
        caller: Principal,
        id: ReportId,
        status: ReportStatus,
        notes: Option<String>,
    ) -> Result<Report, Error>;

    /// Reset a member's counter and/or block; administrators only.
    async fn reset_warnings(
        &self,
        caller: Principal,
        member: MemberId,
        options: ResetOptions,
    ) -> Result<Member, Error>;
}
