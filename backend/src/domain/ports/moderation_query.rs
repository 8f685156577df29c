//! Driving port for moderation reads.
//!
//! Everything except [`ModerationQuery::block_status`] requires the
//! administrator role.

use async_trait::async_trait;

use crate::domain::{
    BlockStatus, Error, Member, MemberId, Page, PageRequest, Principal, Report, ReportId,
    ReportStatus, WarningEntry,
};

/// Inbound contract for moderation reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModerationQuery: Send + Sync {
    /// Gate read consulted before writes.
    async fn block_status(&self, member: MemberId) -> Result<BlockStatus, Error>;

    async fn list_reports(
        &self,
        caller: Principal,
        status: Option<ReportStatus>,
        page: PageRequest,
    ) -> Result<Page<Report>, Error>;

    async fn get_report(&self, caller: Principal, id: ReportId) -> Result<Report, Error>;

    async fn reports_against(
        &self,
        caller: Principal,
        member: MemberId,
        page: PageRequest,
    ) -> Result<Page<Report>, Error>;

    async fn blocked_members(
        &self,
        caller: Principal,
        page: PageRequest,
    ) -> Result<Page<Member>, Error>;

    async fn at_risk_members(
        &self,
        caller: Principal,
        page: PageRequest,
    ) -> Result<Page<Member>, Error>;

    async fn warning_history(
        &self,
        caller: Principal,
        member: MemberId,
    ) -> Result<Vec<WarningEntry>, Error>;
}
