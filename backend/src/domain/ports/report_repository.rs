//! Port for report persistence.
//!
//! A validated report and the warning it earns are written together: the
//! report row, the locked counter update, the block decision and the history
//! entry commit in one unit or not at all.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    BlockThreshold, MemberId, Page, PageRequest, Report, ReportId, ReportReason, ReportReview,
    ReportStatus,
};

use super::WarningRecorded;
use super::define_port_error;

define_port_error! {
    /// Errors raised by report repository adapters.
    pub enum ReportRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "report repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "report repository query failed: {message}",
        /// The (reported, reporter, reason) triple is already on file.
        Duplicate { message: String } =>
            "report already exists: {message}",
    }
}

/// Port for report storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReportRepository: Send + Sync {
    /// Persist a report; a taken triple yields `Duplicate`.
    async fn insert(&self, report: &Report) -> Result<(), ReportRepositoryError>;

    /// Persist a validated report and apply its warning to the reported
    /// member atomically.
    ///
    /// Returns `None`, writing nothing, when the member does not exist. A
    /// taken triple yields `Duplicate` and leaves the ledger untouched.
    async fn file_with_warning(
        &self,
        report: &Report,
        threshold: BlockThreshold,
        now: DateTime<Utc>,
    ) -> Result<Option<WarningRecorded>, ReportRepositoryError>;

    /// Fetch a report by id.
    async fn find(&self, id: ReportId) -> Result<Option<Report>, ReportRepositoryError>;

    /// Whether the triple is already on file.
    async fn exists(
        &self,
        reported: MemberId,
        reporter: MemberId,
        reason: ReportReason,
    ) -> Result<bool, ReportRepositoryError>;

    /// Store an administrative review. Returns `None` when missing.
    async fn save_review(
        &self,
        id: ReportId,
        review: &ReportReview,
    ) -> Result<Option<Report>, ReportRepositoryError>;

    /// Reports, optionally filtered by status, newest first.
    async fn list(
        &self,
        status: Option<ReportStatus>,
        page: PageRequest,
    ) -> Result<Page<Report>, ReportRepositoryError>;

    /// Reports lodged against `reported`, newest first.
    async fn list_against(
        &self,
        reported: MemberId,
        page: PageRequest,
    ) -> Result<Page<Report>, ReportRepositoryError>;
}
