//! Report storage keyed by (reported, reporter, reason).

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{MemoryStore, newest_first};
use crate::domain::ports::{ReportRepository, ReportRepositoryError, WarningRecorded};
use crate::domain::{
    BlockThreshold, MemberId, Page, PageRequest, Report, ReportId, ReportReason, ReportReview,
    ReportStatus, WarningEntry,
};

fn poisoned(err: super::StorePoisoned) -> ReportRepositoryError {
    ReportRepositoryError::query(err.to_string())
}

fn same_triple(report: &Report, reported: MemberId, reporter: MemberId, reason: ReportReason) -> bool {
    report.reported_id == reported && report.reporter_id == reporter && report.reason == reason
}

#[async_trait]
impl ReportRepository for MemoryStore {
    async fn insert(&self, report: &Report) -> Result<(), ReportRepositoryError> {
        let mut state = self.lock().map_err(poisoned)?;
        let taken = state.reports.values().any(|existing| {
            same_triple(existing, report.reported_id, report.reporter_id, report.reason)
        });
        if taken {
            return Err(ReportRepositoryError::duplicate(format!(
                "{} already reported {} for {}",
                report.reporter_id, report.reported_id, report.reason
            )));
        }
        state.reports.insert(report.id, report.clone());
        Ok(())
    }

    async fn file_with_warning(
        &self,
        report: &Report,
        threshold: BlockThreshold,
        now: DateTime<Utc>,
    ) -> Result<Option<WarningRecorded>, ReportRepositoryError> {
        let mut guard = self.lock().map_err(poisoned)?;
        let state = &mut *guard;
        let Some(member) = state.members.get_mut(&report.reported_id) else {
            return Ok(None);
        };
        if state.reports.values().any(|existing| {
            same_triple(existing, report.reported_id, report.reporter_id, report.reason)
        }) {
            return Err(ReportRepositoryError::duplicate(format!(
                "{} already reported {} for {}",
                report.reporter_id, report.reported_id, report.reason
            )));
        }
        state.reports.insert(report.id, report.clone());
        let outcome = member.trust.record_warning(threshold, now);
        state.warnings.push(WarningEntry {
            member_id: report.reported_id,
            report_id: report.id,
            recorded_at: now,
        });
        Ok(Some(WarningRecorded {
            member: member.clone(),
            outcome,
        }))
    }

    async fn find(&self, id: ReportId) -> Result<Option<Report>, ReportRepositoryError> {
        let state = self.lock().map_err(poisoned)?;
        Ok(state.reports.get(&id).cloned())
    }

    async fn exists(
        &self,
        reported: MemberId,
        reporter: MemberId,
        reason: ReportReason,
    ) -> Result<bool, ReportRepositoryError> {
        let state = self.lock().map_err(poisoned)?;
        Ok(state
            .reports
            .values()
            .any(|report| same_triple(report, reported, reporter, reason)))
    }

    async fn save_review(
        &self,
        id: ReportId,
        review: &ReportReview,
    ) -> Result<Option<Report>, ReportRepositoryError> {
        let mut state = self.lock().map_err(poisoned)?;
        Ok(state.reports.get_mut(&id).map(|report| {
            review.apply(report);
            report.clone()
        }))
    }

    async fn list(
        &self,
        status: Option<ReportStatus>,
        page: PageRequest,
    ) -> Result<Page<Report>, ReportRepositoryError> {
        let state = self.lock().map_err(poisoned)?;
        let mut found: Vec<Report> = state
            .reports
            .values()
            .filter(|report| status.is_none_or(|wanted| report.status == wanted))
            .cloned()
            .collect();
        newest_first(&mut found, |report| (report.created_at, report.id));
        Ok(Page::from_ordered(found, page))
    }

    async fn list_against(
        &self,
        reported: MemberId,
        page: PageRequest,
    ) -> Result<Page<Report>, ReportRepositoryError> {
        let state = self.lock().map_err(poisoned)?;
        let mut found: Vec<Report> = state
            .reports
            .values()
            .filter(|report| report.reported_id == reported)
            .cloned()
            .collect();
        newest_first(&mut found, |report| (report.created_at, report.id));
        Ok(Page::from_ordered(found, page))
    }
}
