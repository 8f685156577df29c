//! Moderation engine and trust ledger operations.
//!
//! A report is classified once, at filing. Only validated reports touch the
//! ledger, and they are persisted together with their warning. The
//! validator failing counts as "not validated" so an outage never convicts
//! anyone.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use super::ports::{
    MemberRepository, ModerationCommand, ModerationMetrics, ModerationQuery, Notifier,
    ReportRepository, ReportValidator,
};
use super::service_support::{map_member_error, map_report_error, map_text_rule};
use super::{
    Audience, BlockStatus, BlockThreshold, DEFAULT_AT_RISK_THRESHOLD, Error, Member, MemberId,
    NotificationKind, Page, PageRequest, Principal, Report, ReportClaim, ReportId, ReportReview,
    ReportStatus, ResetOptions, Role, SideEffect, WarningEntry, WarningOutcome, fire_and_forget,
};

/// Moderation service implementing the moderation command port.
#[derive(Clone)]
pub struct ModerationService<M, P> {
    members: Arc<M>,
    reports: Arc<P>,
    validator: Arc<dyn ReportValidator>,
    notifier: Arc<dyn Notifier>,
    metrics: Arc<dyn ModerationMetrics>,
    clock: Arc<dyn Clock>,
    threshold: BlockThreshold,
}

impl<M, P> ModerationService<M, P> {
    /// Build the engine with the default block threshold.
    ///
    /// Validator failures are treated as "not validated"; metrics and
    /// notifications are best-effort.
    pub fn new(
        members: Arc<M>,
        reports: Arc<P>,
        validator: Arc<dyn ReportValidator>,
        notifier: Arc<dyn Notifier>,
        metrics: Arc<dyn ModerationMetrics>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            members,
            reports,
            validator,
            notifier,
            metrics,
            clock,
            threshold: BlockThreshold::default(),
        }
    }

    /// Override the warning count that triggers an automatic block.
    pub fn with_threshold(mut self, threshold: BlockThreshold) -> Self {
        self.threshold = threshold;
        self
    }
}

impl<M, P> ModerationService<M, P>
where
    M: MemberRepository,
    P: ReportRepository,
{
    async fn classify(&self, claim: &ReportClaim) -> bool {
        match self.validator.validate(claim).await {
            Ok(verdict) => verdict,
            Err(error) => {
                warn!(error = %error, "report validator failed; leaving report for manual review");
                false
            }
        }
    }

    async fn notify(&self, effect: SideEffect, audience: Audience, kind: NotificationKind) {
        fire_and_forget(effect, self.notifier.send(audience, kind)).await;
    }

    /// File a validated report and notify the reported member of the
    /// warning or block it produced.
    async fn file_with_warning(&self, report: &Report) -> Result<(), Error> {
        let recorded = self
            .reports
            .file_with_warning(report, self.threshold, self.clock.utc())
            .await
            .map_err(map_report_error)?
            .ok_or_else(|| Error::not_found(format!("member {} not found", report.reported_id)))?;
        info!(report_id = %report.id, reported = %report.reported_id, "validated report filed");

        let kind = match recorded.outcome {
            WarningOutcome::Blocked { warning_count } => {
                info!(member_id = %report.reported_id, warning_count, "member blocked automatically");
                fire_and_forget(SideEffect::RecordMetric, self.metrics.record_member_blocked())
                    .await;
                NotificationKind::AccountBlocked {
                    report_id: report.id,
                    warning_count,
                }
            }
            WarningOutcome::Warned { warning_count } => {
                info!(member_id = %report.reported_id, warning_count, "warning recorded");
                NotificationKind::WarningIssued {
                    report_id: report.id,
                    warning_count,
                    threshold: self.threshold.get(),
                }
            }
        };
        self.notify(
            SideEffect::NotifyMember,
            Audience::Member(report.reported_id),
            kind,
        )
        .await;
        Ok(())
    }
}

#[async_trait]
impl<M, P> ModerationCommand for ModerationService<M, P>
where
    M: MemberRepository,
    P: ReportRepository,
{
    async fn create_report(
        &self,
        caller: Principal,
        reported: MemberId,
        claim: ReportClaim,
    ) -> Result<Report, Error> {
        if caller.member_id == reported {
            return Err(Error::conflict("you cannot report yourself"));
        }
        if self
            .members
            .find(reported)
            .await
            .map_err(map_member_error)?
            .is_none()
        {
            return Err(Error::not_found(format!("member {reported} not found")));
        }
        if self
            .reports
            .exists(reported, caller.member_id, claim.reason)
            .await
            .map_err(map_report_error)?
        {
            return Err(Error::conflict(
                "you have already reported this member for this reason",
            ));
        }

        let is_validated = self.classify(&claim).await;
        let report = Report::file(caller.member_id, reported, claim, is_validated, self.clock.utc());
        if is_validated {
            self.file_with_warning(&report).await?;
        } else {
            self.reports
                .insert(&report)
                .await
                .map_err(map_report_error)?;
            info!(report_id = %report.id, reported = %reported, "report filed for manual review");
        }

        fire_and_forget(
            SideEffect::RecordMetric,
            self.metrics.record_report_filed(is_validated),
        )
        .await;
        self.notify(
            SideEffect::NotifyRole,
            Audience::Role(Role::Admin),
            NotificationKind::ReportFiled {
                report_id: report.id,
                reported_id: reported,
                reason: report.reason,
                severity: report.severity,
                is_validated,
            },
        )
        .await;
        Ok(report)
    }

    async fn update_report(
        &self,
        caller: Principal,
        id: ReportId,
        status: ReportStatus,
        notes: Option<String>,
    ) -> Result<Report, Error> {
        caller.require_admin()?;
        let review = ReportReview::new(caller.member_id, status, notes.as_deref(), self.clock.utc())
            .map_err(map_text_rule)?;
        let report = self
            .reports
            .save_review(id, &review)
            .await
            .map_err(map_report_error)?
            .ok_or_else(|| Error::not_found(format!("report {id} not found")))?;
        info!(report_id = %id, status = %status, "report reviewed");
        Ok(report)
    }

    async fn reset_warnings(
        &self,
        caller: Principal,
        member: MemberId,
        options: ResetOptions,
    ) -> Result<Member, Error> {
        caller.require_admin()?;
        let reset = self
            .members
            .reset_trust(member, options)
            .await
            .map_err(map_member_error)?
            .ok_or_else(|| Error::not_found(format!("member {member} not found")))?;
        info!(
            member_id = %member,
            reset_count = options.reset_count,
            unblocked = reset.unblocked,
            "trust ledger reset"
        );

        if reset.unblocked {
            self.notify(
                SideEffect::NotifyMember,
                Audience::Member(member),
                NotificationKind::AccountUnblocked,
            )
            .await;
        }
        Ok(reset.member)
    }
}

/// Moderation reads.
#[derive(Clone)]
pub struct ModerationQueryService<M, P> {
    members: Arc<M>,
    reports: Arc<P>,
    at_risk_threshold: u32,
}

impl<M, P> ModerationQueryService<M, P> {
    /// Build the query service with the default at-risk threshold.
    pub fn new(members: Arc<M>, reports: Arc<P>) -> Self {
        Self {
            members,
            reports,
            at_risk_threshold: DEFAULT_AT_RISK_THRESHOLD,
        }
    }

    /// Override the warning count from which members are listed as at risk.
    pub fn with_at_risk_threshold(mut self, threshold: u32) -> Self {
        self.at_risk_threshold = threshold;
        self
    }
}

#[async_trait]
impl<M, P> ModerationQuery for ModerationQueryService<M, P>
where
    M: MemberRepository,
    P: ReportRepository,
{
    async fn block_status(&self, member: MemberId) -> Result<BlockStatus, Error> {
        let found = self
            .members
            .find(member)
            .await
            .map_err(map_member_error)?
            .ok_or_else(|| Error::not_found(format!("member {member} not found")))?;
        Ok(found.trust.block_status())
    }

    async fn list_reports(
        &self,
        caller: Principal,
        status: Option<ReportStatus>,
        page: PageRequest,
    ) -> Result<Page<Report>, Error> {
        caller.require_admin()?;
        self.reports
            .list(status, page)
            .await
            .map_err(map_report_error)
    }

    async fn get_report(&self, caller: Principal, id: ReportId) -> Result<Report, Error> {
        caller.require_admin()?;
        self.reports
            .find(id)
            .await
            .map_err(map_report_error)?
            .ok_or_else(|| Error::not_found(format!("report {id} not found")))
    }

    async fn reports_against(
        &self,
        caller: Principal,
        member: MemberId,
        page: PageRequest,
    ) -> Result<Page<Report>, Error> {
        caller.require_admin()?;
        self.reports
            .list_against(member, page)
            .await
            .map_err(map_report_error)
    }

    async fn blocked_members(
        &self,
        caller: Principal,
        page: PageRequest,
    ) -> Result<Page<Member>, Error> {
        caller.require_admin()?;
        self.members
            .list_blocked(page)
            .await
            .map_err(map_member_error)
    }

    async fn at_risk_members(
        &self,
        caller: Principal,
        page: PageRequest,
    ) -> Result<Page<Member>, Error> {
        caller.require_admin()?;
        self.members
            .list_at_risk(self.at_risk_threshold, page)
            .await
            .map_err(map_member_error)
    }

    async fn warning_history(
        &self,
        caller: Principal,
        member: MemberId,
    ) -> Result<Vec<WarningEntry>, Error> {
        caller.require_admin()?;
        self.members
            .warning_history(member)
            .await
            .map_err(map_member_error)
    }
}

#[cfg(test)]
#[path = "moderation_service_tests.rs"]
mod tests;
