//! Reports lodged by one member against another.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::request::string_enum;
use super::text::{TextRuleError, bounded_text};
use super::{MemberId, ReportId};

const DESCRIPTION_MAX: usize = 500;
const REVIEW_NOTES_MAX: usize = 1000;

string_enum!(
    /// Enumerated accusation.
    ReportReason {
        Spam => "spam",
        Harassment => "harassment",
        InappropriateContent => "inappropriate_content",
        Fraud => "fraud",
        FakeRequest => "fake_request",
        Other => "other",
    } default Other
);

string_enum!(
    /// Administrative review state.
    ReportStatus {
        Pending => "pending",
        Reviewed => "reviewed",
        Resolved => "resolved",
        Dismissed => "dismissed",
    } default Pending
);

string_enum!(
    /// Triage level derived from the reason.
    Severity {
        Low => "low",
        Medium => "medium",
        High => "high",
    } default Low
);

impl ReportReason {
    /// Triage level used to order administrative attention.
    pub fn severity(self) -> Severity {
        match self {
            Self::Fraud => Severity::High,
            Self::Harassment | Self::InappropriateContent => Severity::Medium,
            Self::Spam | Self::FakeRequest | Self::Other => Severity::Low,
        }
    }
}

/// Input to the report validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportClaim {
    pub reason: ReportReason,
    pub description: String,
}

impl ReportClaim {
    /// Validate caller-supplied fields.
    pub fn new(reason: ReportReason, description: &str) -> Result<Self, TextRuleError> {
        Ok(Self {
            reason,
            description: bounded_text("description", description, 1, DESCRIPTION_MAX)?,
        })
    }
}

/// An accusation by one member against another.
///
/// `is_validated` is fixed at creation and never changed by normal flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: ReportId,
    pub reported_id: MemberId,
    pub reporter_id: MemberId,
    pub reason: ReportReason,
    pub description: String,
    pub severity: Severity,
    pub status: ReportStatus,
    pub is_validated: bool,
    pub reviewed_by: Option<MemberId>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub review_notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Report {
    /// Create a pending report with a fixed validation verdict.
    pub fn file(
        reporter_id: MemberId,
        reported_id: MemberId,
        claim: ReportClaim,
        is_validated: bool,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ReportId::random(),
            reported_id,
            reporter_id,
            severity: claim.reason.severity(),
            reason: claim.reason,
            description: claim.description,
            status: ReportStatus::Pending,
            is_validated,
            reviewed_by: None,
            reviewed_at: None,
            review_notes: None,
            created_at: now,
        }
    }
}

/// Administrative review decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportReview {
    pub reviewer: MemberId,
    pub status: ReportStatus,
    pub notes: Option<String>,
    pub reviewed_at: DateTime<Utc>,
}

impl ReportReview {
    /// Validate the review notes.
    pub fn new(
        reviewer: MemberId,
        status: ReportStatus,
        notes: Option<&str>,
        reviewed_at: DateTime<Utc>,
    ) -> Result<Self, TextRuleError> {
        let notes = match notes.map(str::trim) {
            None | Some("") => None,
            Some(text) => Some(bounded_text("reviewNotes", text, 1, REVIEW_NOTES_MAX)?),
        };
        Ok(Self {
            reviewer,
            status,
            notes,
            reviewed_at,
        })
    }

    /// Stamp the review onto a report.
    pub fn apply(&self, report: &mut Report) {
        report.status = self.status;
        report.reviewed_by = Some(self.reviewer);
        report.reviewed_at = Some(self.reviewed_at);
        report.review_notes.clone_from(&self.notes);
    }
}
