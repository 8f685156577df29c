//! Port for judging whether a report is credible.
//!
//! The moderation engine treats any error from this port as "not
//! validated"; an outage must never convict a member.

use async_trait::async_trait;

use crate::domain::ReportClaim;

use super::define_port_error;

/// Minimum trimmed description length the heuristic accepts as credible.
pub const HEURISTIC_MIN_DESCRIPTION_CHARS: usize = 10;

define_port_error! {
    /// Errors raised by report validator adapters.
    pub enum ReportValidatorError {
        /// The classifier could not be reached or timed out.
        Unavailable { message: String } =>
            "report validator unavailable: {message}",
        /// The classifier answered with something unusable.
        InvalidResponse { message: String } =>
            "report validator returned an invalid response: {message}",
    }
}

/// Port for report classification.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReportValidator: Send + Sync {
    /// Return `true` when the claim is credible enough to warn the member.
    async fn validate(&self, claim: &ReportClaim) -> Result<bool, ReportValidatorError>;
}

/// Deterministic length heuristic used when no classifier is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeuristicReportValidator;

#[async_trait]
impl ReportValidator for HeuristicReportValidator {
    async fn validate(&self, claim: &ReportClaim) -> Result<bool, ReportValidatorError> {
        Ok(claim.description.trim().chars().count() >= HEURISTIC_MIN_DESCRIPTION_CHARS)
    }
}
