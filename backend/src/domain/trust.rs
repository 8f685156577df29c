//! Trust ledger: per-member warning counter and block flag.
//!
//! The counter is a materialised view over validated reports. Every
//! increment is paired with a [`WarningEntry`] naming the report that caused
//! it, so a later reset can be explained.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use serde_json::json;

use super::{Error, MemberId, ReportId};

/// Warning count at which a member is blocked automatically.
pub const DEFAULT_BLOCK_THRESHOLD: u32 = 11;
/// Warning count from which a member is listed as at risk.
pub const DEFAULT_AT_RISK_THRESHOLD: u32 = 8;
/// Reason stamped on automatic blocks.
pub const AUTO_BLOCK_REASON: &str = "Automatically blocked due to excessive reports";

/// Validated block threshold; always at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockThreshold(u32);

impl BlockThreshold {
    /// Build a threshold, clamping zero up to one.
    pub fn new(value: u32) -> Self {
        Self(value.max(1))
    }

    /// Raw threshold value.
    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for BlockThreshold {
    fn default() -> Self {
        Self(DEFAULT_BLOCK_THRESHOLD)
    }
}

/// Trust fields carried by every member.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustStatus {
    pub warning_count: u32,
    pub is_blocked: bool,
    pub blocked_at: Option<DateTime<Utc>>,
    pub block_reason: Option<String>,
}

/// Result of applying one validated warning to the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningOutcome {
    /// The counter moved; the member is not newly blocked.
    Warned { warning_count: u32 },
    /// The counter reached the threshold and the block flag flipped.
    Blocked { warning_count: u32 },
}

impl WarningOutcome {
    /// Counter value after the warning was applied.
    pub fn warning_count(self) -> u32 {
        match self {
            Self::Warned { warning_count } | Self::Blocked { warning_count } => warning_count,
        }
    }
}

/// Options accepted by an administrative reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetOptions {
    pub reset_count: bool,
    pub unblock: bool,
}

impl Default for ResetOptions {
    fn default() -> Self {
        Self {
            reset_count: true,
            unblock: true,
        }
    }
}

/// Cheap read used to gate writes from blocked members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockStatus {
    pub is_blocked: bool,
    pub warning_count: u32,
}

impl BlockStatus {
    /// Refuse gated writes from blocked members.
    ///
    /// The error carries the current warning count so clients can explain
    /// the refusal.
    pub fn ensure_unblocked(self) -> Result<(), Error> {
        if !self.is_blocked {
            return Ok(());
        }
        Err(
            Error::forbidden("account is blocked due to excessive reports").with_details(json!({
                "isBlocked": true,
                "warningCount": self.warning_count,
            })),
        )
    }
}

/// One validated report recorded against a member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarningEntry {
    pub member_id: MemberId,
    pub report_id: ReportId,
    pub recorded_at: DateTime<Utc>,
}

impl TrustStatus {
    /// Project the gate read.
    pub fn block_status(&self) -> BlockStatus {
        BlockStatus {
            is_blocked: self.is_blocked,
            warning_count: self.warning_count,
        }
    }

    /// Apply one validated warning.
    ///
    /// The block flag flips at most once: a member already blocked keeps
    /// their original `blocked_at` and further warnings only move the
    /// counter.
    pub fn record_warning(&mut self, threshold: BlockThreshold, now: DateTime<Utc>) -> WarningOutcome {
        self.warning_count = self.warning_count.saturating_add(1);
        let warning_count = self.warning_count;
        if !self.is_blocked && warning_count >= threshold.get() {
            self.is_blocked = true;
            self.blocked_at = Some(now);
            self.block_reason = Some(AUTO_BLOCK_REASON.to_owned());
            return WarningOutcome::Blocked { warning_count };
        }
        WarningOutcome::Warned { warning_count }
    }

    /// Apply an administrative reset; returns whether a block was lifted.
    pub fn reset(&mut self, options: ResetOptions) -> bool {
        if options.reset_count {
            self.warning_count = 0;
        }
        let was_blocked = self.is_blocked;
        if options.unblock {
            self.is_blocked = false;
            self.blocked_at = None;
            self.block_reason = None;
        }
        options.unblock && was_blocked
    }
}
