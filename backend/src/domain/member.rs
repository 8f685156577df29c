//! Members, roles, and authenticated principals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Error, MemberId, TrustStatus};

/// Role granted to a member by the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular marketplace participant.
    User,
    /// Community moderator.
    Moderator,
    /// Administrator with access to moderation tooling.
    Admin,
}

impl Role {
    /// Stable storage and wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Moderator => "moderator",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a role string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl std::str::FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "user" => Ok(Self::User),
            "moderator" => Ok(Self::Moderator),
            "admin" => Ok(Self::Admin),
            _ => Err(UnknownRole(s.to_owned())),
        }
    }
}

/// A marketplace member together with their trust ledger entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: MemberId,
    pub display_name: String,
    pub role: Role,
    pub is_active: bool,
    /// Incremented once per fulfilled request the member helped with.
    pub help_count: u32,
    #[serde(flatten)]
    pub trust: TrustStatus,
    pub created_at: DateTime<Utc>,
}

impl Member {
    /// Build a fresh member record from a verified identity.
    pub fn from_identity(identity: &VerifiedIdentity, now: DateTime<Utc>) -> Self {
        Self {
            id: identity.member_id,
            display_name: identity.display_name.clone(),
            role: identity.role,
            is_active: identity.is_active,
            help_count: 0,
            trust: TrustStatus::default(),
            created_at: now,
        }
    }

    /// Project the member onto the principal used for authorisation.
    pub fn principal(&self) -> Principal {
        Principal {
            member_id: self.id,
            role: self.role,
            is_active: self.is_active,
        }
    }
}

/// Identity asserted by the external verifier for a caller credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedIdentity {
    pub member_id: MemberId,
    pub display_name: String,
    pub role: Role,
    pub is_active: bool,
}

/// Authenticated caller context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub member_id: MemberId,
    pub role: Role,
    pub is_active: bool,
}

impl Principal {
    /// Whether the caller holds the administrator role.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Require the administrator role or fail with `Forbidden`.
    pub fn require_admin(&self) -> Result<(), Error> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(Error::forbidden("administrator role required"))
        }
    }
}
