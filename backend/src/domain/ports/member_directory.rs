//! Driving port for sessions and member profiles.

use async_trait::async_trait;

use crate::domain::{Error, Member, MemberId};

/// Inbound contract for identity and profile reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MemberDirectory: Send + Sync {
    /// Verify a credential and upsert the member it names.
    ///
    /// Inactive members are refused with `Forbidden`.
    async fn establish(&self, credential: &str) -> Result<Member, Error>;

    /// Resolve a session's member id to an active member.
    ///
    /// A missing record is `Unauthorized`; an inactive one `Forbidden`.
    async fn resolve(&self, id: MemberId) -> Result<Member, Error>;
}
