//! Session establishment and principal resolution.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use super::ports::{IdentityVerifier, IdentityVerifierError, MemberDirectory, MemberRepository};
use super::service_support::map_member_error;
use super::{Error, Member, MemberId};

fn map_verifier_error(error: IdentityVerifierError) -> Error {
    match error {
        IdentityVerifierError::Rejected { .. } => Error::unauthorized("invalid identity token"),
        IdentityVerifierError::Unavailable { message }
        | IdentityVerifierError::InvalidResponse { message } => {
            Error::service_unavailable(format!("identity verifier unavailable: {message}"))
        }
    }
}

/// Member directory backed by the identity verifier and member storage.
#[derive(Clone)]
pub struct MemberService<M> {
    members: Arc<M>,
    verifier: Arc<dyn IdentityVerifier>,
    clock: Arc<dyn Clock>,
}

impl<M> MemberService<M> {
    /// Create a member service that trusts `verifier` for sign-in.
    pub fn new(members: Arc<M>, verifier: Arc<dyn IdentityVerifier>, clock: Arc<dyn Clock>) -> Self {
        Self {
            members,
            verifier,
            clock,
        }
    }
}

#[async_trait]
impl<M> MemberDirectory for MemberService<M>
where
    M: MemberRepository,
{
    async fn establish(&self, credential: &str) -> Result<Member, Error> {
        let identity = self
            .verifier
            .verify(credential)
            .await
            .map_err(map_verifier_error)?;
        let member = self
            .members
            .upsert_identity(&identity, self.clock.utc())
            .await
            .map_err(map_member_error)?;
        if !member.is_active {
            return Err(Error::forbidden("member account is inactive"));
        }
        info!(member_id = %member.id, role = %member.role, "session established");
        Ok(member)
    }

    async fn resolve(&self, id: MemberId) -> Result<Member, Error> {
        let member = self
            .members
            .find(id)
            .await
            .map_err(map_member_error)?
            .ok_or_else(|| Error::unauthorized("session member no longer exists"))?;
        if !member.is_active {
            return Err(Error::forbidden("member account is inactive"));
        }
        Ok(member)
    }
}
