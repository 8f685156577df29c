//! Port for the external identity verifier.
//!
//! Credential issuance lives outside this service; the verifier turns an
//! opaque caller credential into a [`VerifiedIdentity`].

use async_trait::async_trait;

use crate::domain::{MemberId, Role, VerifiedIdentity};

use super::define_port_error;

define_port_error! {
    /// Errors raised by identity verifier adapters.
    pub enum IdentityVerifierError {
        /// The credential was not accepted.
        Rejected { message: String } =>
            "identity credential rejected: {message}",
        /// The verifier could not be reached or timed out.
        Unavailable { message: String } =>
            "identity verifier unavailable: {message}",
        /// The verifier answered with something unusable.
        InvalidResponse { message: String } =>
            "identity verifier returned an invalid response: {message}",
    }
}

/// Port for credential verification.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Resolve a credential to the identity it asserts.
    async fn verify(&self, credential: &str) -> Result<VerifiedIdentity, IdentityVerifierError>;
}

/// Development verifier accepting `<role>:<uuid>` tokens.
///
/// Wired only in debug builds when no verifier URL is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureIdentityVerifier;

#[async_trait]
impl IdentityVerifier for FixtureIdentityVerifier {
    async fn verify(&self, credential: &str) -> Result<VerifiedIdentity, IdentityVerifierError> {
        let (role, id) = credential
            .split_once(':')
            .ok_or_else(|| IdentityVerifierError::rejected("expected <role>:<uuid>"))?;
        let role = role
            .parse::<Role>()
            .map_err(|err| IdentityVerifierError::rejected(err.to_string()))?;
        let member_id =
            MemberId::new(id).map_err(|err| IdentityVerifierError::rejected(err.to_string()))?;
        let short = member_id.to_string();
        Ok(VerifiedIdentity {
            member_id,
            display_name: format!("{role} {}", &short[..8]),
            role,
            is_active: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("admin:3fa85f64-5717-4562-b3fc-2c963f66afa6", Role::Admin)]
    #[case("USER:3fa85f64-5717-4562-b3fc-2c963f66afa6", Role::User)]
    #[tokio::test]
    async fn fixture_accepts_role_and_uuid(#[case] token: &str, #[case] role: Role) {
        let identity = FixtureIdentityVerifier
            .verify(token)
            .await
            .expect("fixture token accepted");
        assert_eq!(identity.role, role);
        assert_eq!(
            identity.member_id.to_string(),
            "3fa85f64-5717-4562-b3fc-2c963f66afa6"
        );
        assert!(identity.is_active);
    }

    #[rstest]
    #[case("")]
    #[case("admin")]
    #[case("root:3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    #[case("user:not-a-uuid")]
    #[tokio::test]
    async fn fixture_rejects_malformed_tokens(#[case] token: &str) {
        let err = FixtureIdentityVerifier
            .verify(token)
            .await
            .expect_err("malformed token");
        assert!(matches!(err, IdentityVerifierError::Rejected { .. }));
    }
}
